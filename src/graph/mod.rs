//! Graph representation and algorithms module

pub mod compressed;
pub mod builder;
pub mod algorithms;

pub use compressed::CompressedGraph;
pub use builder::GraphBuilder;
