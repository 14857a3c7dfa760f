//! Network-proximity scoring of proteins against an adverse-event seed set

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod partition;
pub mod progress;
pub mod ranking;
pub mod storage;

pub use anyhow::{Result, anyhow};
pub use cache::ArtifactCache;
pub use error::ProximityError;
pub use graph::{CompressedGraph, GraphBuilder};
pub use metrics::{Metric, ScoreMap, ScoringContext};
pub use partition::SeedPartition;
