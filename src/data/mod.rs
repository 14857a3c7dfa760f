//! Network and seed input

pub mod edgelist;
pub mod seeds;
pub mod targets;

pub use edgelist::load_edge_list;
pub use seeds::load_seeds;
pub use targets::{load_drug_targets, DrugTargets};
