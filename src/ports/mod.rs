//! Port traits for the collaborators around the evaluator.

pub mod config_port;
pub mod data_port;
pub mod store_port;
