//! Core domain types and logic.

pub mod batch;
pub mod checklist;
pub mod checklist_validation;
pub mod compare;
pub mod config_validation;
pub mod error;
pub mod evaluation;
pub mod field;
pub mod metrics;
pub mod operand;
pub mod operator;
pub mod universe;
