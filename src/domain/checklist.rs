//! Checklist definitions.
//!
//! A `Checklist` owns an ordered collection of `ConditionItem`s. Items keep
//! their rule fields as raw strings; they are interpreted at evaluation time
//! so that a bad item only fails itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Checklist {
    pub fn new(id: i64, user_id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            name: name.into(),
            description: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionItem {
    pub id: i64,
    pub checklist_id: i64,
    pub left_operand: String,
    pub operator: String,
    pub right_operand: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ConditionItem {
    pub fn new(
        id: i64,
        checklist_id: i64,
        left_operand: impl Into<String>,
        operator: impl Into<String>,
        right_operand: impl Into<String>,
    ) -> Self {
        Self {
            id,
            checklist_id,
            left_operand: left_operand.into(),
            operator: operator.into(),
            right_operand: right_operand.into(),
            enabled: true,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A checklist together with its items, as exchanged with definition files
/// and stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistDefinition {
    pub checklist: Checklist,
    #[serde(default)]
    pub items: Vec<ConditionItem>,
}

/// Enabled items sorted by `sort_order`. The sort is stable, so equal
/// `sort_order` values keep their original relative order.
pub fn enabled_in_order(items: &[ConditionItem]) -> Vec<&ConditionItem> {
    let mut enabled: Vec<&ConditionItem> = items.iter().filter(|item| item.enabled).collect();
    enabled.sort_by_key(|item| item.sort_order);
    enabled
}
