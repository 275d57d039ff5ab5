//! Checklist definition and result store port trait.

use crate::domain::checklist::{Checklist, ConditionItem};
use crate::domain::error::ScreenerError;
use crate::domain::evaluation::{EvaluationResult, ItemResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RESULT_LIMIT: usize = 50;

/// An evaluation result as persisted by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    pub checklist_id: i64,
    pub symbol: String,
    pub passed_checks: usize,
    pub total_checks: usize,
    pub score_percentage: f64,
    pub result_date: DateTime<Utc>,
    pub details: Vec<ItemResult>,
    pub error: Option<String>,
}

pub trait StorePort {
    fn get_checklist(&self, id: i64) -> Result<Option<Checklist>, ScreenerError>;

    /// Active checklists owned by `user_id`.
    fn list_checklists(&self, user_id: i64) -> Result<Vec<Checklist>, ScreenerError>;

    /// Items of a checklist in storage order; callers sort for evaluation.
    fn get_items(&self, checklist_id: i64) -> Result<Vec<ConditionItem>, ScreenerError>;

    fn save_result(&self, result: &EvaluationResult) -> Result<StoredResult, ScreenerError>;

    /// Saves a batch of results. Stores that can should make this all or
    /// nothing.
    fn save_results(
        &self,
        results: &[EvaluationResult],
    ) -> Result<Vec<StoredResult>, ScreenerError> {
        results.iter().map(|r| self.save_result(r)).collect()
    }

    /// Most recent results first.
    fn results_for(
        &self,
        checklist_id: i64,
        limit: usize,
    ) -> Result<Vec<StoredResult>, ScreenerError>;

    /// Loads a checklist and its items, failing when the checklist is missing.
    fn load_definition(
        &self,
        id: i64,
    ) -> Result<(Checklist, Vec<ConditionItem>), ScreenerError> {
        let checklist = self
            .get_checklist(id)?
            .ok_or(ScreenerError::ChecklistNotFound { id })?;
        let items = self.get_items(id)?;
        Ok((checklist, items))
    }
}
