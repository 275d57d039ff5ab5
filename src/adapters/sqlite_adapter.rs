//! SQLite checklist and result store.

use crate::domain::checklist::{Checklist, ChecklistDefinition, ConditionItem};
use crate::domain::checklist_validation::validate_definition;
use crate::domain::error::ScreenerError;
use crate::domain::evaluation::{EvaluationResult, ItemResult};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::{StorePort, StoredResult};
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS checklists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS checklist_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        checklist_id INTEGER NOT NULL REFERENCES checklists(id) ON DELETE CASCADE,
        left_operand TEXT NOT NULL,
        operator TEXT NOT NULL,
        right_operand TEXT NOT NULL,
        enabled INTEGER NOT NULL DEFAULT 1,
        sort_order INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS checklist_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        checklist_id INTEGER NOT NULL REFERENCES checklists(id) ON DELETE CASCADE,
        symbol TEXT NOT NULL,
        passed_checks INTEGER NOT NULL,
        total_checks INTEGER NOT NULL,
        score_percentage REAL NOT NULL,
        result_date TEXT NOT NULL,
        details TEXT NOT NULL,
        error TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_items_checklist ON checklist_items(checklist_id);
    CREATE INDEX IF NOT EXISTS idx_results_checklist ON checklist_results(checklist_id, result_date);";

const CHECKLIST_COLUMNS: &str = "id, user_id, name, description, active, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, checklist_id, left_operand, operator, right_operand, enabled, sort_order, created_at";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| ScreenerError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path).with_init(enable_foreign_keys);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, ScreenerError> {
        let manager = SqliteConnectionManager::memory().with_init(enable_foreign_keys);
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), ScreenerError> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA).map_err(query_error)?;
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, ScreenerError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn create_checklist(
        &self,
        user_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<Checklist, ScreenerError> {
        let conn = self.conn()?;
        let mut checklist = Checklist::new(0, user_id, name);
        checklist.description = description.map(str::to_string);
        checklist.id = insert_checklist(&conn, &checklist)?;
        tracing::debug!(id = checklist.id, user_id, "created checklist");
        Ok(checklist)
    }

    pub fn update_checklist(&self, checklist: &Checklist) -> Result<Checklist, ScreenerError> {
        let conn = self.conn()?;
        let mut updated = checklist.clone();
        updated.updated_at = Utc::now();
        let changed = conn
            .execute(
                "UPDATE checklists SET name = ?1, description = ?2, active = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    updated.name,
                    updated.description,
                    updated.active,
                    stamp(&updated.updated_at),
                    updated.id
                ],
            )
            .map_err(query_error)?;
        if changed == 0 {
            return Err(ScreenerError::ChecklistNotFound { id: checklist.id });
        }
        Ok(updated)
    }

    /// Deletes a checklist together with its items and stored results.
    pub fn delete_checklist(&self, id: i64) -> Result<(), ScreenerError> {
        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM checklists WHERE id = ?1", params![id])
            .map_err(query_error)?;
        if changed == 0 {
            return Err(ScreenerError::ChecklistNotFound { id });
        }
        tracing::debug!(id, "deleted checklist");
        Ok(())
    }

    /// Stores `item` under its `checklist_id`, ignoring its `id`.
    pub fn add_item(&self, item: &ConditionItem) -> Result<ConditionItem, ScreenerError> {
        let conn = self.conn()?;
        if load_checklist(&conn, item.checklist_id)?.is_none() {
            return Err(ScreenerError::ChecklistNotFound {
                id: item.checklist_id,
            });
        }
        let mut stored = item.clone();
        stored.id = insert_item(&conn, item)?;
        Ok(stored)
    }

    pub fn update_item(&self, item: &ConditionItem) -> Result<(), ScreenerError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE checklist_items
                 SET left_operand = ?1, operator = ?2, right_operand = ?3, enabled = ?4, sort_order = ?5
                 WHERE id = ?6",
                params![
                    item.left_operand,
                    item.operator,
                    item.right_operand,
                    item.enabled,
                    item.sort_order,
                    item.id
                ],
            )
            .map_err(query_error)?;
        if changed == 0 {
            return Err(ScreenerError::DatabaseQuery {
                reason: format!("checklist item {} not found", item.id),
            });
        }
        Ok(())
    }

    pub fn delete_item(&self, id: i64) -> Result<(), ScreenerError> {
        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM checklist_items WHERE id = ?1", params![id])
            .map_err(query_error)?;
        if changed == 0 {
            return Err(ScreenerError::DatabaseQuery {
                reason: format!("checklist item {} not found", id),
            });
        }
        Ok(())
    }

    /// Validates and stores a whole definition in one transaction. Stored
    /// ids are assigned by the database; the returned definition carries them.
    pub fn import_definition(
        &self,
        definition: &ChecklistDefinition,
    ) -> Result<ChecklistDefinition, ScreenerError> {
        validate_definition(definition)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        let mut checklist = definition.checklist.clone();
        checklist.id = insert_checklist(&tx, &checklist)?;

        let mut items = Vec::with_capacity(definition.items.len());
        for item in &definition.items {
            let mut stored = item.clone();
            stored.checklist_id = checklist.id;
            stored.id = insert_item(&tx, &stored)?;
            items.push(stored);
        }

        tx.commit().map_err(query_error)?;

        tracing::info!(id = checklist.id, items = items.len(), "imported checklist");
        Ok(ChecklistDefinition { checklist, items })
    }
}

impl StorePort for SqliteStore {
    fn get_checklist(&self, id: i64) -> Result<Option<Checklist>, ScreenerError> {
        let conn = self.conn()?;
        load_checklist(&conn, id)
    }

    fn list_checklists(&self, user_id: i64) -> Result<Vec<Checklist>, ScreenerError> {
        let conn = self.conn()?;
        let query = format!(
            "SELECT {CHECKLIST_COLUMNS} FROM checklists WHERE user_id = ?1 AND active = 1 ORDER BY id"
        );
        let mut stmt = conn.prepare(&query).map_err(query_error)?;
        let rows = stmt
            .query_map(params![user_id], checklist_from_row)
            .map_err(query_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    fn get_items(&self, checklist_id: i64) -> Result<Vec<ConditionItem>, ScreenerError> {
        let conn = self.conn()?;
        let query =
            format!("SELECT {ITEM_COLUMNS} FROM checklist_items WHERE checklist_id = ?1 ORDER BY id");
        let mut stmt = conn.prepare(&query).map_err(query_error)?;
        let rows = stmt
            .query_map(params![checklist_id], item_from_row)
            .map_err(query_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    fn save_result(&self, result: &EvaluationResult) -> Result<StoredResult, ScreenerError> {
        let conn = self.conn()?;
        insert_result(&conn, result, Utc::now())
    }

    /// One transaction for the whole batch; a failure stores nothing.
    fn save_results(
        &self,
        results: &[EvaluationResult],
    ) -> Result<Vec<StoredResult>, ScreenerError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;
        let result_date = Utc::now();

        let stored = results
            .iter()
            .map(|result| insert_result(&tx, result, result_date))
            .collect::<Result<Vec<_>, _>>()?;

        tx.commit().map_err(query_error)?;
        Ok(stored)
    }

    fn results_for(
        &self,
        checklist_id: i64,
        limit: usize,
    ) -> Result<Vec<StoredResult>, ScreenerError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, checklist_id, symbol, passed_checks, total_checks, score_percentage,
                        result_date, details, error
                 FROM checklist_results
                 WHERE checklist_id = ?1
                 ORDER BY result_date DESC, id DESC
                 LIMIT ?2",
            )
            .map_err(query_error)?;
        let rows = stmt
            .query_map(params![checklist_id, limit as i64], result_from_row)
            .map_err(query_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }
}

fn enable_foreign_keys(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

fn pool_error(e: r2d2::Error) -> ScreenerError {
    ScreenerError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> ScreenerError {
    ScreenerError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn insert_checklist(conn: &Connection, checklist: &Checklist) -> Result<i64, ScreenerError> {
    conn.execute(
        "INSERT INTO checklists (user_id, name, description, active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            checklist.user_id,
            checklist.name,
            checklist.description,
            checklist.active,
            stamp(&checklist.created_at),
            stamp(&checklist.updated_at)
        ],
    )
    .map_err(query_error)?;
    Ok(conn.last_insert_rowid())
}

fn insert_item(conn: &Connection, item: &ConditionItem) -> Result<i64, ScreenerError> {
    conn.execute(
        "INSERT INTO checklist_items
         (checklist_id, left_operand, operator, right_operand, enabled, sort_order, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            item.checklist_id,
            item.left_operand,
            item.operator,
            item.right_operand,
            item.enabled,
            item.sort_order,
            stamp(&item.created_at)
        ],
    )
    .map_err(query_error)?;
    Ok(conn.last_insert_rowid())
}

fn insert_result(
    conn: &Connection,
    result: &EvaluationResult,
    result_date: DateTime<Utc>,
) -> Result<StoredResult, ScreenerError> {
    let details = serde_json::to_string(&result.details).map_err(|e| {
        ScreenerError::DatabaseQuery {
            reason: format!("failed to encode result details: {}", e),
        }
    })?;

    conn.execute(
        "INSERT INTO checklist_results
         (checklist_id, symbol, passed_checks, total_checks, score_percentage, result_date, details, error)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            result.checklist_id,
            result.symbol,
            result.passed_checks as i64,
            result.total_checks as i64,
            result.score_percentage,
            stamp(&result_date),
            details,
            result.error
        ],
    )
    .map_err(query_error)?;

    Ok(StoredResult {
        id: conn.last_insert_rowid(),
        checklist_id: result.checklist_id,
        symbol: result.symbol.clone(),
        passed_checks: result.passed_checks,
        total_checks: result.total_checks,
        score_percentage: result.score_percentage,
        result_date,
        details: result.details.clone(),
        error: result.error.clone(),
    })
}

fn load_checklist(conn: &Connection, id: i64) -> Result<Option<Checklist>, ScreenerError> {
    let query = format!("SELECT {CHECKLIST_COLUMNS} FROM checklists WHERE id = ?1");
    conn.query_row(&query, params![id], checklist_from_row)
        .optional()
        .map_err(query_error)
}

/// Fixed-width RFC 3339 so stored timestamps sort lexically.
fn stamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn timestamp(row: &Row<'_>, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn checklist_from_row(row: &Row<'_>) -> Result<Checklist, rusqlite::Error> {
    Ok(Checklist {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        active: row.get(4)?,
        created_at: timestamp(row, 5)?,
        updated_at: timestamp(row, 6)?,
    })
}

fn item_from_row(row: &Row<'_>) -> Result<ConditionItem, rusqlite::Error> {
    Ok(ConditionItem {
        id: row.get(0)?,
        checklist_id: row.get(1)?,
        left_operand: row.get(2)?,
        operator: row.get(3)?,
        right_operand: row.get(4)?,
        enabled: row.get(5)?,
        sort_order: row.get(6)?,
        created_at: timestamp(row, 7)?,
    })
}

fn result_from_row(row: &Row<'_>) -> Result<StoredResult, rusqlite::Error> {
    let details_json: String = row.get(7)?;
    let details: Vec<ItemResult> = serde_json::from_str(&details_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let passed_checks: i64 = row.get(3)?;
    let total_checks: i64 = row.get(4)?;

    Ok(StoredResult {
        id: row.get(0)?,
        checklist_id: row.get(1)?,
        symbol: row.get(2)?,
        passed_checks: passed_checks as usize,
        total_checks: total_checks as usize,
        score_percentage: row.get(5)?,
        result_date: timestamp(row, 6)?,
        details,
        error: row.get(8)?,
    })
}
