use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;

use wb_core::{Heatmap, TaskType};

use crate::error::{Result, StoreError};
use crate::schema;

pub struct Store {
    conn: Connection,
}

/// A task about to be persisted.
#[derive(Debug)]
pub struct NewTask<'a> {
    pub task_type: TaskType,
    pub input_text: &'a str,
    pub model_name: &'a str,
    pub results: &'a serde_json::Value,
    pub attention_data: Option<&'a Heatmap>,
    /// Seconds.
    pub processing_time: f64,
}

/// A persisted analysis task.
#[derive(Clone, Debug, Serialize)]
pub struct TaskRecord {
    pub id: i64,
    pub task_type: TaskType,
    pub input_text: String,
    pub model_name: String,
    pub results: serde_json::Value,
    pub attention_data: Option<serde_json::Value>,
    pub created_at: String,
    pub processing_time: Option<f64>,
}

impl TaskRecord {
    /// Decode the stored attention blob, if any.
    pub fn heatmap(&self) -> Result<Option<Heatmap>> {
        self.attention_data
            .as_ref()
            .map(|v| serde_json::from_value(v.clone()).map_err(StoreError::from))
            .transpose()
    }
}

/// Rolling processing-time statistics per (model, task type).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelMetrics {
    pub model_name: String,
    pub task_type: String,
    pub avg_processing_time: f64,
    pub accuracy_score: Option<f64>,
    pub total_requests: i64,
    pub last_updated: String,
}

/// Raw column values before JSON and enum decoding.
type RawTask = (
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<f64>,
);

const TASK_COLUMNS: &str = "id, task_type, input_text, model_name, results, attention_data, created_at, processing_time";

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        tracing::info!("opened store at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Tasks ---

    /// Insert a task and return its id.
    pub fn insert_task(&self, task: &NewTask<'_>) -> Result<i64> {
        let results = serde_json::to_string(task.results)?;
        let attention = task
            .attention_data
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO nlp_tasks (task_type, input_text, model_name, results, attention_data, processing_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.task_type.as_str(),
                task.input_text,
                task.model_name,
                results,
                attention,
                task.processing_time,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, task_type = %task.task_type, "stored task");
        Ok(id)
    }

    pub fn get_task(&self, id: i64) -> Result<Option<TaskRecord>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM nlp_tasks WHERE id = ?1"),
                [id],
                raw_task,
            )
            .optional()?;
        raw.map(decode_task).transpose()
    }

    /// Most recent tasks first. Limits beyond `i64::MAX` mean all tasks.
    pub fn recent_tasks(&self, limit: usize) -> Result<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM nlp_tasks ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))?;
        let rows: Vec<RawTask> = stmt
            .query_map([i64::try_from(limit).unwrap_or(i64::MAX)], raw_task)?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(decode_task).collect()
    }

    // --- Metrics ---

    /// Fold one processing time into the rolling average for (model, task).
    ///
    /// A single upsert statement, so `total_requests` always counts exactly
    /// the contributions folded into `avg_processing_time`.
    pub fn record_processing_time(
        &self,
        model_name: &str,
        task_type: &str,
        seconds: f64,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO model_metrics (model_name, task_type, avg_processing_time, total_requests)
             VALUES (?1, ?2, ?3, 1)
             ON CONFLICT (model_name, task_type) DO UPDATE SET
                 avg_processing_time =
                     (avg_processing_time * total_requests + excluded.avg_processing_time)
                     / (total_requests + 1),
                 total_requests = total_requests + 1,
                 last_updated = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![model_name, task_type, seconds],
        )?;
        Ok(())
    }

    pub fn list_metrics(&self) -> Result<Vec<ModelMetrics>> {
        let mut stmt = self.conn.prepare(
            "SELECT model_name, task_type, avg_processing_time, accuracy_score, total_requests, last_updated
             FROM model_metrics ORDER BY id",
        )?;
        let metrics = stmt
            .query_map([], |row| {
                Ok(ModelMetrics {
                    model_name: row.get(0)?,
                    task_type: row.get(1)?,
                    avg_processing_time: row.get(2)?,
                    accuracy_score: row.get(3)?,
                    total_requests: row.get(4)?,
                    last_updated: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(metrics)
    }
}

fn raw_task(row: &Row<'_>) -> rusqlite::Result<RawTask> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn decode_task(raw: RawTask) -> Result<TaskRecord> {
    let (id, task_type, input_text, model_name, results, attention, created_at, processing_time) =
        raw;
    let task_type = task_type
        .parse::<TaskType>()
        .map_err(|e| StoreError::InvalidData(format!("task {id}: {e}")))?;
    let results = match results.as_deref() {
        None | Some("") => serde_json::Value::Object(Default::default()),
        Some(s) => serde_json::from_str(s)?,
    };
    let attention_data = match attention.as_deref() {
        None | Some("") => None,
        Some(s) => Some(serde_json::from_str(s)?),
    };
    Ok(TaskRecord {
        id,
        task_type,
        input_text,
        model_name,
        results,
        attention_data,
        created_at,
        processing_time,
    })
}
