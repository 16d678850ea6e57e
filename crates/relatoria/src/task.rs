use std::collections::HashMap;

use serde::Deserialize;

use crate::processor::TaskError;

/// One queued report request, parsed from the JSON payload. Immutable
/// after parsing and scoped to a single processing call.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskPayload {
    pub task_id: String,
    pub tipo_relatorio: String,
    pub parametros: HashMap<String, String>,
    pub output_filename: String,
}

impl TaskPayload {
    /// Parses and validates the raw payload. Missing or mistyped
    /// fields (including non-string parameter values) fail here, before
    /// any file is created.
    pub fn parse(raw: &str) -> Result<Self, TaskError> {
        let task: TaskPayload = serde_json::from_str(raw)
            .map_err(|err| TaskError::new("BAD_PAYLOAD", err.to_string()))?;

        if task.task_id.is_empty() {
            return Err(TaskError::new("BAD_PAYLOAD", "task_id must not be empty"));
        }
        if task.output_filename.is_empty() {
            return Err(TaskError::new(
                "BAD_PAYLOAD",
                "output_filename must not be empty",
            ));
        }

        Ok(task)
    }
}
