use std::fmt;
use std::io::Write;
use std::path::{Component, Path};

use futures::TryStreamExt;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Executor, Row, Statement, TypeInfo, ValueRef};

use crate::reports;
use crate::sink::{CellValue, CsvSink};
use crate::task::TaskPayload;

/// Task-local failure. Logged by the dispatcher and then forgotten;
/// a failed task is never requeued.
#[derive(Debug)]
pub struct TaskError {
    pub code: &'static str,
    pub message: String,
}

impl TaskError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for TaskError {}

/// Runs one report task end to end: parse, validate, resolve the
/// catalog entry, execute the bound query, stream rows to the CSV
/// sink. Returns the number of data rows written.
///
/// Resources are acquired in order (parsed payload, output file,
/// prepared statement, row stream) and released in reverse on every
/// exit path by scope; no failure escapes past the returned error.
///
/// Unknown report types and missing required parameters leave a single
/// `ERRO:` diagnostic line inside the already-created output file, so
/// the failure is visible in the artifact itself, not only in logs.
pub async fn process_task(
    raw: &str,
    db: &SqlitePool,
    export_dir: &Path,
) -> Result<u64, TaskError> {
    let task = TaskPayload::parse(raw)?;
    let file_name = sanitize_filename(&task.output_filename)?;
    let output_path = export_dir.join(file_name);

    println!(
        "task {}: tipo_relatorio={} destino={}",
        task.task_id,
        task.tipo_relatorio,
        output_path.display()
    );

    let mut sink = CsvSink::create(&output_path).map_err(|err| {
        TaskError::new(
            "EXPORT_IO",
            format!("creating {}: {err}", output_path.display()),
        )
    })?;

    let def = match reports::resolve(&task.tipo_relatorio) {
        Some(def) => def,
        None => {
            return Err(reject_into_file(
                &mut sink,
                "UNKNOWN_REPORT_TYPE",
                format!(
                    "ERRO: Tipo de relatorio '{}' nao reconhecido.",
                    task.tipo_relatorio
                ),
            ));
        }
    };

    let mut bound_params = Vec::with_capacity(def.required_params.len());
    for name in def.required_params {
        match task.parametros.get(*name) {
            Some(value) => bound_params.push(value.as_str()),
            None => {
                return Err(reject_into_file(
                    &mut sink,
                    "MISSING_PARAM",
                    format!("ERRO: Parametro '{name}' ausente."),
                ));
            }
        }
    }

    // Explicit prepare so a bad query is caught before the header is
    // written; the file stays empty on this path.
    let stmt = db.prepare(def.query).await.map_err(|err| {
        TaskError::new(
            "QUERY_PREPARE",
            format!("preparing {}: {err}", def.report_type),
        )
    })?;

    let mut query = stmt.query();
    for value in &bound_params {
        query = query.bind(*value);
    }

    sink.write_header(def.csv_header)
        .map_err(|err| TaskError::new("EXPORT_IO", err.to_string()))?;

    // One row is decoded and written before the next is fetched; the
    // result set never has to fit in memory.
    let mut rows = query.fetch(db);
    let mut row_count: u64 = 0;
    loop {
        let row = match rows.try_next().await {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(err) => {
                // Rows written so far are intentionally left in place.
                return Err(TaskError::new(
                    "ROW_FETCH",
                    format!("after {row_count} rows: {err}"),
                ));
            }
        };

        let cells = decode_row(&row)
            .map_err(|err| TaskError::new("ROW_DECODE", err.to_string()))?;
        sink.write_row(&cells)
            .map_err(|err| TaskError::new("EXPORT_IO", err.to_string()))?;
        row_count += 1;
    }
    drop(rows);

    sink.flush()
        .map_err(|err| TaskError::new("EXPORT_IO", err.to_string()))?;

    println!(
        "task {}: relatorio concluido, {row_count} linhas em {}",
        task.task_id,
        output_path.display()
    );
    Ok(row_count)
}

/// Writes the diagnostic into the output artifact, flushes it, and
/// hands back the task error for the dispatcher's log.
fn reject_into_file<W: Write>(
    sink: &mut CsvSink<W>,
    code: &'static str,
    diagnostic: String,
) -> TaskError {
    if let Err(err) = sink
        .write_diagnostic(&diagnostic)
        .and_then(|()| sink.flush())
    {
        eprintln!("failed to write diagnostic line: {err}");
    }
    TaskError::new(code, diagnostic)
}

/// The producer names the output file, so the name must stay inside
/// the export directory: a single normal path component, no
/// separators, no parent-directory traversal.
fn sanitize_filename(name: &str) -> Result<&str, TaskError> {
    let mut components = Path::new(name).components();
    let plain = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();

    if !plain || name.contains('/') || name.contains('\\') {
        return Err(TaskError::new(
            "INVALID_FILENAME",
            format!("output_filename '{name}' is not a plain file name"),
        ));
    }
    Ok(name)
}

/// Maps a result row to typed cells using each value's storage class,
/// the same rule the CSV quoting decision is based on.
fn decode_row(row: &SqliteRow) -> Result<Vec<CellValue>, sqlx::Error> {
    let mut cells = Vec::with_capacity(row.len());
    for i in 0..row.len() {
        let raw = row.try_get_raw(i)?;
        let cell = if raw.is_null() {
            CellValue::Null
        } else {
            match raw.type_info().name() {
                "TEXT" => CellValue::Text(row.try_get(i)?),
                "INTEGER" => CellValue::Integer(row.try_get(i)?),
                "REAL" => CellValue::Real(row.try_get(i)?),
                _ => CellValue::Blob(row.try_get(i)?),
            }
        };
        cells.push(cell);
    }
    Ok(cells)
}
