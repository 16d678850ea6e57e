//! Background worker library for asynchronous report exports.
//!
//! Tasks arrive on a Redis list, each naming a report from a fixed
//! catalog. The processor runs the report's query against a read-only
//! SQLite database and streams the rows to a CSV file under the export
//! directory. Failed tasks are logged and dropped, never requeued.

pub mod config;
pub mod db;
pub mod processor;
pub mod queue;
pub mod reports;
pub mod sink;
pub mod task;
