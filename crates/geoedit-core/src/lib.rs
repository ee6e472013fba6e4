//! # geoedit Core
//!
//! Core types shared by the geoedit crates: the editing error taxonomy,
//! user-facing status messages, numeric entry parsing and the background
//! worker queue used for long-running geometry operations.

pub mod error;
pub mod message;
pub mod units;
pub mod worker;

pub use error::{EditorError, EditorResult};
pub use message::{MessageLevel, StatusMessage};
pub use units::{format_length, parse_value, MeasurementSystem};
pub use worker::{Completion, InlineWorker, Job, TokioWorker, WorkerQueue};
