//! ironlog - Personal workout tracker
//!
//! Routines, resumable workout sessions and per-exercise history, stored as
//! per-user JSON documents.

pub mod analytics;
pub mod cache;
pub mod error;
pub mod exercises;
pub mod history;
pub mod models;
pub mod routines;
pub mod storage;
pub mod tui;
pub mod user;
pub mod workout;

pub use error::{Error, Result};
pub use storage::Storage;
pub use workout::{WorkoutAssembler, WorkoutSession};
