// src/lib.rs

//! Web reconnaissance toolkit built around one bounded-concurrency scan
//! engine. The binary in `main.rs` is a thin CLI over [`app::App`].

pub mod app;
pub mod config;
pub mod core;
pub mod logging;
pub mod ui;

pub use crate::config::ScanConfig;
pub use crate::core::engine::{EventSink, Probe, RunOutcome, ScanContext, TaskRunner};
pub use crate::core::error::{Result, ScanError};
pub use crate::core::models::{ModuleKind, ScanEvent, ScanReport};
pub use crate::core::scanner::run_full_scan;
