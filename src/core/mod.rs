// src/core/mod.rs

/// Data structures shared by the scanners, the report and the console:
/// `ScanReport`, `ScanEvent`, and the per-module result types.
pub mod models;

/// Bounded-concurrency runner and the `Probe` trait every enumeration
/// module implements.
pub mod engine;

pub mod error;

/// The individual scan modules and `run_full_scan`.
pub mod scanner;

/// Static tables: port names, user agents, header weights, detector patterns.
pub mod knowledge_base;
