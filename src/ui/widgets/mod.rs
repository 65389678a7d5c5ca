// src/ui/widgets/mod.rs

// Console building blocks. Text widgets write to any `io::Write`, so they
// can be rendered into a buffer in tests; the live bar belongs to indicatif.
pub mod progress;
pub mod results;
pub mod status;
pub mod summary;
