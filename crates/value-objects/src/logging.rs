//! # Logging
//!
//! The crate logs through `tracing` with structured fields:
//!
//! - `record`: class name of the host record
//! - `attribute`: the mapped attribute (or full dotted name) being worked on
//! - `event`: the lifecycle event being dispatched
//! - `epoch`: the sub-object generation of a behavior
//!
//! Per-attribute work is logged at `debug`, epoch changes and dependent class
//! switches at `info`, invalid sub-objects at `warn`.
//!
//! ```bash
//! RUST_LOG=info cargo run -p value-objects-sample
//! RUST_LOG=value_objects=debug cargo run -p value-objects-sample
//! ```

/// Installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`.
///
/// Call once, at program start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
