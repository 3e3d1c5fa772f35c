//! # Value Objects Sample Library
//!
//! A customer store built on `value_objects`. Exposes the modules of the sample
//! application for integration testing.

pub mod lifecycle;
pub mod model;
pub mod repository;
pub mod store;
