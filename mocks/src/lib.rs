//! Mock implementations and test utilities for the scheduler task store
//!
//! This crate provides comprehensive testing infrastructure including:
//! - An in-memory TaskRepository with the storage engine's filter semantics
//! - Realistic test data generators
//! - Custom assertion helpers
//! - Property-based testing strategies
//! - Contract test helpers

pub mod assertions;
pub mod builders;
pub mod contracts;
pub mod fixtures;
pub mod generators;
pub mod repository;

pub use assertions::*;
pub use builders::*;
pub use contracts::*;
pub use fixtures::*;
pub use generators::*;
pub use repository::{apply_filter, matches_filter, MockTaskRepository};
