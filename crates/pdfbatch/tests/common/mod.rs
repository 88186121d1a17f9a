//! Shared test utilities for pdfbatch integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs against a temporary batch store
//! - Builders for text PDFs and zip uploads

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
