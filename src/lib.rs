//! Restaurant Stats
//!
//! Order statistics API over a document store, a thin proxy to the Knot
//! transaction API, and the offline pipeline that feeds the store:
//! catalog building, order synthesis, normalization and ingestion.

pub mod catalog;
pub mod config;
pub mod handlers;
pub mod ingest;
pub mod knot;
pub mod model;
pub mod query;
pub mod storage;
pub mod synth;
pub mod transform;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
