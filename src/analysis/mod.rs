//! Analysis and result aggregation modules
//!
//! Combines the estimator outputs into the final report:
//! - Result types
//! - Aggregation with per-estimator fault containment
//! - Advisory notes, condition scores and personal baselines
//! - Metadata

pub mod advisory;
pub mod aggregator;
pub mod baseline;
pub mod metadata;
pub mod result;
pub mod scoring;
