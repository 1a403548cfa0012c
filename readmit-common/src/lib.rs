//! # Readmit Common Library
//!
//! Shared code for the readmission risk assessment tools including:
//! - Model feature schema (the fixed 25-field record)
//! - Encoding tables and the clinical-input Feature Encoder
//! - Risk tier classification
//! - Boosted-tree model artifact loading and scoring
//! - Bulk CSV decoding
//! - Configuration resolution

pub mod assess;
pub mod batch;
pub mod config;
pub mod encoding;
pub mod error;
pub mod model;
pub mod risk;
pub mod schema;

pub use error::{Error, Result};
pub use schema::{FeatureRecord, FEATURE_COUNT, FEATURE_NAMES};
