//! Payment Sentinel
//!
//! Rule-based anomaly assessment for ERP payment records, with CSV/JSON
//! import, batch reporting, and an HTTP API.

pub mod anomaly;
pub mod api;
pub mod config;
pub mod import;
pub mod payment;
pub mod pipeline;

pub use anomaly::{assess, AnomalyAssessment, AnomalyEngine};
pub use config::Config;
pub use payment::PaymentRecord;
pub use pipeline::{AssessmentPipeline, PaymentReport};
