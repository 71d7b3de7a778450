pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{amount_level, assess, AnomalyEngine};
pub use types::{AmountLevel, Anomaly, AnomalyAssessment, AnomalyType, Severity, Status};
