use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types of anomalies the engine can detect, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyType {
    #[serde(rename = "Very Small Payment")]
    VerySmallPayment,
    #[serde(rename = "Small Payment")]
    SmallPayment,
    #[serde(rename = "Large Payment")]
    LargePayment,
    #[serde(rename = "Very Large Payment")]
    VeryLargePayment,
    #[serde(rename = "Future Payment")]
    FuturePayment,
    #[serde(rename = "Old Payment")]
    OldPayment,
    #[serde(rename = "Suspicious Payment Mode")]
    SuspiciousPaymentMode,
    #[serde(rename = "Invalid Date Format")]
    InvalidDateFormat,
    #[serde(rename = "Round Number Payment")]
    RoundNumberPayment,
}

impl AnomalyType {
    pub const ALL: [AnomalyType; 9] = [
        Self::VerySmallPayment,
        Self::SmallPayment,
        Self::LargePayment,
        Self::VeryLargePayment,
        Self::FuturePayment,
        Self::OldPayment,
        Self::SuspiciousPaymentMode,
        Self::InvalidDateFormat,
        Self::RoundNumberPayment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerySmallPayment => "Very Small Payment",
            Self::SmallPayment => "Small Payment",
            Self::LargePayment => "Large Payment",
            Self::VeryLargePayment => "Very Large Payment",
            Self::FuturePayment => "Future Payment",
            Self::OldPayment => "Old Payment",
            Self::SuspiciousPaymentMode => "Suspicious Payment Mode",
            Self::InvalidDateFormat => "Invalid Date Format",
            Self::RoundNumberPayment => "Round Number Payment",
        }
    }

    /// Points this rule adds to the risk score when it fires.
    pub fn weight(&self) -> u32 {
        match self {
            Self::VerySmallPayment => 30,
            Self::SmallPayment => 10,
            Self::LargePayment => 40,
            Self::VeryLargePayment => 70,
            Self::FuturePayment => 80,
            Self::OldPayment => 30,
            Self::SuspiciousPaymentMode => 50,
            Self::InvalidDateFormat => 20,
            Self::RoundNumberPayment => 15,
        }
    }

    /// Minimum overall severity this rule forces, if any.
    pub fn severity_floor(&self) -> Option<Severity> {
        match self {
            Self::VeryLargePayment | Self::FuturePayment => Some(Severity::High),
            Self::VerySmallPayment
            | Self::LargePayment
            | Self::OldPayment
            | Self::SuspiciousPaymentMode
            | Self::InvalidDateFormat => Some(Severity::Medium),
            Self::SmallPayment | Self::RoundNumberPayment => None,
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered severity: `High` dominates `Medium` dominates `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

/// Display status of an assessed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Normal,
    /// Never produced by the current rule set.
    Notice,
    Warning,
    Danger,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Size bucket of a payment, used for display tagging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountLevel {
    Low,
    Medium,
    High,
}

impl AmountLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// One triggered rule, described for a human reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub description: String,
    pub impact: String,
    pub recommendation: String,
}

/// The engine's verdict on a single payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyAssessment {
    pub anomalies: Vec<Anomaly>,
    pub severity: Severity,
    pub status: Status,
    pub risk_score: u8,
    pub amount_level: AmountLevel,
    pub last_checked: DateTime<Utc>,
}

impl AnomalyAssessment {
    pub fn is_flagged(&self) -> bool {
        !self.anomalies.is_empty()
    }

    pub fn has(&self, anomaly_type: AnomalyType) -> bool {
        self.anomalies.iter().any(|a| a.anomaly_type == anomaly_type)
    }

    /// Compare everything except `last_checked`.
    pub fn same_verdict(&self, other: &AnomalyAssessment) -> bool {
        self.anomalies == other.anomalies
            && self.severity == other.severity
            && self.status == other.status
            && self.risk_score == other.risk_score
            && self.amount_level == other.amount_level
    }
}

/// Static description of one rule, for consumers that render the rule table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDescriptor {
    pub order: usize,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub trigger: &'static str,
    pub weight: u32,
    pub severity_floor: Option<Severity>,
}
