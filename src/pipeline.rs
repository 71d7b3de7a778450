use std::collections::BTreeMap;

use serde::Serialize;

use crate::anomaly::engine::AnomalyEngine;
use crate::anomaly::types::{AnomalyAssessment, Status};
use crate::payment::PaymentRecord;

/// One payment's identity alongside its assessment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessedPayment {
    pub id: String,
    pub number: String,
    pub client: String,
    pub assessment: AnomalyAssessment,
}

/// Aggregate counts over a batch of assessments.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub total_payments: u64,
    pub flagged_payments: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_amount_level: BTreeMap<String, u64>,
    pub by_anomaly_type: BTreeMap<String, u64>,
    pub average_risk_score: f64,
    pub max_risk_score: u8,
}

impl AssessmentSummary {
    pub fn from_results(results: &[AssessedPayment]) -> Self {
        let mut summary = AssessmentSummary {
            total_payments: results.len() as u64,
            ..Default::default()
        };

        let mut score_total = 0u64;
        for result in results {
            let assessment = &result.assessment;
            if assessment.is_flagged() {
                summary.flagged_payments += 1;
            }
            *summary
                .by_status
                .entry(assessment.status.as_str().to_string())
                .or_default() += 1;
            *summary
                .by_amount_level
                .entry(assessment.amount_level.as_str().to_string())
                .or_default() += 1;
            for anomaly in &assessment.anomalies {
                *summary
                    .by_anomaly_type
                    .entry(anomaly.anomaly_type.as_str().to_string())
                    .or_default() += 1;
            }
            score_total += assessment.risk_score as u64;
            summary.max_risk_score = summary.max_risk_score.max(assessment.risk_score);
        }

        if !results.is_empty() {
            summary.average_risk_score = score_total as f64 / results.len() as f64;
        }
        summary
    }

    pub fn count(&self, status: Status) -> u64 {
        self.by_status.get(status.as_str()).copied().unwrap_or(0)
    }
}

/// Full output of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReport {
    pub results: Vec<AssessedPayment>,
    pub summary: AssessmentSummary,
}

/// Runs the anomaly engine over a batch of payments and summarises the result.
pub struct AssessmentPipeline {
    pub engine: AnomalyEngine,
}

impl AssessmentPipeline {
    pub fn new(engine: AnomalyEngine) -> Self {
        Self { engine }
    }

    pub fn run(&self, payments: &[PaymentRecord]) -> PaymentReport {
        if payments.is_empty() {
            return PaymentReport {
                results: Vec::new(),
                summary: AssessmentSummary::default(),
            };
        }

        let results: Vec<AssessedPayment> = payments
            .iter()
            .zip(self.engine.assess_batch(payments))
            .map(|(payment, assessment)| AssessedPayment {
                id: payment.id.clone(),
                number: payment.number.clone(),
                client: payment.client.clone(),
                assessment,
            })
            .collect();

        for result in &results {
            let assessment = &result.assessment;
            if matches!(assessment.status, Status::Warning | Status::Danger) {
                let types: Vec<&str> = assessment
                    .anomalies
                    .iter()
                    .map(|a| a.anomaly_type.as_str())
                    .collect();
                tracing::warn!(
                    payment_id = %result.id,
                    client = %result.client,
                    status = assessment.status.as_str(),
                    risk_score = assessment.risk_score,
                    anomalies = ?types,
                    "ANOMALY DETECTED"
                );
            }
        }

        let summary = AssessmentSummary::from_results(&results);
        tracing::info!(
            total = summary.total_payments,
            flagged = summary.flagged_payments,
            danger = summary.count(Status::Danger),
            warning = summary.count(Status::Warning),
            max_risk_score = summary.max_risk_score,
            "Payment batch assessed"
        );

        PaymentReport { results, summary }
    }
}

impl Default for AssessmentPipeline {
    fn default() -> Self {
        Self::new(AnomalyEngine::default())
    }
}
