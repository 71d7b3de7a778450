use chrono::{DateTime, Datelike, Utc};

use crate::config::AnomalyDetectionConfig;
use crate::payment::PaymentRecord;

use super::rules;
use super::types::{
    AmountLevel, Anomaly, AnomalyAssessment, AnomalyType, RuleDescriptor, Severity, Status,
};

const MAX_RISK_SCORE: u32 = 100;

/// The anomaly detection engine. Runs every rule against one payment and
/// folds the hits into a single assessment.
#[derive(Debug, Clone)]
pub struct AnomalyEngine {
    config: AnomalyDetectionConfig,
}

impl AnomalyEngine {
    pub fn new(config: AnomalyDetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnomalyDetectionConfig {
        &self.config
    }

    /// Assess a payment against the wall clock.
    pub fn assess(&self, payment: &PaymentRecord) -> AnomalyAssessment {
        self.assess_at(payment, Utc::now())
    }

    /// Assess a payment as of `now`. `now` supplies the current year and
    /// `last_checked`; nothing else depends on it.
    pub fn assess_at(&self, payment: &PaymentRecord, now: DateTime<Utc>) -> AnomalyAssessment {
        let current_year = now.year();
        let mut anomalies: Vec<Anomaly> = Vec::new();

        // Rules 1-4: amount brackets, at most one fires
        anomalies.extend(rules::check_very_small_payment(payment));
        anomalies.extend(rules::check_small_payment(payment));
        anomalies.extend(rules::check_large_payment(payment));
        anomalies.extend(rules::check_very_large_payment(payment));

        // Rules 5-6: payment year
        anomalies.extend(rules::check_future_payment(payment, current_year));
        anomalies.extend(rules::check_old_payment(payment, current_year));

        // Rule 7
        anomalies.extend(rules::check_suspicious_payment_mode(
            payment,
            &self.config.suspicious_payment_modes,
        ));

        // Rule 8
        anomalies.extend(rules::check_invalid_date_format(payment));

        // Rule 9: independent of the brackets
        anomalies.extend(rules::check_round_number(payment));

        let severity = anomalies
            .iter()
            .filter_map(|a| a.anomaly_type.severity_floor())
            .max()
            .unwrap_or(Severity::Low);

        let raw_score: u32 = anomalies.iter().map(|a| a.anomaly_type.weight()).sum();
        let risk_score = raw_score.min(MAX_RISK_SCORE) as u8;

        let status = derive_status(severity, &anomalies);
        let amount_level = amount_level(payment.amount);

        tracing::debug!(
            payment_id = %payment.id,
            anomalies = anomalies.len(),
            risk_score,
            status = status.as_str(),
            "Payment assessed"
        );

        AnomalyAssessment {
            anomalies,
            severity,
            status,
            risk_score,
            amount_level,
            last_checked: now,
        }
    }

    /// Assess a batch of payments against a single clock reading.
    pub fn assess_batch(&self, payments: &[PaymentRecord]) -> Vec<AnomalyAssessment> {
        let now = Utc::now();
        payments.iter().map(|p| self.assess_at(p, now)).collect()
    }

    /// The rule set in evaluation order.
    pub fn rule_table(&self) -> Vec<RuleDescriptor> {
        AnomalyType::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| RuleDescriptor {
                order: i + 1,
                anomaly_type: *t,
                trigger: trigger_text(*t),
                weight: t.weight(),
                severity_floor: t.severity_floor(),
            })
            .collect()
    }
}

impl Default for AnomalyEngine {
    fn default() -> Self {
        Self::new(AnomalyDetectionConfig::default())
    }
}

/// Assess a payment with the default configuration.
pub fn assess(payment: &PaymentRecord) -> AnomalyAssessment {
    AnomalyEngine::default().assess(payment)
}

/// Classify payment size for display. Independent of the anomaly brackets:
/// 500 is the lower edge of `Medium` and 5000 is still `Medium`.
/// A NaN amount classifies as `Low`.
pub fn amount_level(amount: f64) -> AmountLevel {
    if amount > 5_000.0 {
        AmountLevel::High
    } else if amount >= 500.0 {
        AmountLevel::Medium
    } else {
        AmountLevel::Low
    }
}

// Floor-less hits leave severity at Low, which maps to Normal. Nothing
// currently reaches Notice.
fn derive_status(severity: Severity, anomalies: &[Anomaly]) -> Status {
    if anomalies.is_empty() {
        return Status::Normal;
    }
    match severity {
        Severity::High => Status::Danger,
        Severity::Medium => Status::Warning,
        Severity::Low => Status::Normal,
    }
}

fn trigger_text(anomaly_type: AnomalyType) -> &'static str {
    match anomaly_type {
        AnomalyType::VerySmallPayment => "amount < 100",
        AnomalyType::SmallPayment => "100 <= amount < 500",
        AnomalyType::LargePayment => "5000 < amount <= 20000",
        AnomalyType::VeryLargePayment => "amount > 20000",
        AnomalyType::FuturePayment => "year > current year",
        AnomalyType::OldPayment => "year < current year - 5",
        AnomalyType::SuspiciousPaymentMode => "payment mode in suspicious set",
        AnomalyType::InvalidDateFormat => "date not MM/DD/YYYY",
        AnomalyType::RoundNumberPayment => "amount % 1000 == 0 and amount >= 1000",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const YEAR: i32 = 2026;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(YEAR, 10, 16, 12, 0, 0).unwrap()
    }

    fn clean(amount: f64) -> PaymentRecord {
        PaymentRecord::new("pay_1", amount)
            .with_client("INV-001", "Acme Corp")
            .with_year(YEAR)
            .with_date("10/16/2026")
            .with_payment_mode("Credit Card")
    }

    fn types(assessment: &AnomalyAssessment) -> Vec<AnomalyType> {
        assessment.anomalies.iter().map(|a| a.anomaly_type).collect()
    }

    #[test]
    fn test_clean_payment_is_normal() {
        let engine = AnomalyEngine::default();
        let result = engine.assess_at(&clean(1200.0), now());
        assert!(result.anomalies.is_empty());
        assert_eq!(result.status, Status::Normal);
        assert_eq!(result.severity, Severity::Low);
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.amount_level, AmountLevel::Medium);
        assert_eq!(result.last_checked, now());
    }

    #[test]
    fn test_small_payment_stays_normal() {
        let engine = AnomalyEngine::default();
        for amount in [100.0, 250.0, 499.99] {
            let result = engine.assess_at(&clean(amount), now());
            assert_eq!(types(&result), vec![AnomalyType::SmallPayment]);
            assert_eq!(result.risk_score, 10);
            assert_eq!(result.severity, Severity::Low);
            assert_eq!(result.status, Status::Normal);
        }
    }

    #[test]
    fn test_very_large_payment_is_danger() {
        let engine = AnomalyEngine::default();
        let result = engine.assess_at(&clean(25_500.0), now());
        assert_eq!(types(&result), vec![AnomalyType::VeryLargePayment]);
        assert_eq!(result.risk_score, 70);
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.status, Status::Danger);
        assert_eq!(result.amount_level, AmountLevel::High);
    }

    #[test]
    fn test_round_very_large_payment_co_fires() {
        let engine = AnomalyEngine::default();
        let result = engine.assess_at(&clean(25_000.0), now());
        assert_eq!(
            types(&result),
            vec![AnomalyType::VeryLargePayment, AnomalyType::RoundNumberPayment]
        );
        assert_eq!(result.risk_score, 85);
        assert_eq!(result.status, Status::Danger);
        assert!(result.has(AnomalyType::RoundNumberPayment));
        assert!(!result.has(AnomalyType::LargePayment));
    }

    #[test]
    fn test_round_thousand_mid_bracket() {
        let engine = AnomalyEngine::default();
        let result = engine.assess_at(&clean(2000.0), now());
        assert_eq!(types(&result), vec![AnomalyType::RoundNumberPayment]);
        assert_eq!(result.risk_score, 15);
        assert_eq!(result.status, Status::Normal);
    }

    #[test]
    fn test_future_year_is_danger() {
        let engine = AnomalyEngine::default();
        let payment = clean(1200.0).with_year(YEAR + 1);
        let result = engine.assess_at(&payment, now());
        assert_eq!(types(&result), vec![AnomalyType::FuturePayment]);
        assert_eq!(result.risk_score, 80);
        assert_eq!(result.status, Status::Danger);
    }

    #[test]
    fn test_iso_date_with_cash_is_warning() {
        let engine = AnomalyEngine::default();
        let payment = clean(1200.0)
            .with_date("2024-01-15")
            .with_payment_mode("Cash");
        let result = engine.assess_at(&payment, now());
        assert_eq!(
            types(&result),
            vec![
                AnomalyType::SuspiciousPaymentMode,
                AnomalyType::InvalidDateFormat
            ]
        );
        assert_eq!(result.risk_score, 70);
        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.status, Status::Warning);
    }

    #[test]
    fn test_old_payment_is_warning() {
        let engine = AnomalyEngine::default();
        let result = engine.assess_at(&clean(1200.0).with_year(YEAR - 6), now());
        assert_eq!(types(&result), vec![AnomalyType::OldPayment]);
        assert_eq!(result.status, Status::Warning);
    }

    #[test]
    fn test_risk_score_clamps_at_100() {
        let engine = AnomalyEngine::default();
        // Brackets are disjoint, so pile up every other rule instead
        let payment = PaymentRecord::new("pay_x", 30_000.0)
            .with_year(YEAR + 1)
            .with_date("tomorrow")
            .with_payment_mode("Other");
        let result = engine.assess_at(&payment, now());
        assert_eq!(result.anomalies.len(), 5);
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.status, Status::Danger);
    }

    #[test]
    fn test_amount_level_boundaries() {
        assert_eq!(amount_level(499.99), AmountLevel::Low);
        assert_eq!(amount_level(500.0), AmountLevel::Medium);
        assert_eq!(amount_level(500.01), AmountLevel::Medium);
        assert_eq!(amount_level(5000.0), AmountLevel::Medium);
        assert_eq!(amount_level(5000.01), AmountLevel::High);
        assert_eq!(amount_level(f64::NAN), AmountLevel::Low);
    }

    #[test]
    fn test_nan_amount_still_runs_other_rules() {
        let engine = AnomalyEngine::default();
        let payment = PaymentRecord::new("pay_nan", f64::NAN)
            .with_year(YEAR)
            .with_payment_mode("Cash");
        let result = engine.assess_at(&payment, now());
        assert_eq!(
            types(&result),
            vec![
                AnomalyType::SuspiciousPaymentMode,
                AnomalyType::InvalidDateFormat
            ]
        );
        assert_eq!(result.amount_level, AmountLevel::Low);
    }

    #[test]
    fn test_junk_record_degrades_gracefully() {
        let engine = AnomalyEngine::default();
        let payment: PaymentRecord = serde_json::from_str(
            r#"{"id":"junk","amount":"n/a","year":"?","date":"01/01/2026","paymentMode":"Barter"}"#,
        )
        .unwrap();
        let result = engine.assess_at(&payment, now());
        assert!(result.anomalies.is_empty());
        assert_eq!(result.status, Status::Normal);
        assert_eq!(result.risk_score, 0);
    }

    #[test]
    fn test_configured_suspicious_modes() {
        let engine = AnomalyEngine::new(AnomalyDetectionConfig {
            suspicious_payment_modes: vec!["Crypto".to_string()],
        });
        let result = engine.assess_at(&clean(1200.0).with_payment_mode("Crypto"), now());
        assert_eq!(types(&result), vec![AnomalyType::SuspiciousPaymentMode]);
        let result = engine.assess_at(&clean(1200.0).with_payment_mode("Cash"), now());
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_assessment_is_idempotent() {
        let engine = AnomalyEngine::default();
        let payment = clean(75.0).with_date("bad").with_payment_mode("Other");
        let first = engine.assess_at(&payment, now());
        let second = engine.assess_at(&payment, now());
        assert!(first.same_verdict(&second));
        assert_eq!(first.last_checked, second.last_checked);
    }

    #[test]
    fn test_status_never_notice() {
        let engine = AnomalyEngine::default();
        for amount in [f64::NAN, 0.0, 150.0, 1000.0, 3000.0, 8000.0, 50_000.0] {
            for year in [YEAR - 10, YEAR, YEAR + 2] {
                for mode in ["Cash", "Check", "Bank Transfer"] {
                    for date in ["01/02/2026", "2026-01-02"] {
                        let payment = PaymentRecord::new("p", amount)
                            .with_year(year)
                            .with_payment_mode(mode)
                            .with_date(date);
                        let result = engine.assess_at(&payment, now());
                        assert_ne!(result.status, Status::Notice);
                        assert!(result.risk_score <= 100);
                        assert_eq!(result.anomalies.is_empty(), result.risk_score == 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_rule_table_order() {
        let table = AnomalyEngine::default().rule_table();
        assert_eq!(table.len(), 9);
        assert_eq!(table[0].anomaly_type, AnomalyType::VerySmallPayment);
        assert_eq!(table[8].anomaly_type, AnomalyType::RoundNumberPayment);
        assert_eq!(table[3].severity_floor, Some(Severity::High));
        assert_eq!(table[1].severity_floor, None);
    }

    #[test]
    fn test_free_function_uses_wall_clock() {
        let current = Utc::now().year();
        let payment = PaymentRecord::new("p", 1200.0)
            .with_year(current)
            .with_date("01/01/2020")
            .with_payment_mode("Check");
        let result = assess(&payment);
        assert_eq!(result.status, Status::Normal);
    }
}
