use crate::payment::PaymentRecord;

use super::types::{Anomaly, AnomalyType};

// Anomaly brackets. These deliberately differ from the amount-level
// thresholds in `engine::amount_level`.
const VERY_SMALL_BELOW: f64 = 100.0;
const SMALL_BELOW: f64 = 500.0;
const LARGE_ABOVE: f64 = 5_000.0;
const VERY_LARGE_ABOVE: f64 = 20_000.0;
const ROUND_UNIT: f64 = 1_000.0;
const MAX_AGE_YEARS: i32 = 5;

fn anomaly(
    anomaly_type: AnomalyType,
    description: String,
    impact: &str,
    recommendation: &str,
) -> Anomaly {
    Anomaly {
        anomaly_type,
        description,
        impact: impact.to_string(),
        recommendation: recommendation.to_string(),
    }
}

/// Rule 1: amount below 100.
pub fn check_very_small_payment(payment: &PaymentRecord) -> Option<Anomaly> {
    if payment.amount < VERY_SMALL_BELOW {
        return Some(anomaly(
            AnomalyType::VerySmallPayment,
            format!(
                "Payment amount {:.2} is below {:.0}",
                payment.amount, VERY_SMALL_BELOW
            ),
            "May indicate a test transaction or a data entry error",
            "Confirm the amount with the client before reconciling",
        ));
    }
    None
}

/// Rule 2: amount in [100, 500).
pub fn check_small_payment(payment: &PaymentRecord) -> Option<Anomaly> {
    if payment.amount >= VERY_SMALL_BELOW && payment.amount < SMALL_BELOW {
        return Some(anomaly(
            AnomalyType::SmallPayment,
            format!(
                "Payment amount {:.2} is below {:.0}",
                payment.amount, SMALL_BELOW
            ),
            "Low-value payments can hide partial settlement of an invoice",
            "Check whether the related invoice is fully paid",
        ));
    }
    None
}

/// Rule 3: amount in (5000, 20000].
pub fn check_large_payment(payment: &PaymentRecord) -> Option<Anomaly> {
    if payment.amount > LARGE_ABOVE && payment.amount <= VERY_LARGE_ABOVE {
        return Some(anomaly(
            AnomalyType::LargePayment,
            format!(
                "Payment amount {:.2} exceeds {:.0}",
                payment.amount, LARGE_ABOVE
            ),
            "Large payments carry higher financial exposure if misapplied",
            "Verify the payment against the invoice and bank statement",
        ));
    }
    None
}

/// Rule 4: amount above 20000.
pub fn check_very_large_payment(payment: &PaymentRecord) -> Option<Anomaly> {
    if payment.amount > VERY_LARGE_ABOVE {
        return Some(anomaly(
            AnomalyType::VeryLargePayment,
            format!(
                "Payment amount {:.2} exceeds {:.0}",
                payment.amount, VERY_LARGE_ABOVE
            ),
            "Significant financial exposure; a typo here materially misstates revenue",
            "Require a second approver and confirm receipt with the bank",
        ));
    }
    None
}

/// Rule 5: payment year after the current year.
pub fn check_future_payment(payment: &PaymentRecord, current_year: i32) -> Option<Anomaly> {
    let year = payment.year?;
    if year > current_year {
        return Some(anomaly(
            AnomalyType::FuturePayment,
            format!("Payment year {} is after the current year {}", year, current_year),
            "Future-dated payments distort period reporting",
            "Correct the payment year or confirm it is a scheduled payment",
        ));
    }
    None
}

/// Rule 6: payment year more than five years back.
pub fn check_old_payment(payment: &PaymentRecord, current_year: i32) -> Option<Anomaly> {
    let year = payment.year?;
    if year < current_year - MAX_AGE_YEARS {
        return Some(anomaly(
            AnomalyType::OldPayment,
            format!(
                "Payment year {} is more than {} years before {}",
                year, MAX_AGE_YEARS, current_year
            ),
            "Stale records may belong to a closed fiscal period",
            "Check whether the record should be archived or re-dated",
        ));
    }
    None
}

/// Rule 7: payment mode in the configured suspicious set. Exact match.
pub fn check_suspicious_payment_mode(
    payment: &PaymentRecord,
    suspicious_modes: &[String],
) -> Option<Anomaly> {
    let mode = payment.payment_mode.as_deref()?;
    if suspicious_modes.iter().any(|m| m == mode) {
        return Some(anomaly(
            AnomalyType::SuspiciousPaymentMode,
            format!("Payment mode '{}' is hard to trace", mode),
            "Untraceable payment methods raise fraud and audit risk",
            "Attach a receipt or supporting document to the payment",
        ));
    }
    None
}

/// Rule 8: date not in `MM/DD/YYYY` shape. A missing date also fires.
pub fn check_invalid_date_format(payment: &PaymentRecord) -> Option<Anomaly> {
    let date = payment.date.as_deref().unwrap_or("");
    if is_mm_dd_yyyy(date) {
        return None;
    }
    let shown = if date.is_empty() { "<missing>" } else { date };
    Some(anomaly(
        AnomalyType::InvalidDateFormat,
        format!("Payment date '{}' is not in MM/DD/YYYY format", shown),
        "Malformed dates break period filters and aging reports",
        "Re-enter the date as MM/DD/YYYY",
    ))
}

/// Rule 9: whole multiple of 1000, at least 1000.
pub fn check_round_number(payment: &PaymentRecord) -> Option<Anomaly> {
    if payment.amount >= ROUND_UNIT && payment.amount % ROUND_UNIT == 0.0 {
        return Some(anomaly(
            AnomalyType::RoundNumberPayment,
            format!("Payment amount {:.0} is an exact multiple of {:.0}", payment.amount, ROUND_UNIT),
            "Round amounts are common in estimates and fabricated entries",
            "Match the payment to an invoice with the same total",
        ));
    }
    None
}

/// Shape check equivalent to `^\d{2}/\d{2}/\d{4}$` with ASCII digits.
/// Only the shape is checked: "13/45/2024" passes.
pub fn is_mm_dd_yyyy(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'/',
            _ => b.is_ascii_digit(),
        })
}
