use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// A payment as entered through the payments form.
///
/// Numeric fields arrive as either numbers or strings depending on which
/// screen wrote them, so they are parsed leniently: `amount` becomes `NaN`
/// and `year` becomes `None` when the value cannot be read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub client: String,
    #[serde(default = "nan", deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub date: Option<String>,
    #[serde(default, alias = "payment_mode", deserialize_with = "deserialize_text")]
    pub payment_mode: Option<String>,
}

impl PaymentRecord {
    pub fn new(id: impl Into<String>, amount: f64) -> Self {
        Self {
            id: id.into(),
            number: String::new(),
            client: String::new(),
            amount,
            year: None,
            date: None,
            payment_mode: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_payment_mode(mut self, mode: impl Into<String>) -> Self {
        self.payment_mode = Some(mode.into());
        self
    }

    pub fn with_client(mut self, number: impl Into<String>, client: impl Into<String>) -> Self {
        self.number = number.into();
        self.client = client.into();
        self
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// Raw field value as stored by the form: a number, a string, or nothing.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Int(i64),
    Float(f64),
    Text(String),
    #[allow(dead_code)]
    Other(IgnoredAny),
}

/// Parse an amount string. Non-finite results count as unparsable.
pub fn parse_amount(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => f64::NAN,
    }
}

/// Parse a calendar year from text. Accepts "2024" and "2024.0".
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i32)
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawField>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawField::Int(v)) => v as f64,
        Some(RawField::Float(v)) if v.is_finite() => v,
        Some(RawField::Text(s)) => parse_amount(&s),
        _ => f64::NAN,
    })
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawField>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawField::Int(v)) => i32::try_from(v).ok(),
        Some(RawField::Float(v)) => parse_year(&v.to_string()),
        Some(RawField::Text(s)) => parse_year(&s),
        _ => None,
    })
}

// Empty strings are how the CSV reader reports a blank cell.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawField>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawField::Text(s)) if s.is_empty() => None,
        Some(RawField::Text(s)) => Some(s),
        Some(RawField::Int(v)) => Some(v.to_string()),
        Some(RawField::Float(v)) => Some(v.to_string()),
        _ => None,
    })
}
