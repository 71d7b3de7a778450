use std::path::Path;

use crate::payment::PaymentRecord;

/// Load payment records from a `.csv` or `.json` export.
pub fn load_payments(path: &str) -> eyre::Result<Vec<PaymentRecord>> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => parse_payments_csv(path),
        Some("json") => parse_payments_json(path),
        _ => Err(eyre::eyre!(
            "Unsupported payment file '{}': expected .csv or .json",
            path
        )),
    }
}

/// Parse a payments CSV with a header row.
/// Expected columns: id, number, client, amount, year, date, paymentMode.
/// Rows the reader cannot decode are skipped; malformed field values are kept
/// for the engine to flag.
pub fn parse_payments_csv(path: &str) -> eyre::Result<Vec<PaymentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| eyre::eyre!("Failed to open payments CSV '{}': {}", path, e))?;

    let mut payments = Vec::new();
    let mut skipped = 0usize;

    for result in reader.deserialize::<PaymentRecord>() {
        match result {
            Ok(payment) => payments.push(payment),
            Err(e) => {
                skipped += 1;
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                tracing::warn!(line, error = %e, "Skipping unreadable payment row");
            }
        }
    }

    tracing::info!(payments = payments.len(), skipped, "Parsed payments CSV");
    Ok(payments)
}

/// Parse a JSON array of payment records.
pub fn parse_payments_json(path: &str) -> eyre::Result<Vec<PaymentRecord>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("Failed to read payments file '{}': {}", path, e))?;

    let payments: Vec<PaymentRecord> = serde_json::from_str(&content)
        .map_err(|e| eyre::eyre!("Failed to parse payments JSON '{}': {}", path, e))?;

    tracing::info!(payments = payments.len(), "Parsed payments JSON");
    Ok(payments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_csv() {
        let file = write_temp(
            ".csv",
            "id,number,client,amount,year,date,paymentMode\n\
             p1,INV-1,Acme,1250.50,2026,01/15/2026,Bank Transfer\n\
             p2,INV-2,Globex,abc,2026,2026-01-15,Cash\n\
             p3,INV-3,Initech,300,,,\n",
        );
        let payments = load_payments(file.path().to_str().unwrap()).unwrap();
        assert_eq!(payments.len(), 3);

        assert_eq!(payments[0].id, "p1");
        assert_eq!(payments[0].amount, 1250.5);
        assert_eq!(payments[0].year, Some(2026));
        assert_eq!(payments[0].payment_mode.as_deref(), Some("Bank Transfer"));

        assert!(payments[1].amount.is_nan());
        assert_eq!(payments[1].date.as_deref(), Some("2026-01-15"));

        assert_eq!(payments[2].amount, 300.0);
        assert_eq!(payments[2].year, None);
        assert_eq!(payments[2].date, None);
        assert_eq!(payments[2].payment_mode, None);
    }

    #[test]
    fn test_parse_json() {
        let file = write_temp(
            ".json",
            r#"[
                {"id":"p1","number":"INV-1","client":"Acme","amount":"25000","year":"2026","date":"01/15/2026","paymentMode":"Credit Card"},
                {"id":"p2","amount":75}
            ]"#,
        );
        let payments = load_payments(file.path().to_str().unwrap()).unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].amount, 25000.0);
        assert_eq!(payments[1].client, "");
        assert_eq!(payments[1].date, None);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let file = write_temp(".json", "{not json");
        let err = load_payments(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse payments JSON"));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".xlsx", "");
        assert!(load_payments(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_payments("/nonexistent/payments.csv").is_err());
    }
}
