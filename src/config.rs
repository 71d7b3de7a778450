use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub anomaly_detection: AnomalyDetectionConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================================
// Anomaly Detection Config
// ============================================================

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnomalyDetectionConfig {
    /// Payment modes flagged as hard to trace. Compared exactly.
    #[serde(default = "default_suspicious_modes")]
    pub suspicious_payment_modes: Vec<String>,
}

impl Default for AnomalyDetectionConfig {
    fn default() -> Self {
        Self {
            suspicious_payment_modes: default_suspicious_modes(),
        }
    }
}

fn default_suspicious_modes() -> Vec<String> {
    vec!["Cash".to_string(), "Other".to_string()]
}

// ============================================================
// Import Config
// ============================================================

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImportConfig {
    /// CSV or JSON file of payment records to assess at startup.
    pub path: Option<String>,
    /// Where to write the JSON report. Stdout when absent.
    pub output: Option<String>,
}

// ============================================================
// API Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3000,
            host: "0.0.0.0".to_string(),
            max_batch_size: 10_000,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_port() -> u16 {
    3000
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_batch_size() -> usize {
    10_000
}

// ============================================================
// Logging Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        for mode in &self.anomaly_detection.suspicious_payment_modes {
            if mode.trim().is_empty() {
                return Err(eyre::eyre!("Suspicious payment modes must not be blank"));
            }
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(eyre::eyre!(
                "Invalid logging format '{}', expected 'text' or 'json'",
                self.logging.format
            ));
        }
        if self.api.max_batch_size == 0 {
            return Err(eyre::eyre!("api.max_batch_size must be greater than zero"));
        }
        if self.import.path.is_none() && !self.api.enabled {
            return Err(eyre::eyre!(
                "Nothing to do: set import.path or enable the API"
            ));
        }
        Ok(())
    }
}
