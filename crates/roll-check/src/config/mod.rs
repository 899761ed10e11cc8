use std::env;
use std::fmt;
use std::time::Duration;

const DEFAULT_FORM_URL: &str = "https://check.aec.gov.au/";

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub browser: BrowserConfig,
    pub check: CheckConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let form_url = env::var("APP_FORM_URL").unwrap_or_else(|_| DEFAULT_FORM_URL.to_string());
        let headless = read_bool("APP_BROWSER_HEADLESS", false)?;

        let check = CheckConfig {
            poll_interval: Duration::from_millis(read_u64("APP_POLL_INTERVAL_MS", 1000)?),
            settle_delay: Duration::from_millis(read_u64("APP_SETTLE_DELAY_MS", 100)?),
            record_delay: Duration::from_millis(read_u64("APP_RECORD_DELAY_MS", 500)?),
            verdict_polls: read_u64("APP_VERDICT_POLLS", 5)?
                .try_into()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: "APP_VERDICT_POLLS",
                })?,
            captcha_timeout: read_optional_u64("APP_CAPTCHA_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            reference_template: env::var("APP_REFERENCE_URL_TEMPLATE")
                .ok()
                .filter(|value| !value.trim().is_empty()),
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            browser: BrowserConfig { form_url, headless },
            check,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where the lookup form lives and how the browser is launched.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub form_url: String,
    /// The operator has to read the CAPTCHA, so the window is visible unless asked otherwise.
    pub headless: bool,
}

/// Pacing and limits for the per-record check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub record_delay: Duration,
    pub verdict_polls: u32,
    pub captcha_timeout: Option<Duration>,
    pub reference_template: Option<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            settle_delay: Duration::from_millis(100),
            record_delay: Duration::from_millis(500),
            verdict_polls: 5,
            captcha_timeout: None,
            reference_template: None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    Ok(read_optional_u64(key)?.unwrap_or(default))
}

fn read_optional_u64(key: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(None),
    }
}

fn read_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { key }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str },
    InvalidBool { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative whole number")
            }
            ConfigError::InvalidBool { key } => {
                write!(f, "{key} must be true/false, yes/no, on/off or 1/0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
