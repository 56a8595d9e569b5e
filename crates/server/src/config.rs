//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string (not needed with `STORE_BACKEND=memory`)
//! - `GENAI_API_KEY` - API key for the text-generation service
//!
//! ## Optional
//! - `SERVER_HOST` - Bind address (default: 127.0.0.1)
//! - `SERVER_PORT` - Listen port (default: 5000)
//! - `STORE_BACKEND` - `postgres` (default) or `memory` for local development
//! - `PASSCODE_TTL_MINUTES` - Passcode lifetime (default: 10)
//! - `BLOOD_BANK_FRESHNESS_DAYS` - Blood bank cache freshness window (default: 7)
//! - `GENAI_BASE_URL` - OpenAI-compatible API root (default: `https://openrouter.ai/api/v1`)
//! - `GENAI_MODEL` - Model ID (default: meta-llama/llama-3.3-70b-instruct:free)
//! - `GENAI_MAX_TOKENS` - Output bound for lookups (default: 1000)
//! - `GENAI_TEMPERATURE` - Sampling temperature for lookups (default: 0.2)
//! - `GENAI_TIMEOUT_SECS` - Generation timeout (default: 15)
//! - `GENAI_REFERER` - `HTTP-Referer` header sent to `OpenRouter`
//! - `RATE_LIMIT_ENABLED` - Per-IP limits on passcode endpoints (default: true)
//! - `LOG_FORMAT` - `json` for structured logs (also enabled on Fly.io)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (SMTP - all or nothing; without it passcodes are only logged)
//! - `SMTP_HOST` - SMTP server hostname
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//! - `SMTP_FROM` - Email sender address

use std::collections::HashMap;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_GENAI_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_GENAI_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

/// Default passcode lifetime.
pub const DEFAULT_PASSCODE_TTL_MINUTES: i64 = 10;
/// Default blood bank cache freshness window.
pub const DEFAULT_FRESHNESS_DAYS: i64 = 7;
/// Default output bound for blood bank generations.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
/// Default sampling temperature for blood bank generations.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
/// Default generation timeout.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Where records live
    pub store: StoreConfig,
    /// Passcode issuance settings
    pub passcode: PasscodeConfig,
    /// Blood bank lookup cache settings
    pub blood_banks: BloodBankConfig,
    /// Text-generation service configuration
    pub genai: GenAiConfig,
    /// SMTP configuration (None = log passcodes instead of sending)
    pub email: Option<EmailConfig>,
    /// Whether passcode endpoints are rate limited per client IP
    pub rate_limit_enabled: bool,
    /// Emit JSON logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Record store backend.
#[derive(Clone)]
pub enum StoreConfig {
    /// `PostgreSQL` (connection URL contains a password).
    Postgres { database_url: SecretString },
    /// Process-local store; data is lost on restart.
    Memory,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[REDACTED]")
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Passcode issuance settings.
#[derive(Debug, Clone, Copy)]
pub struct PasscodeConfig {
    /// How long an issued passcode stays valid.
    pub ttl: chrono::Duration,
}

impl Default for PasscodeConfig {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::minutes(DEFAULT_PASSCODE_TTL_MINUTES),
        }
    }
}

/// Blood bank lookup cache settings.
#[derive(Debug, Clone, Copy)]
pub struct BloodBankConfig {
    /// Maximum age of a cached lookup before it is refreshed.
    pub freshness: chrono::Duration,
    /// Output token bound for the generation call.
    pub max_tokens: u32,
    /// Sampling temperature for the generation call.
    pub temperature: f32,
    /// Upper bound on a single generation call.
    pub generation_timeout: Duration,
}

impl Default for BloodBankConfig {
    fn default() -> Self {
        Self {
            freshness: chrono::Duration::days(DEFAULT_FRESHNESS_DAYS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

/// Text-generation (chat completions) API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GenAiConfig {
    /// API key sent as a bearer token
    pub api_key: SecretString,
    /// API root, e.g. `https://openrouter.ai/api/v1`
    pub base_url: Url,
    /// Model ID
    pub model: String,
    /// Optional `HTTP-Referer` header (`OpenRouter` app attribution)
    pub referer: Option<String>,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for GenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("referer", &self.referer)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Email (SMTP) configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(&Vars::new(|key| std::env::var(key).ok()))
    }

    /// Load configuration from an explicit key/value map.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_vars(&Vars::new(|key| map.get(key).cloned()))
    }

    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        let host = vars.parse_or("SERVER_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = vars.parse_or("SERVER_PORT", 5000_u16)?;

        let store = match vars.or_default("STORE_BACKEND", "postgres").as_str() {
            "postgres" => StoreConfig::Postgres {
                database_url: SecretString::from(vars.required("DATABASE_URL")?),
            },
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STORE_BACKEND".to_string(),
                    format!("expected `postgres` or `memory`, got `{other}`"),
                ));
            }
        };

        let ttl_minutes = vars.parse_or("PASSCODE_TTL_MINUTES", DEFAULT_PASSCODE_TTL_MINUTES)?;
        require_positive("PASSCODE_TTL_MINUTES", ttl_minutes)?;
        let passcode = PasscodeConfig {
            ttl: chrono::Duration::minutes(ttl_minutes),
        };

        let freshness_days = vars.parse_or("BLOOD_BANK_FRESHNESS_DAYS", DEFAULT_FRESHNESS_DAYS)?;
        require_positive("BLOOD_BANK_FRESHNESS_DAYS", freshness_days)?;
        let timeout_secs =
            vars.parse_or("GENAI_TIMEOUT_SECS", DEFAULT_GENERATION_TIMEOUT.as_secs())?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "GENAI_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let temperature = vars.parse_or("GENAI_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidEnvVar(
                "GENAI_TEMPERATURE".to_string(),
                "must be between 0.0 and 2.0".to_string(),
            ));
        }
        let blood_banks = BloodBankConfig {
            freshness: chrono::Duration::days(freshness_days),
            max_tokens: vars.parse_or("GENAI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            temperature,
            generation_timeout: Duration::from_secs(timeout_secs),
        };

        let genai = GenAiConfig::from_vars(vars, blood_banks.generation_timeout)?;
        let email = EmailConfig::from_vars(vars)?;

        let rate_limit_enabled = vars.parse_or("RATE_LIMIT_ENABLED", true)?;
        let log_json = vars
            .optional("LOG_FORMAT")
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
            || vars.optional("FLY_APP_NAME").is_some();

        Ok(Self {
            host,
            port,
            store,
            passcode,
            blood_banks,
            genai,
            email,
            rate_limit_enabled,
            log_json,
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: vars
                .optional("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: vars
                .optional("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GenAiConfig {
    fn from_vars(vars: &Vars<'_>, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = vars.or_default("GENAI_BASE_URL", DEFAULT_GENAI_BASE_URL);
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("GENAI_BASE_URL".to_string(), e.to_string()))?;

        Ok(Self {
            api_key: vars.validated_secret("GENAI_API_KEY")?,
            base_url,
            model: vars.or_default("GENAI_MODEL", DEFAULT_GENAI_MODEL),
            referer: vars.optional("GENAI_REFERER"),
            timeout,
        })
    }
}

impl EmailConfig {
    /// Returns `None` when no SMTP variable is set; all of host, username,
    /// password and sender must be set together.
    fn from_vars(vars: &Vars<'_>) -> Result<Option<Self>, ConfigError> {
        let host = vars.optional("SMTP_HOST");
        let username = vars.optional("SMTP_USERNAME");
        let password = vars.optional("SMTP_PASSWORD");
        let from = vars.optional("SMTP_FROM");

        match (host, username, password, from) {
            (None, None, None, None) => Ok(None),
            (Some(smtp_host), Some(smtp_username), Some(password), Some(from_address)) => {
                validate_secret_strength(&password, "SMTP_PASSWORD")?;
                Ok(Some(Self {
                    smtp_host,
                    smtp_port: vars.parse_or("SMTP_PORT", 587_u16)?,
                    smtp_username,
                    smtp_password: SecretString::from(password),
                    from_address,
                }))
            }
            _ => Err(ConfigError::InvalidEnvVar(
                "SMTP_*".to_string(),
                "SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD and SMTP_FROM must be set together"
                    .to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup shared by `from_env` and `from_map`.
struct Vars<'a> {
    lookup: Box<dyn Fn(&str) -> Option<String> + 'a>,
}

impl<'a> Vars<'a> {
    fn new(lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Load and validate a required secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

fn require_positive(key: &str, value: i64) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TEST_API_KEY: &str = "sk-or-v1-9fQ2xL7pZ3mK8vB1nR6tY4wE0aJ5cH";

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgres://localhost/bloodconnect".to_string(),
            ),
            ("GENAI_API_KEY".to_string(), TEST_API_KEY.to_string()),
        ])
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"a".repeat(33), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(TEST_API_KEY, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_map(&base_vars()).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert!(matches!(config.store, StoreConfig::Postgres { .. }));
        assert_eq!(config.passcode.ttl, chrono::Duration::minutes(10));
        assert_eq!(config.blood_banks.freshness, chrono::Duration::days(7));
        assert_eq!(config.blood_banks.max_tokens, 1000);
        assert!((config.blood_banks.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.blood_banks.generation_timeout, Duration::from_secs(15));
        assert_eq!(config.genai.base_url.as_str(), "https://openrouter.ai/api/v1");
        assert_eq!(config.genai.model, DEFAULT_GENAI_MODEL);
        assert!(config.email.is_none());
        assert!(config.rate_limit_enabled);
        assert!(!config.log_json);
    }

    #[test]
    fn test_missing_database_url() {
        let mut vars = base_vars();
        vars.remove("DATABASE_URL");
        let err = ServerConfig::from_map(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "DATABASE_URL"));
    }

    #[test]
    fn test_memory_backend_needs_no_database() {
        let mut vars = base_vars();
        vars.remove("DATABASE_URL");
        vars.insert("STORE_BACKEND".to_string(), "memory".to_string());
        let config = ServerConfig::from_map(&vars).unwrap();
        assert!(matches!(config.store, StoreConfig::Memory));
    }

    #[test]
    fn test_unknown_backend() {
        let mut vars = base_vars();
        vars.insert("STORE_BACKEND".to_string(), "mongo".to_string());
        assert!(matches!(
            ServerConfig::from_map(&vars),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_ttl_and_freshness_overrides() {
        let mut vars = base_vars();
        vars.insert("PASSCODE_TTL_MINUTES".to_string(), "5".to_string());
        vars.insert("BLOOD_BANK_FRESHNESS_DAYS".to_string(), "1".to_string());
        let config = ServerConfig::from_map(&vars).unwrap();
        assert_eq!(config.passcode.ttl, chrono::Duration::minutes(5));
        assert_eq!(config.blood_banks.freshness, chrono::Duration::days(1));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut vars = base_vars();
        vars.insert("PASSCODE_TTL_MINUTES".to_string(), "0".to_string());
        assert!(ServerConfig::from_map(&vars).is_err());
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = base_vars();
        vars.insert("SERVER_PORT".to_string(), "not-a-port".to_string());
        assert!(matches!(
            ServerConfig::from_map(&vars),
            Err(ConfigError::InvalidEnvVar(ref k, _)) if k == "SERVER_PORT"
        ));
    }

    #[test]
    fn test_partial_smtp_rejected() {
        let mut vars = base_vars();
        vars.insert("SMTP_HOST".to_string(), "smtp.gmail.com".to_string());
        assert!(matches!(
            ServerConfig::from_map(&vars),
            Err(ConfigError::InvalidEnvVar(ref k, _)) if k == "SMTP_*"
        ));
    }

    #[test]
    fn test_full_smtp() {
        let mut vars = base_vars();
        vars.insert("SMTP_HOST".to_string(), "smtp.gmail.com".to_string());
        vars.insert("SMTP_USERNAME".to_string(), "bloodconnect@gmail.com".to_string());
        vars.insert("SMTP_PASSWORD".to_string(), "qz7Wm2Xk9Lp4Rv8T".to_string());
        vars.insert("SMTP_FROM".to_string(), "bloodconnect@gmail.com".to_string());
        vars.insert("SMTP_PORT".to_string(), "465".to_string());
        let config = ServerConfig::from_map(&vars).unwrap();
        let email = config.email.unwrap();
        assert_eq!(email.smtp_host, "smtp.gmail.com");
        assert_eq!(email.smtp_port, 465);
    }

    #[test]
    fn test_log_format_json() {
        let mut vars = base_vars();
        vars.insert("LOG_FORMAT".to_string(), "JSON".to_string());
        assert!(ServerConfig::from_map(&vars).unwrap().log_json);
    }

    #[test]
    fn test_genai_config_debug_redacts_secrets() {
        let config = ServerConfig::from_map(&base_vars()).unwrap();
        let debug_output = format!("{:?}", config.genai);
        assert!(debug_output.contains("openrouter.ai"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(TEST_API_KEY));
    }

    #[test]
    fn test_store_config_debug_redacts_url() {
        let config = ServerConfig::from_map(&base_vars()).unwrap();
        let debug_output = format!("{:?}", config.store);
        assert!(!debug_output.contains("postgres://"));
    }

    #[test]
    fn test_email_config_debug_redacts_secrets() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "donors@example.com".to_string(),
            smtp_password: SecretString::from("super_secret_smtp_password"),
            from_address: "noreply@example.com".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_smtp_password"));
    }
}
