//! Runtime configuration
//!
//! Configuration is read once at startup from environment variables, after
//! optionally loading `.env` files, and passed explicitly to the clients,
//! the analyzer and the scheduler.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `YNAB_API_TOKEN` | required |
//! | `YNAB_BUDGET_ID` | required |
//! | `YNAB_BASE_URL` | `https://api.ynab.com/v1` |
//! | `TELEGRAM_BOT_TOKEN` | required outside test mode |
//! | `TELEGRAM_CHAT_ID` | required outside test mode |
//! | `TELEGRAM_TOPIC_ID` | none |
//! | `TELEGRAM_API_URL` | `https://api.telegram.org` |
//! | `SCHEDULE_CRON` | `0 9 * * 1` (Mondays 09:00) |
//! | `SCHEDULE_TIMEZONE` (or `TZ`) | `UTC` |
//! | `LOG_LEVEL` | `info` |
//! | `LOG_FORMAT` | `text` (`json` also accepted) |
//! | `TOP_CATEGORIES_COUNT` | `0` (all categories) |
//! | `AT_RISK_PERCENT` | `75` |
//! | `OVER_BUDGET_PERCENT` | `100` |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const DEFAULT_YNAB_BASE_URL: &str = "https://api.ynab.com/v1";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_SCHEDULE_CRON: &str = "0 9 * * 1";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// `.env` locations checked by [`Config::load`], in order
pub const DEFAULT_ENV_FILES: &[&str] = &[".env", "/app/.env"];

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub ynab: YnabConfig,
    pub telegram: TelegramConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
    pub thresholds: ThresholdConfig,
    /// Problems found while reading the environment
    ///
    /// Loading runs before logging is set up, so these are kept here and
    /// emitted by [`Config::log_warnings`].
    pub warnings: Vec<String>,
    /// `.env` files that were loaded
    pub env_files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct YnabConfig {
    pub api_token: String,
    pub budget_id: String,
    pub base_url: String,
}

impl Default for YnabConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            budget_id: String::new(),
            base_url: DEFAULT_YNAB_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
    /// Forum topic (message thread) inside a supergroup
    pub topic_id: Option<i64>,
    pub base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: 0,
            topic_id: None,
            base_url: DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Cron expression (standard 5-field syntax, optional leading seconds)
    pub cron: String,
    /// IANA time zone name the expression is evaluated in
    pub timezone: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: DEFAULT_SCHEDULE_CRON.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "compact" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is not set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    /// Number of top spending categories in the report (0 = all)
    pub top_categories_count: usize,
    pub at_risk_percent: f64,
    pub over_budget_percent: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            top_categories_count: 0,
            at_risk_percent: 75.0,
            over_budget_percent: 100.0,
        }
    }
}

impl Config {
    /// Load `.env` files (if present) and then read the environment
    pub fn load() -> Result<Self> {
        let mut env_files = Vec::new();
        for path in DEFAULT_ENV_FILES {
            let path = Path::new(path);
            if load_env_file(path)? {
                env_files.push(path.to_path_buf());
            }
        }

        let mut config = Self::from_env();
        config.env_files = env_files;
        Ok(config)
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a key lookup
    ///
    /// Empty values count as unset. Values that fail to parse keep their
    /// default and are recorded in `warnings`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Config::default();
        let mut warnings = Vec::new();

        config.ynab.api_token = get("YNAB_API_TOKEN").unwrap_or_default();
        config.ynab.budget_id = get("YNAB_BUDGET_ID").unwrap_or_default();
        if let Some(url) = get("YNAB_BASE_URL") {
            config.ynab.base_url = url.trim_end_matches('/').to_string();
        }

        config.telegram.bot_token = get("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if let Some(chat_id) = parse_var(&get, &mut warnings, "TELEGRAM_CHAT_ID") {
            config.telegram.chat_id = chat_id;
        }
        config.telegram.topic_id =
            parse_var::<i64>(&get, &mut warnings, "TELEGRAM_TOPIC_ID").filter(|id| *id > 0);
        if let Some(url) = get("TELEGRAM_API_URL") {
            config.telegram.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(cron) = get("SCHEDULE_CRON") {
            config.schedule.cron = cron;
        }
        if let Some(tz) = get("SCHEDULE_TIMEZONE").or_else(|| get("TZ")) {
            config.schedule.timezone = tz;
        }

        if let Some(level) = get("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = parse_var(&get, &mut warnings, "LOG_FORMAT") {
            config.logging.format = format;
        }

        if let Some(count) = parse_var(&get, &mut warnings, "TOP_CATEGORIES_COUNT") {
            config.thresholds.top_categories_count = count;
        }
        if let Some(percent) = parse_var(&get, &mut warnings, "AT_RISK_PERCENT") {
            config.thresholds.at_risk_percent = percent;
        }
        if let Some(percent) = parse_var(&get, &mut warnings, "OVER_BUDGET_PERCENT") {
            config.thresholds.over_budget_percent = percent;
        }

        config.warnings = warnings;
        config
    }

    /// Emit what was noticed while loading, once a subscriber is installed
    pub fn log_warnings(&self) {
        for path in &self.env_files {
            debug!(path = %path.display(), "Loaded environment file");
        }
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }

    /// Check required settings
    ///
    /// YNAB credentials are always required. In test mode (dry runs) the
    /// Telegram settings are not needed.
    pub fn validate(&self, test_mode: bool) -> Result<()> {
        if self.ynab.api_token.is_empty() {
            return Err(Error::Config(
                "YNAB API token is required (set YNAB_API_TOKEN)".into(),
            ));
        }
        if self.ynab.budget_id.is_empty() {
            return Err(Error::Config(
                "YNAB budget ID is required (set YNAB_BUDGET_ID)".into(),
            ));
        }

        if test_mode {
            return Ok(());
        }

        if self.telegram.bot_token.is_empty() {
            return Err(Error::Config(
                "Telegram bot token is required (set TELEGRAM_BOT_TOKEN)".into(),
            ));
        }
        if self.telegram.chat_id == 0 {
            return Err(Error::Config(
                "Telegram chat ID is required (set TELEGRAM_CHAT_ID)".into(),
            ));
        }

        Ok(())
    }
}

/// Load KEY=VALUE pairs from a `.env` file into the process environment
///
/// Variables already set are left alone. Returns false if the file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }

    dotenv::from_path(path)
        .map_err(|e| Error::Config(format!("Failed to load {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "Loaded environment file");
    Ok(true)
}

fn parse_var<T>(
    get: &impl Fn(&str) -> Option<String>,
    warnings: &mut Vec<String>,
    key: &str,
) -> Option<T>
where
    T: FromStr,
{
    let raw = get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warnings.push(format!(
                "Ignoring unparseable value for {}: {:?} (using default)",
                key, raw
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.ynab.base_url, DEFAULT_YNAB_BASE_URL);
        assert_eq!(config.telegram.base_url, DEFAULT_TELEGRAM_API_URL);
        assert_eq!(config.schedule.cron, "0 9 * * 1");
        assert_eq!(config.schedule.timezone, "UTC");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.thresholds, ThresholdConfig::default());
        assert_eq!(config.telegram.topic_id, None);
    }

    #[test]
    fn test_reads_all_values() {
        let config = config_from(&[
            ("YNAB_API_TOKEN", "token"),
            ("YNAB_BUDGET_ID", "budget"),
            ("YNAB_BASE_URL", "http://localhost:9000/v1/"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100123"),
            ("TELEGRAM_TOPIC_ID", "42"),
            ("SCHEDULE_CRON", "30 18 * * 5"),
            ("SCHEDULE_TIMEZONE", "Europe/Berlin"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "json"),
            ("TOP_CATEGORIES_COUNT", "5"),
            ("AT_RISK_PERCENT", "80"),
            ("OVER_BUDGET_PERCENT", "110.5"),
        ]);

        assert_eq!(config.ynab.api_token, "token");
        assert_eq!(config.ynab.budget_id, "budget");
        assert_eq!(config.ynab.base_url, "http://localhost:9000/v1");
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.telegram.chat_id, -100123);
        assert_eq!(config.telegram.topic_id, Some(42));
        assert_eq!(config.schedule.cron, "30 18 * * 5");
        assert_eq!(config.schedule.timezone, "Europe/Berlin");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.thresholds.top_categories_count, 5);
        assert_eq!(config.thresholds.at_risk_percent, 80.0);
        assert_eq!(config.thresholds.over_budget_percent, 110.5);
    }

    #[test]
    fn test_invalid_numbers_keep_defaults() {
        let config = config_from(&[
            ("TELEGRAM_CHAT_ID", "not-a-number"),
            ("TOP_CATEGORIES_COUNT", "-3"),
            ("LOG_FORMAT", "xml"),
        ]);
        assert_eq!(config.telegram.chat_id, 0);
        assert_eq!(config.thresholds.top_categories_count, 0);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_unparseable_values_are_reported() {
        let config = config_from(&[
            ("TOP_CATEGORIES_COUNT", "abc"),
            ("AT_RISK_PERCENT", "lots"),
            ("TELEGRAM_CHAT_ID", "-100x"),
            ("OVER_BUDGET_PERCENT", "120"),
        ]);

        assert_eq!(config.warnings.len(), 3);
        assert!(config.warnings[0].contains("TELEGRAM_CHAT_ID"));
        assert!(config.warnings[0].contains("-100x"));
        assert!(config.warnings.iter().any(|w| w.contains("TOP_CATEGORIES_COUNT")));
        assert!(config.warnings.iter().any(|w| w.contains("AT_RISK_PERCENT")));
        assert_eq!(config.thresholds.over_budget_percent, 120.0);

        assert!(config_from(&[("TOP_CATEGORIES_COUNT", "4")]).warnings.is_empty());
    }

    #[test]
    fn test_non_positive_topic_is_ignored() {
        let config = config_from(&[("TELEGRAM_TOPIC_ID", "0")]);
        assert_eq!(config.telegram.topic_id, None);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config_from(&[("SCHEDULE_CRON", "  "), ("YNAB_API_TOKEN", "")]);
        assert_eq!(config.schedule.cron, DEFAULT_SCHEDULE_CRON);
        assert!(config.ynab.api_token.is_empty());
    }

    #[test]
    fn test_tz_fallback() {
        let config = config_from(&[("TZ", "America/New_York")]);
        assert_eq!(config.schedule.timezone, "America/New_York");

        let config = config_from(&[("TZ", "America/New_York"), ("SCHEDULE_TIMEZONE", "Asia/Tokyo")]);
        assert_eq!(config.schedule.timezone, "Asia/Tokyo");
    }

    #[test]
    fn test_validate() {
        let missing_token = config_from(&[("YNAB_BUDGET_ID", "b")]);
        let err = missing_token.validate(true).unwrap_err();
        assert!(err.to_string().contains("YNAB_API_TOKEN"));

        let missing_budget = config_from(&[("YNAB_API_TOKEN", "t")]);
        let err = missing_budget.validate(true).unwrap_err();
        assert!(err.to_string().contains("YNAB_BUDGET_ID"));

        let ynab_only = config_from(&[("YNAB_API_TOKEN", "t"), ("YNAB_BUDGET_ID", "b")]);
        assert!(ynab_only.validate(true).is_ok());
        let err = ynab_only.validate(false).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));

        let no_chat = config_from(&[
            ("YNAB_API_TOKEN", "t"),
            ("YNAB_BUDGET_ID", "b"),
            ("TELEGRAM_BOT_TOKEN", "x"),
        ]);
        let err = no_chat.validate(false).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_CHAT_ID"));

        let complete = config_from(&[
            ("YNAB_API_TOKEN", "t"),
            ("YNAB_BUDGET_ID", "b"),
            ("TELEGRAM_BOT_TOKEN", "x"),
            ("TELEGRAM_CHAT_ID", "7"),
        ]);
        assert!(complete.validate(false).is_ok());
    }

    #[test]
    fn test_load_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "WRAP_CONFIG_TEST_VALUE=\"from-dotenv\"").unwrap();
        file.flush().unwrap();

        assert!(load_env_file(file.path()).unwrap());
        assert_eq!(
            std::env::var("WRAP_CONFIG_TEST_VALUE").unwrap(),
            "from-dotenv"
        );
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_env_file(&dir.path().join("missing.env")).unwrap();
        assert!(!loaded);
    }
}
