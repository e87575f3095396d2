use crate::error::{Result, TallyError};
use crate::text::StopWords;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_CURRENCY: &str = "DH";
const DEFAULT_FAIL_THRESHOLD: f64 = 10.0;
const DEFAULT_TOP_N: usize = 10;

/// Configuration for tallybook, stored in `<data_dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TallyConfig {
    /// Label printed after money amounts
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Students strictly below this grade are failing
    #[serde(default = "default_fail_threshold")]
    pub fail_threshold: f64,

    /// How many words the frequency ranking keeps
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Abort loads on the first malformed line instead of skipping it
    #[serde(default)]
    pub strict_load: bool,

    /// Copy tasks.json aside before each save
    #[serde(default = "default_backups")]
    pub backups: bool,

    /// Replaces the built-in French stop words when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopwords: Option<Vec<String>>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_fail_threshold() -> f64 {
    DEFAULT_FAIL_THRESHOLD
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_backups() -> bool {
    true
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            fail_threshold: DEFAULT_FAIL_THRESHOLD,
            top_n: DEFAULT_TOP_N,
            strict_load: false,
            backups: true,
            stopwords: None,
        }
    }
}

/// Keys accepted by `tally config <key> [value]`.
pub const CONFIG_KEYS: &[&str] = &[
    "currency",
    "fail-threshold",
    "top-n",
    "strict-load",
    "backups",
    "stopwords",
];

impl TallyConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(TallyError::Io)?;
        let config: TallyConfig =
            serde_json::from_str(&content).map_err(TallyError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(TallyError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(TallyError::Serialization)?;
        fs::write(config_path, content).map_err(TallyError::Io)?;
        Ok(())
    }

    pub fn stopwords(&self) -> StopWords {
        match &self.stopwords {
            Some(list) => StopWords::from_list(list),
            None => StopWords::french(),
        }
    }

    /// Current value of a key, formatted for display.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "currency" => self.currency.clone(),
            "fail-threshold" => self.fail_threshold.to_string(),
            "top-n" => self.top_n.to_string(),
            "strict-load" => self.strict_load.to_string(),
            "backups" => self.backups.to_string(),
            "stopwords" => match &self.stopwords {
                Some(list) => list.join(","),
                None => "(built-in french)".to_string(),
            },
            other => return Err(unknown_key(other)),
        };
        Ok(value)
    }

    /// Parse and set a key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "currency" => self.currency = value.trim().to_string(),
            "fail-threshold" => self.fail_threshold = parse_finite(key, value)?,
            "top-n" => self.top_n = parse_value(key, value)?,
            "strict-load" => self.strict_load = parse_value(key, value)?,
            "backups" => self.backups = parse_value(key, value)?,
            "stopwords" => {
                self.stopwords = match value.trim() {
                    "" | "default" => None,
                    list => Some(
                        list.split(',')
                            .map(|w| w.trim().to_string())
                            .filter(|w| !w.is_empty())
                            .collect(),
                    ),
                }
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> TallyError {
    TallyError::Config(format!(
        "unknown config key '{}' (expected one of: {})",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TallyError::Config(format!("invalid value for {key}: '{value}'")))
}

fn parse_finite(key: &str, value: &str) -> Result<f64> {
    let parsed: f64 = parse_value(key, value)?;
    if !parsed.is_finite() {
        return Err(TallyError::Config(format!(
            "invalid value for {key}: '{value}'"
        )));
    }
    Ok(parsed)
}
