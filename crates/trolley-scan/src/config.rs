//! # Trolley Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TROLLEY_DB_PATH=/var/lib/trolley/catalog.db                        │
//! │     TROLLEY_TAX_RATE_BPS=800                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/trolley/trolley.toml (Linux)                             │
//! │     ~/Library/Application Support/com.smarttrolley.trolley/ (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     all symbologies, 2 s reset delay, 10% tax                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [catalog]
//! database_path = "/var/lib/trolley/catalog.db"
//! lookup_timeout_ms = 5000   # 0 = wait forever
//!
//! [scanner]
//! symbologies = ["EAN-13", "EAN-8", "UPC-A"]
//! try_harder = true
//!
//! [workflow]
//! reset_delay_ms = 2000
//! notification_ms = 3000
//! order_placed_ms = 4000
//!
//! [checkout]
//! tax_rate_bps = 1000
//! currency_symbol = "$"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use trolley_core::notification::{DEFAULT_NOTIFICATION_MS, ORDER_PLACED_MS};
use trolley_core::validation::validate_tax_rate_bps;
use trolley_core::{Money, Symbology, TaxRate, DEFAULT_TAX_RATE_BPS};

use crate::error::{ConfigError, ConfigResult};

const CONFIG_FILE_NAME: &str = "trolley.toml";
const DATABASE_FILE_NAME: &str = "catalog.db";

/// Longest post-add reset delay accepted.
const MAX_RESET_DELAY_MS: u64 = 60_000;

// =============================================================================
// Sections
// =============================================================================

/// Where products are looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// SQLite catalog file. `None` uses the per-user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Per-lookup timeout. 0 disables it.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_ms: u64,
}

fn default_lookup_timeout() -> u64 {
    5000
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            database_path: None,
            lookup_timeout_ms: default_lookup_timeout(),
        }
    }
}

/// Barcode decoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSettings {
    #[serde(default = "default_symbologies")]
    pub symbologies: Vec<Symbology>,

    /// Slower, more thorough decoding.
    #[serde(default = "default_true")]
    pub try_harder: bool,
}

fn default_symbologies() -> Vec<Symbology> {
    Symbology::ALL.to_vec()
}

fn default_true() -> bool {
    true
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            symbologies: default_symbologies(),
            try_harder: true,
        }
    }
}

/// Scan workflow timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// How long the "added" confirmation stays before the session resets.
    #[serde(default = "default_reset_delay")]
    pub reset_delay_ms: u64,

    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,

    #[serde(default = "default_order_placed_ms")]
    pub order_placed_ms: u64,
}

fn default_reset_delay() -> u64 {
    2000
}

fn default_notification_ms() -> u64 {
    DEFAULT_NOTIFICATION_MS
}

fn default_order_placed_ms() -> u64 {
    ORDER_PLACED_MS
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        WorkflowSettings {
            reset_delay_ms: default_reset_delay(),
            notification_ms: default_notification_ms(),
            order_placed_ms: default_order_placed_ms(),
        }
    }
}

impl WorkflowSettings {
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

/// Order totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Basis points: 1000 = 10%.
    #[serde(default = "default_tax_rate")]
    pub tax_rate_bps: u32,

    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

fn default_tax_rate() -> u32 {
    DEFAULT_TAX_RATE_BPS
}

fn default_currency() -> String {
    "$".to_string()
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            tax_rate_bps: default_tax_rate(),
            currency_symbol: default_currency(),
        }
    }
}

impl CheckoutSettings {
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Formats an amount with the configured currency symbol.
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            self.currency_symbol,
            amount.dollars().abs(),
            amount.cents_part()
        )
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrolleyConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub workflow: WorkflowSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl TrolleyConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`trolley.toml`), if it exists
    /// 3. `TROLLEY_*` environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.scanner.symbologies.is_empty() {
            return Err(ConfigError::Invalid(
                "scanner.symbologies must list at least one symbology".into(),
            ));
        }

        if self.workflow.reset_delay_ms > MAX_RESET_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "workflow.reset_delay_ms must be at most {MAX_RESET_DELAY_MS}"
            )));
        }

        if self.workflow.notification_ms == 0 || self.workflow.order_placed_ms == 0 {
            return Err(ConfigError::Invalid(
                "notification durations must be greater than 0".into(),
            ));
        }

        validate_tax_rate_bps(self.checkout.tax_rate_bps)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.checkout.currency_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("checkout.currency_symbol is empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies `TROLLEY_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("TROLLEY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.catalog.database_path = Some(PathBuf::from(path));
        }

        if let Some(ms) = lookup("TROLLEY_LOOKUP_TIMEOUT_MS") {
            match ms.parse() {
                Ok(ms) => self.catalog.lookup_timeout_ms = ms,
                Err(_) => warn!(value = %ms, "Invalid TROLLEY_LOOKUP_TIMEOUT_MS"),
            }
        }

        if let Some(list) = lookup("TROLLEY_SYMBOLOGIES") {
            let parsed: Result<Vec<Symbology>, _> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect();
            match parsed {
                Ok(symbologies) => self.scanner.symbologies = symbologies,
                Err(e) => warn!(value = %list, error = %e, "Invalid TROLLEY_SYMBOLOGIES"),
            }
        }

        if let Some(flag) = lookup("TROLLEY_TRY_HARDER") {
            match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.scanner.try_harder = true,
                "0" | "false" | "no" | "off" => self.scanner.try_harder = false,
                _ => warn!(value = %flag, "Invalid TROLLEY_TRY_HARDER"),
            }
        }

        if let Some(ms) = lookup("TROLLEY_RESET_DELAY_MS") {
            match ms.parse() {
                Ok(ms) => self.workflow.reset_delay_ms = ms,
                Err(_) => warn!(value = %ms, "Invalid TROLLEY_RESET_DELAY_MS"),
            }
        }

        if let Some(bps) = lookup("TROLLEY_TAX_RATE_BPS") {
            match bps.parse() {
                Ok(bps) => self.checkout.tax_rate_bps = bps,
                Err(_) => warn!(value = %bps, "Invalid TROLLEY_TAX_RATE_BPS"),
            }
        }

        if let Some(symbol) = lookup("TROLLEY_CURRENCY") {
            self.checkout.currency_symbol = symbol;
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn default_database_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The configured database path, falling back to the per-user data dir.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.catalog
            .database_path
            .clone()
            .or_else(Self::default_database_path)
    }

    pub fn lookup_timeout(&self) -> Option<Duration> {
        match self.catalog.lookup_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.checkout.tax_rate()
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "smarttrolley", "trolley")
}
