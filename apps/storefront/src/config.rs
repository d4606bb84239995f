//! # Storefront Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_STORE_NAME, STOREFRONT_SUBMIT_DELAY_MS,                 │
//! │     STOREFRONT_DESTINATION, STOREFRONT_CURRENCY_SYMBOL                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or the platform config dir:                       │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     demo catalog, built-in registration schema, 1000 ms delay          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Storefront"
//! currency_symbol = "$"
//! currency_decimals = 2
//!
//! [registration]
//! submit_delay_ms = 1000
//! destination = "/store"
//! success_message = "Registration successful!"
//!
//! [[catalog]]
//! id = 1
//! name = "Product 1"
//! price_cents = 1999
//! image_url = "/assets/product1.jpg"
//! rating = 4.5
//! ```
//!
//! A `[registration.schema]` table replaces the built-in form rules.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_core::validation::validate_catalog;
use storefront_core::{Catalog, CoreError, FormSchema, Product};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// Longest accepted simulated submission delay.
const MAX_SUBMIT_DELAY_MS: u64 = 60_000;

// =============================================================================
// Sections
// =============================================================================

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u8,
}

fn default_store_name() -> String {
    "Storefront".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_currency_decimals() -> u8 {
    2
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
            currency_decimals: default_currency_decimals(),
        }
    }
}

/// `[registration]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationSettings {
    /// Simulated submission latency.
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,

    /// Route handed to the navigation collaborator after success.
    #[serde(default = "default_destination")]
    pub destination: String,

    #[serde(default = "default_success_message")]
    pub success_message: String,

    /// Replaces the built-in registration rules when present.
    #[serde(default)]
    pub schema: Option<FormSchema>,
}

fn default_submit_delay_ms() -> u64 {
    1000
}

fn default_destination() -> String {
    "/store".to_string()
}

fn default_success_message() -> String {
    "Registration successful!".to_string()
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        RegistrationSettings {
            submit_delay_ms: default_submit_delay_ms(),
            destination: default_destination(),
            success_message: default_success_message(),
            schema: None,
        }
    }
}

fn default_catalog() -> Vec<Product> {
    Catalog::demo()
        .products()
        .iter()
        .map(|p| Product::clone(p))
        .collect()
}

// =============================================================================
// Storefront Config
// =============================================================================

/// Complete application configuration, read-only after startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub registration: RegistrationSettings,

    #[serde(default = "default_catalog")]
    pub catalog: Vec<Product>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            store: StoreSettings::default(),
            registration: RegistrationSettings::default(),
            catalog: default_catalog(),
        }
    }
}

impl StorefrontConfig {
    /// Loads configuration: defaults → file → environment → validate.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with overrides read through `lookup` instead of
    /// the process environment.
    fn load_with<F>(config_path: Option<PathBuf>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Like [`load`](Self::load), but falls back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store name must not be empty".into()));
        }

        if self.store.currency_decimals > 6 {
            return Err(ConfigError::Invalid(format!(
                "currency_decimals must be at most 6, got {}",
                self.store.currency_decimals
            )));
        }

        let registration = &self.registration;
        if registration.submit_delay_ms > MAX_SUBMIT_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "submit_delay_ms must be at most {}, got {}",
                MAX_SUBMIT_DELAY_MS, registration.submit_delay_ms
            )));
        }

        if !registration.destination.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "destination must be an absolute route, got: {}",
                registration.destination
            )));
        }

        if registration.success_message.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "success_message must not be empty".into(),
            ));
        }

        if let Some(schema) = &registration.schema {
            schema
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("registration schema: {}", e)))?;
        }

        validate_catalog(&self.catalog).map_err(CoreError::from)?;

        Ok(())
    }

    /// Applies `STOREFRONT_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("STOREFRONT_STORE_NAME") {
            debug!(store_name = %name, "Overriding store name from environment");
            self.store.name = name;
        }

        if let Some(delay) = lookup("STOREFRONT_SUBMIT_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => {
                    debug!(submit_delay_ms = ms, "Overriding submit delay from environment");
                    self.registration.submit_delay_ms = ms;
                }
                Err(_) => warn!(value = %delay, "Ignoring non-numeric STOREFRONT_SUBMIT_DELAY_MS"),
            }
        }

        if let Some(route) = lookup("STOREFRONT_DESTINATION") {
            debug!(destination = %route, "Overriding destination from environment");
            self.registration.destination = route;
        }

        if let Some(symbol) = lookup("STOREFRONT_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Builds the validated catalog.
    pub fn catalog(&self) -> ConfigResult<Catalog> {
        Ok(Catalog::new(self.catalog.clone())?)
    }

    /// The configured schema, or the built-in registration schema.
    pub fn schema(&self) -> Arc<FormSchema> {
        Arc::new(
            self.registration
                .schema
                .clone()
                .unwrap_or_else(FormSchema::registration),
        )
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.registration.submit_delay_ms)
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ```rust,ignore
    /// let config = StorefrontConfig::default();
    /// assert_eq!(config.format_currency(1999), "$19.99");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let decimals = u32::from(self.store.currency_decimals);
        let divisor = 10_i64.pow(decimals);
        let whole = (cents / divisor).abs();
        let frac = (cents % divisor).abs();
        let sign = if cents < 0 { "-" } else { "" };

        if decimals > 0 {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                self.store.currency_symbol,
                whole,
                frac,
                width = decimals as usize
            )
        } else {
            format!("{}{}{}", sign, self.store.currency_symbol, whole)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use storefront_core::{FieldId, ProductId};

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registration.submit_delay_ms, 1000);
        assert_eq!(config.registration.destination, "/store");
        assert_eq!(config.registration.success_message, "Registration successful!");
        assert_eq!(config.catalog.len(), 3);
        assert_eq!(config.schema().as_ref(), &FormSchema::registration());
    }

    #[test]
    fn test_format_currency() {
        let mut config = StorefrontConfig::default();
        assert_eq!(config.format_currency(1999), "$19.99");
        assert_eq!(config.format_currency(5), "$0.05");
        assert_eq!(config.format_currency(0), "$0.00");
        assert_eq!(config.format_currency(-1234), "-$12.34");

        config.store.currency_symbol = "€".to_string();
        config.store.currency_decimals = 0;
        assert_eq!(config.format_currency(42), "€42");
    }

    #[test]
    fn test_toml_file_format() {
        let source = r#"
            [store]
            name = "Corner Shop"

            [registration]
            submit_delay_ms = 250
            destination = "/welcome"

            [[catalog]]
            id = 10
            name = "Mug"
            price_cents = 899
            image_url = "/assets/mug.jpg"
            rating = 4.0
        "#;

        let config: StorefrontConfig = toml::from_str(source).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.name, "Corner Shop");
        assert_eq!(config.store.currency_symbol, "$");
        assert_eq!(config.submit_delay(), Duration::from_millis(250));
        assert_eq!(config.registration.success_message, "Registration successful!");

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find(ProductId(10)).unwrap().name, "Mug");
    }

    #[test]
    fn test_schema_override() {
        let source = r#"
            [[registration.schema.fields]]
            field = "email"
            rules = [{ rule = { kind = "email_syntax" }, message = "Bad email" }]
        "#;

        let config: StorefrontConfig = toml::from_str(source).unwrap();
        assert!(config.validate().is_ok());

        let schema = config.schema();
        assert_eq!(schema.fields().len(), 1);
        assert!(schema.spec(FieldId::Password).is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StorefrontConfig::default();

        config.registration.destination = "store".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.registration.destination = "/store".to_string();
        config.registration.submit_delay_ms = MAX_SUBMIT_DELAY_MS + 1;
        assert!(config.validate().is_err());

        config.registration.submit_delay_ms = 0;
        assert!(config.validate().is_ok());

        config.catalog[1].id = ProductId(1);
        assert!(matches!(config.validate(), Err(ConfigError::Catalog(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STOREFRONT_STORE_NAME", "Night Market"),
            ("STOREFRONT_SUBMIT_DELAY_MS", "10"),
            ("STOREFRONT_DESTINATION", "/home"),
            ("STOREFRONT_CURRENCY_SYMBOL", "£"),
        ]);

        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.name, "Night Market");
        assert_eq!(config.registration.submit_delay_ms, 10);
        assert_eq!(config.registration.destination, "/home");
        assert_eq!(config.format_currency(100), "£1.00");
    }

    #[test]
    fn test_bad_numeric_override_is_ignored() {
        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| {
            (key == "STOREFRONT_SUBMIT_DELAY_MS").then(|| "soon".to_string())
        });
        assert_eq!(config.registration.submit_delay_ms, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("storefront-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[store]\nname = \"From File\"\n\n[registration]\ndestination = \"/welcome\"\n",
        )
        .unwrap();

        let config = StorefrontConfig::load_with(Some(path.clone()), |_| None).unwrap();
        assert_eq!(config.store.name, "From File");
        assert_eq!(config.registration.destination, "/welcome");
        assert_eq!(config.catalog.len(), 3);

        // Environment wins over the file.
        let config = StorefrontConfig::load_with(Some(path.clone()), |key| {
            (key == "STOREFRONT_STORE_NAME").then(|| "From Env".to_string())
        })
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.store.name, "From Env");
        assert_eq!(config.registration.destination, "/welcome");
    }

    #[test]
    fn test_load_or_default_on_parse_error() {
        let path = std::env::temp_dir().join(format!("storefront-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[store\nname = ").unwrap();

        assert!(matches!(
            StorefrontConfig::load_with(Some(path.clone()), |_| None),
            Err(ConfigError::Parse(_))
        ));
        let config = StorefrontConfig::load_or_default(Some(path.clone()));
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.catalog.len(), 3);
    }
}
