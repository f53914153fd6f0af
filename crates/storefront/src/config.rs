//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `APPWRITE_URL` - Backend API endpoint (e.g., `https://cloud.appwrite.io/v1`)
//! - `APPWRITE_PROJECT_ID` - Backend project ID
//! - `APPWRITE_DATABASE_ID` - Database holding the storefront collections
//! - `APPWRITE_USER_COLLECTION_ID` - User profile collection
//! - `APPWRITE_PRODUCT_COLLECTION_ID` - Product collection
//! - `APPWRITE_ORDER_COLLECTION_ID` - Order collection
//! - `APPWRITE_REQUEST_COLLECTION_ID` - Custom request collection
//!
//! ## Optional
//! - `APPWRITE_API_KEY` - Server API key (CLI seeding and admin tooling only)
//! - `STOREFRONT_ADMIN_EMAILS` - Comma-separated emails always granted the admin role
//! - `STOREFRONT_TAX_RATE` - Sales tax rate applied to cart totals (default: 0.08)
//! - `STOREFRONT_CATALOG_CACHE_SECS` - Product cache TTL in seconds (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use layercraft_core::Email;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TAX_RATE: &str = "0.08";
const DEFAULT_CATALOG_CACHE_SECS: &str = "300";
const MIN_API_KEY_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend connection settings
    pub appwrite: AppwriteConfig,
    /// Accounts that always resolve to the admin role
    pub admin_emails: Vec<Email>,
    /// Sales tax rate applied to cart summaries (0.08 = 8%)
    pub tax_rate: Decimal,
    /// How long product listings stay cached
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AppwriteConfig {
    /// API endpoint, always ending in `/` so relative paths join onto it
    pub endpoint: Url,
    /// Project ID sent with every request
    pub project_id: String,
    /// Server API key; absent for end-user sessions
    pub api_key: Option<SecretString>,
    /// Database holding the storefront collections
    pub database_id: String,
    /// Collection IDs inside the database
    pub collections: CollectionIds,
}

/// Collection IDs used by the storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionIds {
    pub users: String,
    pub products: String,
    pub orders: String,
    pub requests: String,
}

impl std::fmt::Debug for AppwriteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("database_id", &self.database_id)
            .field("collections", &self.collections)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(&|key: &str| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_source(source: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(source);

        let appwrite = AppwriteConfig::from_env(&env)?;
        let admin_emails = parse_admin_emails(env.optional("STOREFRONT_ADMIN_EMAILS"))?;
        let tax_rate = env.parsed::<Decimal>("STOREFRONT_TAX_RATE", DEFAULT_TAX_RATE)?;
        if tax_rate.is_sign_negative() || tax_rate >= Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_TAX_RATE".to_string(),
                "must be between 0 and 1".to_string(),
            ));
        }
        let cache_secs =
            env.parsed::<u64>("STOREFRONT_CATALOG_CACHE_SECS", DEFAULT_CATALOG_CACHE_SECS)?;

        Ok(Self {
            appwrite,
            admin_emails,
            tax_rate,
            catalog_cache_ttl: Duration::from_secs(cache_secs),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Whether `email` is configured as a store admin.
    #[must_use]
    pub fn is_admin_email(&self, email: &Email) -> bool {
        self.admin_emails.iter().any(|admin| admin.eq_ignore_case(email))
    }
}

impl AppwriteConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let endpoint = parse_endpoint(&env.required("APPWRITE_URL")?)?;
        let api_key = match env.optional("APPWRITE_API_KEY") {
            Some(key) => {
                validate_api_key(&key, "APPWRITE_API_KEY")?;
                Some(SecretString::from(key))
            }
            None => None,
        };

        Ok(Self {
            endpoint,
            project_id: env.required("APPWRITE_PROJECT_ID")?,
            api_key,
            database_id: env.required("APPWRITE_DATABASE_ID")?,
            collections: CollectionIds {
                users: env.required("APPWRITE_USER_COLLECTION_ID")?,
                products: env.required("APPWRITE_PRODUCT_COLLECTION_ID")?,
                orders: env.required("APPWRITE_ORDER_COLLECTION_ID")?,
                requests: env.required("APPWRITE_REQUEST_COLLECTION_ID")?,
            },
        })
    }
}

#[cfg(test)]
impl AppwriteConfig {
    /// Settings pointing at `endpoint` with fixed test collection IDs.
    pub(crate) fn for_tests(endpoint: &str) -> Self {
        Self {
            endpoint: parse_endpoint(endpoint).unwrap_or_else(|e| panic!("{e}")),
            project_id: "layercraft".to_string(),
            api_key: None,
            database_id: "store".to_string(),
            collections: CollectionIds {
                users: "users".to_string(),
                products: "products".to_string(),
                orders: "orders".to_string(),
                requests: "requests".to_string(),
            },
        }
    }
}

#[cfg(test)]
impl StorefrontConfig {
    /// Defaults plus [`AppwriteConfig::for_tests`].
    pub(crate) fn for_tests(endpoint: &str) -> Self {
        Self {
            appwrite: AppwriteConfig::for_tests(endpoint),
            admin_emails: Vec::new(),
            tax_rate: crate::cart::DEFAULT_TAX_RATE,
            catalog_cache_ttl: Duration::from_secs(60),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Key lookup with the required/optional/default helpers.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required variable. Blank values count as missing.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Blank values count as missing.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Get a variable with a default, parsed into `T`.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .unwrap_or_else(|| default.to_string())
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Parse the API endpoint, normalising it to end with `/`.
fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("APPWRITE_URL".to_string(), msg);

    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Parse the comma-separated admin email list.
fn parse_admin_emails(raw: Option<String>) -> Result<Vec<Email>, ConfigError> {
    raw.map_or_else(
        || Ok(Vec::new()),
        |list| {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    Email::parse(s).map_err(|e| {
                        ConfigError::InvalidEnvVar(
                            "STOREFRONT_ADMIN_EMAILS".to_string(),
                            format!("{s}: {e}"),
                        )
                    })
                })
                .collect()
        },
    )
}

/// Validate that an API key is long enough, not a placeholder, and random-looking.
fn validate_api_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    if key.len() < MIN_API_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_API_KEY_LENGTH,
                key.len()
            ),
        ));
    }
    validate_secret_strength(key, var_name)
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
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key generated by the console."
            ),
        ));
    }

    Ok(())
}
