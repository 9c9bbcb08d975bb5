//! # geotrim
//!
//! Batch geocoding of `id,address` files with progressive right-truncation.
//!
//! Addresses typed by people often carry trailing detail (apartment numbers,
//! notes, misplaced postal codes) that makes an exact lookup return nothing.
//! geotrim queries the full address first and then drops trailing
//! comma-separated segments one at a time until the geocoding service finds
//! a match. A `ZERO_RESULTS` answer moves on to the next shorter candidate;
//! any other non-OK status (quota, denied key, invalid request) stops for
//! that record so quota is not burned on requests that cannot succeed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geotrim::{Geotrim, GeotrimConfig};
//!
//! # async fn run() -> geotrim::Result<()> {
//! let config = GeotrimConfig::builder()
//!     .input_path("addresses.csv")
//!     .output_path("addresses_geocoded.csv")
//!     .build();
//!
//! let summary = Geotrim::with_config(config)?.run().await?;
//! println!("resolved {} of {}", summary.resolved, summary.records);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod batch;
pub mod credentials;
pub mod error;
pub mod geocoder;
pub mod parser;
pub mod resolver;
pub mod types;

// Re-export main API
pub use batch::{BatchConfig, BatchDriver, BatchSummary};
pub use credentials::ApiKey;
pub use error::{Error, Result};
pub use geocoder::{Geocoder, GeocoderConfig, GoogleGeocoder};
pub use parser::{InputRecord, OutputRecord};
pub use resolver::{AddressResolver, Resolution, ResolutionOutcome};
pub use types::*;

use std::path::PathBuf;

/// Main entry point wiring credentials, the HTTP geocoder and the batch driver.
#[derive(Debug)]
pub struct Geotrim {
    config: GeotrimConfig,
    driver: BatchDriver<GoogleGeocoder>,
}

impl Geotrim {
    /// Initialize with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] when no API key can be found.
    pub fn new() -> Result<Self> {
        Self::with_config(GeotrimConfig::default())
    }

    /// Initialize with custom configuration.
    ///
    /// The API key is loaded here, so a missing credential fails before any
    /// file is touched.
    pub fn with_config(config: GeotrimConfig) -> Result<Self> {
        let api_key = credentials::load_api_key(&config.api_key_env, &config.api_key_file)?;
        Self::with_api_key(config, api_key)
    }

    /// Initialize with an explicit API key.
    pub fn with_api_key(config: GeotrimConfig, api_key: ApiKey) -> Result<Self> {
        let geocoder = GoogleGeocoder::new(&config.geocoder, api_key)?;
        let driver = BatchDriver::new(geocoder, config.batch.clone());
        Ok(Self { config, driver })
    }

    /// Geocode the configured input file into the configured output file.
    pub async fn run(&self) -> Result<BatchSummary> {
        self.driver
            .run_files(&self.config.input_path, &self.config.output_path)
            .await
    }

    /// Get the configuration used by this instance.
    pub fn config(&self) -> &GeotrimConfig {
        &self.config
    }
}

/// Configuration for a geotrim run.
#[derive(Debug, Clone)]
pub struct GeotrimConfig {
    /// Input file with `id,address` lines
    pub input_path: PathBuf,

    /// Output file, overwritten on every run
    pub output_path: PathBuf,

    /// Environment variable checked first for the API key
    pub api_key_env: String,

    /// File read when the environment variable is unset or blank
    pub api_key_file: PathBuf,

    /// HTTP geocoder settings
    pub geocoder: GeocoderConfig,

    /// Batch pacing settings
    pub batch: BatchConfig,
}

impl Default for GeotrimConfig {
    fn default() -> Self {
        GeotrimConfigBuilder::new().build()
    }
}

impl GeotrimConfig {
    /// Create a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use geotrim::GeotrimConfig;
    ///
    /// let config = GeotrimConfig::builder()
    ///     .request_delay(Duration::from_millis(500))
    ///     .accept_invalid_certs(false)
    ///     .build();
    /// assert_eq!(config.batch.request_delay, Duration::from_millis(500));
    /// ```
    pub fn builder() -> GeotrimConfigBuilder {
        GeotrimConfigBuilder::new()
    }
}

/// Builder for GeotrimConfig.
#[derive(Debug, Clone)]
pub struct GeotrimConfigBuilder {
    config: GeotrimConfig,
}

impl GeotrimConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: GeotrimConfig {
                input_path: PathBuf::from("addresses.csv"),
                output_path: PathBuf::from("addresses_geocoded.csv"),
                api_key_env: credentials::DEFAULT_KEY_ENV.to_string(),
                api_key_file: PathBuf::from(credentials::DEFAULT_KEY_FILE),
                geocoder: GeocoderConfig::default(),
                batch: BatchConfig::default(),
            },
        }
    }

    /// Set the input file.
    pub fn input_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.input_path = path.into();
        self
    }

    /// Set the output file.
    pub fn output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.output_path = path.into();
        self
    }

    /// Set the environment variable holding the API key.
    pub fn api_key_env(mut self, name: impl Into<String>) -> Self {
        self.config.api_key_env = name.into();
        self
    }

    /// Set the fallback API key file.
    pub fn api_key_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.api_key_file = path.into();
        self
    }

    /// Set the geocoding endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.geocoder.base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.geocoder.timeout = timeout;
        self
    }

    /// Set whether invalid TLS certificates are accepted.
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.config.geocoder.accept_invalid_certs = enabled;
        self
    }

    /// Set the pause between geocoded records.
    pub fn request_delay(mut self, delay: std::time::Duration) -> Self {
        self.config.batch.request_delay = delay;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeotrimConfig {
        self.config
    }
}

impl Default for GeotrimConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::time::Duration;

    #[test]
    fn test_config_defaults() {
        let config = GeotrimConfig::default();
        assert_eq!(config.input_path, PathBuf::from("addresses.csv"));
        assert_eq!(config.output_path, PathBuf::from("addresses_geocoded.csv"));
        assert_eq!(config.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(config.batch.request_delay, Duration::from_millis(200));
        assert_eq!(config.geocoder.timeout, Duration::from_secs(10));
        assert_eq!(config.geocoder.base_url, geocoder::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_credential_is_fatal_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeotrimConfig::builder()
            .api_key_env("GEOTRIM_TEST_NEVER_SET")
            .api_key_file(dir.path().join("google_api_key.txt"))
            .input_path(dir.path().join("in.csv"))
            .output_path(dir.path().join("out.csv"))
            .build();

        let err = Geotrim::with_config(config).unwrap_err();
        assert_matches!(err, Error::MissingCredential { .. });
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn test_key_file_used_when_env_unset() {
        let dir = tempfile::tempdir().unwrap();
        let key_file = dir.path().join("google_api_key.txt");
        std::fs::write(&key_file, "file-key\n").unwrap();

        let config = GeotrimConfig::builder()
            .api_key_env("GEOTRIM_TEST_NEVER_SET")
            .api_key_file(&key_file)
            .build();

        let geotrim = Geotrim::with_config(config).unwrap();
        assert_eq!(geotrim.config().api_key_file, key_file);
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeotrimConfig::builder()
            .input_path(dir.path().join("absent.csv"))
            .output_path(dir.path().join("out.csv"))
            .request_delay(Duration::ZERO)
            .build();

        let geotrim = Geotrim::with_api_key(config, ApiKey::new("k").unwrap()).unwrap();
        let err = geotrim.run().await.unwrap_err();

        assert!(err.is_fatal());
        assert!(!dir.path().join("out.csv").exists());
    }
}
