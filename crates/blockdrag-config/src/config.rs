// crates/blockdrag-config/src/config.rs
// ============================================================================
// Module: blockdrag Configuration
// Description: Configuration loading and validation for the harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: blockdrag-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `BLOCKDRAG_CONFIG`, then
//! `./blockdrag.toml`; only a missing default file falls back to defaults.
//! Every section has defaults matching the reproduction: a local CMS on port
//! 3000, a local chromedriver, a slow 3G profile, and 100 drag iterations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use blockdrag_core::Credentials;
use blockdrag_core::DragPolicy;
use blockdrag_core::DragSettings;
use blockdrag_core::FixturePlan;
use blockdrag_core::NetworkProfile;
use blockdrag_core::RunSettings;
use blockdrag_core::RunTarget;
use blockdrag_core::kbps_to_bytes_per_sec;
use blockdrag_core::runtime::session::join_url;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::env::ConfigEnv;
use crate::env::EnvOverrides;
use crate::env::read_env_nonempty;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "blockdrag.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum drag iterations per attempt.
const MAX_ITERATIONS: usize = 100_000;
/// Maximum intermediate pointer moves per gesture.
const MAX_MOVE_STEPS: u32 = 1_000;
/// Maximum jitter and settle delays in milliseconds.
const MAX_DELAY_MS: u64 = 60_000;
/// Maximum drop offset in pixels.
const MAX_DROP_OFFSET_PX: f64 = 1_000.0;
/// Maximum overall attempt ceiling in seconds.
const MAX_RUN_TIMEOUT_SECS: u64 = 86_400;
/// Maximum whole-attempt retries.
const MAX_RETRIES: u32 = 10;
/// Minimum request timeout in milliseconds.
const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
const MAX_REQUEST_TIMEOUT_MS: u64 = 600_000;
/// Maximum viewport edge in pixels.
const MAX_VIEWPORT_EDGE: u32 = 10_000;
/// Maximum response body accepted from the document store.
const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Retries applied when running under CI and none are configured.
pub const CI_DEFAULT_RETRIES: u32 = 2;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockdragConfig {
    /// CMS location.
    #[serde(default)]
    pub target: TargetConfig,
    /// Document store access.
    #[serde(default)]
    pub store: StoreConfig,
    /// Browser driver.
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Network emulation.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Drag loop tunables.
    #[serde(default)]
    pub run: RunConfig,
    /// Fixture user.
    #[serde(default)]
    pub fixtures: FixturesConfig,
    /// Run artifacts.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

impl BlockdragConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides, then revalidates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an override is malformed or the result
    /// is invalid.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        let overrides = EnvOverrides::load().map_err(ConfigError::Invalid)?;
        self.apply_overrides(&overrides)
    }

    /// Applies explicit overrides, then revalidates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the result is invalid.
    pub fn apply_overrides(&mut self, overrides: &EnvOverrides) -> Result<(), ConfigError> {
        if let Some(seed) = overrides.seed {
            self.run.seed = Some(seed);
        }
        if let Some(iterations) = overrides.iterations {
            self.run.iterations = iterations;
        }
        if let Some(retries) = overrides.retries {
            self.run.retries = Some(retries);
        }
        if overrides.ci && self.run.retries.is_none() {
            self.run.retries = Some(CI_DEFAULT_RETRIES);
        }
        self.validate()
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target.validate()?;
        self.store.validate()?;
        self.browser.validate()?;
        self.network.validate()?;
        self.run.validate(self.fixture_plan().tracked_len())?;
        self.fixtures.validate()?;
        self.artifacts.validate()?;
        Ok(())
    }

    /// Returns the admin root URL.
    #[must_use]
    pub fn admin_url(&self) -> String {
        join_url(&self.target.base_url, &self.target.admin_path)
    }

    /// Returns the REST API root URL.
    #[must_use]
    pub fn api_url(&self) -> String {
        join_url(&self.target.base_url, &self.target.api_path)
    }

    /// Returns the credentials used to sign in to the admin UI.
    #[must_use]
    pub fn login_credentials(&self) -> Credentials {
        Credentials {
            email: self.fixtures.user_email.clone(),
            password: self.fixtures.user_password.clone(),
        }
    }

    /// Returns the fixture plan.
    #[must_use]
    pub fn fixture_plan(&self) -> FixturePlan {
        let user = self.fixtures.create_user.then(|| self.login_credentials());
        FixturePlan::reproduction(user)
    }

    /// Returns the admin location and credentials.
    #[must_use]
    pub fn run_target(&self) -> RunTarget {
        RunTarget {
            admin_url: self.admin_url(),
            credentials: self.login_credentials(),
        }
    }

    /// Returns the network profile, `None` when emulation is disabled.
    #[must_use]
    pub fn network_profile(&self) -> Option<NetworkProfile> {
        self.network.enabled.then(|| NetworkProfile {
            offline: false,
            download_throughput: kbps_to_bytes_per_sec(self.network.download_kbps),
            upload_throughput: kbps_to_bytes_per_sec(self.network.upload_kbps),
            latency_ms: self.network.latency_ms,
            connection_type: self.network.connection_type.clone(),
        })
    }

    /// Returns the whole-attempt retry count.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.run.retries.unwrap_or(0)
    }

    /// Builds runtime settings from the configuration.
    #[must_use]
    pub fn run_settings(&self) -> RunSettings {
        let run = &self.run;
        RunSettings {
            iterations: run.iterations,
            verify_every: run.verify_every,
            jitter_max: Duration::from_millis(run.jitter_max_ms),
            settle: Duration::from_millis(run.settle_ms),
            expand_settle: Duration::from_millis(run.expand_settle_ms),
            drag: DragSettings {
                drop_offset_px: run.drop_offset_px,
                move_steps: run.move_steps,
            },
            policy: DragPolicy {
                source: run.source_index,
                candidates: run.target_candidates.clone(),
            },
            network: self.network_profile(),
            seed: run.seed,
            timeout: Duration::from_secs(run.timeout_secs),
            wait_timeout: Duration::from_millis(self.browser.wait_timeout_ms),
            retries: self.retries(),
        }
    }
}

// ============================================================================
// SECTION: Target
// ============================================================================

/// CMS location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Base URL of the CMS.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// REST API path below the base URL.
    #[serde(default = "default_api_path")]
    pub api_path: String,
    /// Admin UI path below the base URL.
    #[serde(default = "default_admin_path")]
    pub admin_path: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_path: default_api_path(),
            admin_path: default_admin_path(),
        }
    }
}

impl TargetConfig {
    /// Validates the CMS location.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("target.base_url", &self.base_url)?;
        validate_url_path("target.api_path", &self.api_path)?;
        validate_url_path("target.admin_path", &self.admin_path)
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// How the document store client authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreAuthMode {
    /// No credentials.
    #[default]
    None,
    /// Static API key header.
    ApiKey,
    /// Login once and send the session token.
    Login,
}

/// Document store access.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Authentication mode.
    #[serde(default)]
    pub auth: StoreAuthMode,
    /// API key for `api_key` mode.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Collection the API key belongs to.
    #[serde(default = "default_api_key_collection")]
    pub api_key_collection: String,
    /// Login email for `login` mode.
    #[serde(default)]
    pub email: Option<String>,
    /// Login password for `login` mode.
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,
    /// Largest response body accepted.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("auth", &self.auth)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_collection", &self.api_key_collection)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            auth: StoreAuthMode::None,
            api_key: None,
            api_key_collection: default_api_key_collection(),
            email: None,
            password: None,
            timeout_ms: default_request_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl StoreConfig {
    /// Validates store access settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.auth {
            StoreAuthMode::None => {}
            StoreAuthMode::ApiKey => {
                require_nonempty("store.api_key", self.api_key.as_deref())?;
                require_nonempty("store.api_key_collection", Some(&self.api_key_collection))?;
            }
            StoreAuthMode::Login => {
                require_nonempty("store.email", self.email.as_deref())?;
                require_nonempty("store.password", self.password.as_deref())?;
            }
        }
        validate_timeout_ms("store.timeout_ms", self.timeout_ms)?;
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "store.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Browser
// ============================================================================

/// Browser driver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Run the browser without a window.
    #[serde(default = "default_true")]
    pub headless: bool,
    /// Viewport width in pixels.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    /// Viewport height in pixels.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    /// WebDriver request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,
    /// Ceiling for individual page waits in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub wait_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            timeout_ms: default_request_timeout_ms(),
            wait_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl BrowserConfig {
    /// Validates browser settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("browser.webdriver_url", &self.webdriver_url)?;
        for (field, value) in
            [("browser.viewport_width", self.viewport_width), ("browser.viewport_height", self.viewport_height)]
        {
            if value == 0 || value > MAX_VIEWPORT_EDGE {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be between 1 and {MAX_VIEWPORT_EDGE}"
                )));
            }
        }
        validate_timeout_ms("browser.timeout_ms", self.timeout_ms)?;
        validate_timeout_ms("browser.wait_timeout_ms", self.wait_timeout_ms)
    }
}

// ============================================================================
// SECTION: Network
// ============================================================================

/// Network emulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Apply the profile.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Download throughput in kbit/s.
    #[serde(default = "default_download_kbps")]
    pub download_kbps: u64,
    /// Upload throughput in kbit/s.
    #[serde(default = "default_upload_kbps")]
    pub upload_kbps: u64,
    /// Added latency in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Reported connection type.
    #[serde(default = "default_connection_type")]
    pub connection_type: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            download_kbps: default_download_kbps(),
            upload_kbps: default_upload_kbps(),
            latency_ms: default_latency_ms(),
            connection_type: default_connection_type(),
        }
    }
}

impl NetworkConfig {
    /// Validates network settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.download_kbps == 0 || self.upload_kbps == 0 {
            return Err(ConfigError::Invalid(
                "network throughput must be greater than zero".to_string(),
            ));
        }
        if self.latency_ms > MAX_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "network.latency_ms must be at most {MAX_DELAY_MS}"
            )));
        }
        require_nonempty("network.connection_type", Some(&self.connection_type))
    }
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// Drag loop tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Drag iterations per attempt.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Verification cadence.
    #[serde(default = "default_verify_every")]
    pub verify_every: usize,
    /// Upper bound of the random pause after each gesture.
    #[serde(default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,
    /// Pause before verification.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Pause after expanding rows.
    #[serde(default = "default_expand_settle_ms")]
    pub expand_settle_ms: u64,
    /// Distance from the target row's top edge to the release point.
    #[serde(default = "default_drop_offset_px")]
    pub drop_offset_px: f64,
    /// Intermediate pointer moves per gesture.
    #[serde(default = "default_move_steps")]
    pub move_steps: u32,
    /// Position of the dragged row.
    #[serde(default = "default_source_index")]
    pub source_index: usize,
    /// Candidate drop positions.
    #[serde(default = "default_target_candidates")]
    pub target_candidates: Vec<usize>,
    /// Fixed random seed.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Overall attempt ceiling in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Whole-attempt retries; unset means 0, or 2 under CI.
    #[serde(default)]
    pub retries: Option<u32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            verify_every: default_verify_every(),
            jitter_max_ms: default_jitter_max_ms(),
            settle_ms: default_settle_ms(),
            expand_settle_ms: default_expand_settle_ms(),
            drop_offset_px: default_drop_offset_px(),
            move_steps: default_move_steps(),
            source_index: default_source_index(),
            target_candidates: default_target_candidates(),
            seed: None,
            timeout_secs: default_timeout_secs(),
            retries: None,
        }
    }
}

impl RunConfig {
    /// Validates loop tunables against the number of tracked blocks.
    fn validate(&self, tracked: usize) -> Result<(), ConfigError> {
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(ConfigError::Invalid(format!(
                "run.iterations must be between 1 and {MAX_ITERATIONS}"
            )));
        }
        if self.verify_every == 0 {
            return Err(ConfigError::Invalid("run.verify_every must be greater than zero".to_string()));
        }
        for (field, value) in [
            ("run.jitter_max_ms", self.jitter_max_ms),
            ("run.settle_ms", self.settle_ms),
            ("run.expand_settle_ms", self.expand_settle_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(ConfigError::Invalid(format!("{field} must be at most {MAX_DELAY_MS}")));
            }
        }
        if !self.drop_offset_px.is_finite()
            || self.drop_offset_px <= 0.0
            || self.drop_offset_px > MAX_DROP_OFFSET_PX
        {
            return Err(ConfigError::Invalid(format!(
                "run.drop_offset_px must be positive and at most {MAX_DROP_OFFSET_PX}"
            )));
        }
        if self.move_steps == 0 || self.move_steps > MAX_MOVE_STEPS {
            return Err(ConfigError::Invalid(format!(
                "run.move_steps must be between 1 and {MAX_MOVE_STEPS}"
            )));
        }
        if self.target_candidates.is_empty() {
            return Err(ConfigError::Invalid("run.target_candidates must be non-empty".to_string()));
        }
        if self.source_index >= tracked {
            return Err(ConfigError::Invalid(format!(
                "run.source_index must be below the {tracked} tracked blocks"
            )));
        }
        if let Some(candidate) = self.target_candidates.iter().find(|index| **index >= tracked) {
            return Err(ConfigError::Invalid(format!(
                "run.target_candidates entry {candidate} must be below the {tracked} tracked blocks"
            )));
        }
        if self.timeout_secs == 0 || self.timeout_secs > MAX_RUN_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "run.timeout_secs must be between 1 and {MAX_RUN_TIMEOUT_SECS}"
            )));
        }
        if self.retries.is_some_and(|retries| retries > MAX_RETRIES) {
            return Err(ConfigError::Invalid(format!("run.retries must be at most {MAX_RETRIES}")));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Fixture user settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixturesConfig {
    /// Create the admin user before the run and delete it after.
    #[serde(default = "default_true")]
    pub create_user: bool,
    /// Admin login email.
    #[serde(default = "default_user_email")]
    pub user_email: String,
    /// Admin login password.
    #[serde(default = "default_user_password")]
    pub user_password: String,
}

impl std::fmt::Debug for FixturesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixturesConfig")
            .field("create_user", &self.create_user)
            .field("user_email", &self.user_email)
            .field("user_password", &"<redacted>")
            .finish()
    }
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            create_user: true,
            user_email: default_user_email(),
            user_password: default_user_password(),
        }
    }
}

impl FixturesConfig {
    /// Validates fixture settings.
    fn validate(&self) -> Result<(), ConfigError> {
        require_nonempty("fixtures.user_email", Some(&self.user_email))?;
        if !self.user_email.contains('@') {
            return Err(ConfigError::Invalid("fixtures.user_email must be an email".to_string()));
        }
        require_nonempty("fixtures.user_password", Some(&self.user_password))
    }
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Run artifact settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Root directory for run artifacts.
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
        }
    }
}

impl ArtifactsConfig {
    /// Validates the artifact root.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("artifacts.dir", &self.dir.to_string_lossy())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default CMS base URL.
fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

/// Default REST API path.
fn default_api_path() -> String {
    "/api".to_string()
}

/// Default admin path.
fn default_admin_path() -> String {
    "/admin".to_string()
}

/// Default API key collection.
fn default_api_key_collection() -> String {
    "users".to_string()
}

/// Default request timeout.
const fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Default response size limit.
const fn default_max_response_bytes() -> usize {
    1024 * 1024
}

/// Default WebDriver endpoint.
fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

/// Helper for boolean fields defaulting to true.
const fn default_true() -> bool {
    true
}

/// Default viewport width.
const fn default_viewport_width() -> u32 {
    1270
}

/// Default viewport height.
const fn default_viewport_height() -> u32 {
    960
}

/// Default download throughput.
const fn default_download_kbps() -> u64 {
    750
}

/// Default upload throughput.
const fn default_upload_kbps() -> u64 {
    250
}

/// Default added latency.
const fn default_latency_ms() -> u64 {
    100
}

/// Default connection type.
fn default_connection_type() -> String {
    "cellular3g".to_string()
}

/// Default iteration count.
const fn default_iterations() -> usize {
    blockdrag_core::runtime::runner::DEFAULT_ITERATIONS
}

/// Default verification cadence.
const fn default_verify_every() -> usize {
    blockdrag_core::runtime::runner::DEFAULT_VERIFY_EVERY
}

/// Default jitter bound.
const fn default_jitter_max_ms() -> u64 {
    500
}

/// Default settle delay.
const fn default_settle_ms() -> u64 {
    2_000
}

/// Default expand settle delay.
const fn default_expand_settle_ms() -> u64 {
    500
}

/// Default drop offset.
const fn default_drop_offset_px() -> f64 {
    blockdrag_core::runtime::drag::DEFAULT_DROP_OFFSET_PX
}

/// Default pointer steps.
const fn default_move_steps() -> u32 {
    blockdrag_core::runtime::drag::DEFAULT_MOVE_STEPS
}

/// Default dragged row.
const fn default_source_index() -> usize {
    1
}

/// Default drop candidates.
fn default_target_candidates() -> Vec<usize> {
    vec![0, 2]
}

/// Default attempt ceiling.
const fn default_timeout_secs() -> u64 {
    600
}

/// Default admin login email.
fn default_user_email() -> String {
    "user@example.com".to_string()
}

/// Default admin login password.
fn default_user_password() -> String {
    "securePassword123".to_string()
}

/// Default artifact root.
fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("target/blockdrag")
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
///
/// Returns the path and whether it was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    let env_path =
        read_env_nonempty(ConfigEnv::ConfigPath.as_str()).map_err(ConfigError::Invalid)?;
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Requires an http or https URL with a host.
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{field} must use http:// or https://")));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::Invalid(format!("{field} must include a host")));
    }
    Ok(())
}

/// Requires an absolute URL path without query or fragment.
fn validate_url_path(field: &str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::Invalid(format!("{field} must start with '/'")));
    }
    if value.contains(['?', '#', ' ']) {
        return Err(ConfigError::Invalid(format!("{field} must be a plain path")));
    }
    Ok(())
}

/// Requires a request timeout within bounds.
fn validate_timeout_ms(field: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_REQUEST_TIMEOUT_MS ..= MAX_REQUEST_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {MIN_REQUEST_TIMEOUT_MS} and {MAX_REQUEST_TIMEOUT_MS}"
        )));
    }
    Ok(())
}

/// Requires a present, non-blank value.
fn require_nonempty(field: &str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Invalid(format!("{field} must be set"))),
    }
}
