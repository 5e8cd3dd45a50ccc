// system-tests/src/live.rs
// ============================================================================
// Module: Live Target
// Description: CMS and WebDriver locations for live suites.
// Purpose: Point harness configuration at the services under test.
// Dependencies: blockdrag-config
// ============================================================================

//! ## Overview
//! Live suites start from the regular harness configuration and then swap
//! in the CMS root, the WebDriver endpoint, and the window mode named by
//! `BLOCKDRAG_LIVE_*` variables. Unset variables keep the configured values.
//! Set but malformed values fail the suite before any service is touched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use blockdrag_config::BlockdragConfig;
use blockdrag_config::read_env_strict;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// CMS root URL, for example `http://localhost:3000`.
pub const CMS_URL_VAR: &str = "BLOCKDRAG_LIVE_CMS_URL";
/// WebDriver endpoint.
pub const WEBDRIVER_URL_VAR: &str = "BLOCKDRAG_LIVE_WEBDRIVER_URL";
/// Shows the browser window when set to `1`, `true`, or `yes`.
pub const HEADED_VAR: &str = "BLOCKDRAG_LIVE_HEADED";
/// Seconds to wait for both services to answer.
pub const READY_SECS_VAR: &str = "BLOCKDRAG_LIVE_READY_SECS";

/// Wait applied when [`READY_SECS_VAR`] is unset.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SECTION: Live Target
// ============================================================================

/// Services a live suite runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveTarget {
    /// CMS root replacing `target.base_url`.
    pub cms_url: Option<String>,
    /// Endpoint replacing `browser.webdriver_url`.
    pub webdriver_url: Option<String>,
    /// Run the browser with a window.
    pub headed: bool,
    /// How long readiness checks poll before giving up.
    pub ready_timeout: Duration,
}

impl Default for LiveTarget {
    fn default() -> Self {
        Self {
            cms_url: None,
            webdriver_url: None,
            headed: false,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }
}

impl LiveTarget {
    /// Reads the target from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that is malformed.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(read_env_strict)
    }

    /// Reads the target through `lookup`, which returns a variable's value.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let read = |name: &str| -> Result<Option<String>, String> {
            match lookup(name)? {
                Some(value) if value.trim().is_empty() => Err(format!("{name} is set but empty")),
                Some(value) => Ok(Some(value.trim().to_string())),
                None => Ok(None),
            }
        };
        let headed = read(HEADED_VAR)?.map(|value| parse_switch(HEADED_VAR, &value)).transpose()?;
        let ready_timeout = read(READY_SECS_VAR)?
            .map(|value| parse_seconds(READY_SECS_VAR, &value))
            .transpose()?;
        Ok(Self {
            cms_url: read(CMS_URL_VAR)?,
            webdriver_url: read(WEBDRIVER_URL_VAR)?,
            headed: headed.unwrap_or(false),
            ready_timeout: ready_timeout.unwrap_or(DEFAULT_READY_TIMEOUT),
        })
    }

    /// Points `config` at this target.
    pub fn apply(&self, config: &mut BlockdragConfig) {
        if let Some(url) = &self.cms_url {
            config.target.base_url.clone_from(url);
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url.clone_from(url);
        }
        config.browser.headless = !self.headed;
    }

    /// Returns the WebDriver status endpoint for `config`.
    #[must_use]
    pub fn webdriver_status_url(config: &BlockdragConfig) -> String {
        format!("{}/status", config.browser.webdriver_url.trim_end_matches('/'))
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses an on/off switch.
fn parse_switch(name: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(format!("{name} must be one of 1, 0, true, false, yes, no; got \"{value}\"")),
    }
}

/// Parses a whole, non-zero number of seconds.
fn parse_seconds(name: &str, value: &str) -> Result<Duration, String> {
    match value.parse::<u64>() {
        Ok(0) | Err(_) => Err(format!("{name} must be a whole number of seconds above zero")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}
