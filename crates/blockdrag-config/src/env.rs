// crates/blockdrag-config/src/env.rs
// ============================================================================
// Module: blockdrag Environment Overrides
// Description: Environment-backed overrides for run settings.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed. `CI` is the exception: any
//! non-empty value other than `0` or `false` counts as a CI run, matching how
//! hosted runners set it.

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys read by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEnv {
    /// Config file path.
    ConfigPath,
    /// Fixed random seed.
    Seed,
    /// Iteration count override (positive integer).
    Iterations,
    /// Whole-attempt retry override.
    Retries,
    /// Continuous integration marker.
    Ci,
}

impl ConfigEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "BLOCKDRAG_CONFIG",
            Self::Seed => "BLOCKDRAG_SEED",
            Self::Iterations => "BLOCKDRAG_ITERATIONS",
            Self::Retries => "BLOCKDRAG_RETRIES",
            Self::Ci => "CI",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Overrides read from the environment or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    /// Fixed random seed.
    pub seed: Option<u64>,
    /// Iteration count.
    pub iterations: Option<usize>,
    /// Whole-attempt retries.
    pub retries: Option<u32>,
    /// Running under continuous integration.
    pub ci: bool,
}

impl EnvOverrides {
    /// Loads overrides from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is not valid UTF-8, is empty, or fails
    /// numeric parsing.
    pub fn load() -> Result<Self, String> {
        let seed = read_env_nonempty(ConfigEnv::Seed.as_str())?
            .map(|value| parse_number::<u64>(ConfigEnv::Seed.as_str(), &value))
            .transpose()?;
        let iterations = read_env_nonempty(ConfigEnv::Iterations.as_str())?
            .map(|value| parse_positive(ConfigEnv::Iterations.as_str(), &value))
            .transpose()?;
        let retries = read_env_nonempty(ConfigEnv::Retries.as_str())?
            .map(|value| parse_number::<u32>(ConfigEnv::Retries.as_str(), &value))
            .transpose()?;
        let ci = read_env_strict(ConfigEnv::Ci.as_str())?.is_some_and(|value| is_truthy(&value));
        Ok(Self {
            seed,
            iterations,
            retries,
            ci,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
pub(crate) fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses an unsigned integer.
fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, String> {
    raw.trim().parse().map_err(|_| format!("{name} must be a non-negative integer"))
}

/// Parses a positive integer.
fn parse_positive(name: &str, raw: &str) -> Result<usize, String> {
    let value: usize =
        raw.trim().parse().map_err(|_| format!("{name} must be a positive integer"))?;
    if value == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(value)
}

/// Returns whether a marker variable is switched on.
fn is_truthy(raw: &str) -> bool {
    let trimmed = raw.trim();
    !(trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("false"))
}
