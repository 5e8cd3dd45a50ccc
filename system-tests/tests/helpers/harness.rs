// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Live Harness Helpers
// Description: Builds harness configuration and artifact roots for live suites.
// Purpose: Run every live test with a pinned seed against the live target.
// Dependencies: system-tests, blockdrag-cli, blockdrag-config
// ============================================================================

use std::io;
use std::path::Path;
use std::path::PathBuf;

use blockdrag_cli::AttemptArtifacts;
use blockdrag_cli::RunArtifacts;
use blockdrag_config::BlockdragConfig;
use system_tests::LiveTarget;

/// Fixed seed so live failures replay.
pub const LIVE_SEED: u64 = 20_240_611;
/// Iterations per live attempt.
pub const LIVE_ITERATIONS: usize = 12;
/// Directory that collects every live test's artifacts.
pub const LIVE_ARTIFACTS: &str = "target/system-tests";

/// Returns the artifact base for `test_name`.
pub fn test_root(test_name: &str) -> PathBuf {
    Path::new(LIVE_ARTIFACTS).join(test_name)
}

/// Creates a fresh `run_{millis}/attempt_1` directory for a test that drives
/// the pieces by hand rather than through the full harness.
pub fn manual_attempt(test_name: &str) -> io::Result<AttemptArtifacts> {
    RunArtifacts::create(&test_root(test_name))?.attempt(1)
}

/// Returns the harness configuration for `test_name`.
///
/// Store credentials come from the regular config file resolution
/// (`BLOCKDRAG_CONFIG` or `blockdrag.toml`); service locations from `target`.
pub fn live_config(target: &LiveTarget, test_name: &str) -> Result<BlockdragConfig, String> {
    let mut config = BlockdragConfig::load(None).map_err(|err| err.to_string())?;
    target.apply(&mut config);
    config.artifacts.dir = test_root(test_name);
    config.run.seed = Some(LIVE_SEED);
    config.run.iterations = LIVE_ITERATIONS;
    config.run.verify_every = 4;
    config.run.retries = Some(0);
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}
