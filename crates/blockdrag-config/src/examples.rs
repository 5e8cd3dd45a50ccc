// crates/blockdrag-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration for blockdrag.
// Dependencies: none
// ============================================================================

//! Example configuration printed by `blockdrag config example`.

/// Returns a complete example config with every section spelled out.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[target]
base_url = "http://localhost:3000"
api_path = "/api"
admin_path = "/admin"

[store]
# none | api_key | login
auth = "none"
api_key_collection = "users"
timeout_ms = 30000
max_response_bytes = 1048576

[browser]
webdriver_url = "http://localhost:9515"
headless = true
viewport_width = 1270
viewport_height = 960
timeout_ms = 30000
wait_timeout_ms = 30000

[network]
enabled = true
download_kbps = 750
upload_kbps = 250
latency_ms = 100
connection_type = "cellular3g"

[run]
iterations = 100
verify_every = 10
jitter_max_ms = 500
settle_ms = 2000
expand_settle_ms = 500
drop_offset_px = 20.0
move_steps = 2
source_index = 1
target_candidates = [0, 2]
timeout_secs = 600
# seed = 42
# retries = 0

[fixtures]
create_user = true
user_email = "user@example.com"
user_password = "securePassword123"

[artifacts]
dir = "target/blockdrag"
"#,
    )
}
