// crates/blockdrag-core/src/runtime/session.rs
// ============================================================================
// Module: Session Helpers
// Description: Login, navigation, and network conditions for a run.
// Purpose: Bring a fresh browsing session to the document edit view.
// Dependencies: crate::{core, interfaces}, tokio, tracing
// ============================================================================

//! ## Overview
//! Login fills the password before the email, mirroring how the admin form
//! is driven in the reproduction, then waits for the dashboard URL and the
//! dashboard marker. Any failure on that path is a session fault.

use std::time::Duration;

use tracing::info;

use crate::core::AdminUi;
use crate::core::Collection;
use crate::core::Credentials;
use crate::core::DocId;
use crate::core::NetworkProfile;
use crate::interfaces::BrowserSession;
use crate::runtime::error::HarnessError;

/// Joins a base URL and a path without doubling slashes.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Applies `profile` to the session; `None` leaves the network untouched.
///
/// # Errors
///
/// Returns [`HarnessError::Browser`] when the browser rejects the profile.
pub async fn apply_network_profile<B>(
    session: &B,
    profile: Option<&NetworkProfile>,
) -> Result<(), HarnessError>
where
    B: BrowserSession + ?Sized,
{
    let Some(profile) = profile else {
        info!("network emulation disabled");
        return Ok(());
    };
    session.emulate_network(profile).await?;
    info!(
        download = profile.download_throughput,
        upload = profile.upload_throughput,
        latency_ms = profile.latency_ms,
        connection = %profile.connection_type,
        "network emulation applied"
    );
    Ok(())
}

/// Signs in through the admin login form.
///
/// # Errors
///
/// Returns [`HarnessError::Session`] when the form cannot be driven or the
/// dashboard does not appear within `timeout`.
pub async fn login<B>(
    session: &B,
    ui: &AdminUi,
    admin_url: &str,
    credentials: &Credentials,
    timeout: Duration,
) -> Result<(), HarnessError>
where
    B: BrowserSession + ?Sized,
{
    let fault = |step: &str, err: &dyn std::fmt::Display| {
        HarnessError::Session(format!("login {step} failed: {err}"))
    };
    let login_url = join_url(admin_url, "login");
    session.goto(&login_url).await.map_err(|err| fault("navigation", &err))?;
    session
        .wait_for_selector(&ui.login_email(), timeout)
        .await
        .map_err(|err| fault("form", &err))?;
    session.click(&ui.login_email()).await.map_err(|err| fault("form", &err))?;
    session
        .fill(&ui.login_password(), &credentials.password)
        .await
        .map_err(|err| fault("form", &err))?;
    session
        .fill(&ui.login_email(), &credentials.email)
        .await
        .map_err(|err| fault("form", &err))?;
    session.click(&ui.login_submit()).await.map_err(|err| fault("submit", &err))?;
    session.wait_for_url(admin_url, timeout).await.map_err(|err| fault("redirect", &err))?;
    session
        .wait_for_selector(&ui.dashboard_marker(), timeout)
        .await
        .map_err(|err| fault("dashboard check", &err))?;
    info!(email = %credentials.email, "signed in to admin");
    Ok(())
}

/// Opens the edit view of a parent document and waits for its blocks field.
///
/// # Errors
///
/// Returns [`HarnessError::Browser`] when navigation fails or the field does
/// not render within `timeout`.
pub async fn open_document<B>(
    session: &B,
    ui: &AdminUi,
    admin_url: &str,
    id: &DocId,
    timeout: Duration,
) -> Result<(), HarnessError>
where
    B: BrowserSession + ?Sized,
{
    let url = join_url(admin_url, &format!("collections/{}/{id}", Collection::Fruits.slug()));
    session.goto(&url).await?;
    session.wait_for_selector(&ui.field_container(), timeout).await?;
    info!(%url, "opened document");
    Ok(())
}

/// Expands every collapsed row and waits for the layout to settle.
///
/// # Errors
///
/// Returns [`HarnessError::Geometry`] when the expand control is missing.
pub async fn expand_all<B>(session: &B, ui: &AdminUi, settle: Duration) -> Result<(), HarnessError>
where
    B: BrowserSession + ?Sized,
{
    let button = ui.expand_all();
    if !session.is_visible(&button).await? {
        return Err(HarnessError::Geometry {
            selector: button,
            context: "not rendered while expanding rows".to_string(),
        });
    }
    session.click(&button).await?;
    tokio::time::sleep(settle).await;
    Ok(())
}
