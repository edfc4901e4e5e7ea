//! Captive landing page.
//!
//! - GET {captive} - Plain-HTTP landing page with a continue button
//! - GET {captive}/continue - 303 to the secure purchase entry
//!
//! The landing page must stay reachable over plain HTTP: captive-portal
//! detection only intercepts unencrypted traffic.

use super::error::AppError;
use super::state::{AppState, sub_path};
use crate::config::segments;
use crate::gateway::{current_address, secure_entry_url};
use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{Html, Redirect},
};

/// Render the landing page
pub async fn landing(State(state): State<AppState>) -> Html<String> {
    let continue_path = sub_path(&state.routes.captive_path, segments::CONTINUE);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Wi-Fi access</title>
</head>
<body>
  <main>
    <h1>Welcome</h1>
    <p>Buy a ticket to get connected to the Wi-Fi network.</p>
    <form method="get" action="{continue_path}">
      <button type="submit">Continue</button>
    </form>
  </main>
</body>
</html>
"#
    ))
}

/// Send the visitor to the secure purchase entry in one navigation
///
/// # Errors
///
/// Returns 400 if the visitor's address cannot be reconstructed.
pub async fn continue_to_purchase(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Redirect, AppError> {
    let current = current_address(&headers, &uri)?;
    let target = secure_entry_url(&current, &state.gateway)?;

    tracing::info!(from = %current, to = %target, "Redirecting to secure purchase entry");
    metrics::counter!("portal.captive.redirects").increment(1);

    Ok(Redirect::to(target.as_str()))
}
