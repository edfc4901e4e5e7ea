//! Captive landing → secure purchase entry redirect.
//!
//! Captive-portal interception only sees plaintext traffic, so the landing
//! page is served over `http`. Continuing from it is an unconditional address
//! rewrite: same host, `https` scheme, purchase entry path. The rewrite is a
//! pure function; the HTTP shell turns its output into a full navigation.

use crate::error::GatewayError;
use axum::http::{HeaderMap, Uri, header};
use serde::{Deserialize, Serialize};
use url::Url;

/// Header set by TLS-terminating proxies with the original scheme
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Header set by proxies with the original `Host`
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Where the captive landing sends visitors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Path of the purchase flow entry on the secure origin
    pub purchase_entry_path: String,
    /// Port of the secure origin, when it is not the visitor's current port
    pub secure_port: Option<u16>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            purchase_entry_path: "/buy-ticket".to_string(),
            secure_port: None,
        }
    }
}

/// Compute the secure purchase entry address for `current`
///
/// The scheme becomes `https` and the path becomes the configured entry path.
/// Host and query are kept; the fragment is dropped. An address that is
/// already `https` only has its path changed.
///
/// # Errors
///
/// - [`GatewayError::MissingHost`] if `current` has no host
/// - [`GatewayError::SchemeChange`] if the scheme cannot become `https`
pub fn secure_entry_url(current: &Url, config: &GatewayConfig) -> Result<Url, GatewayError> {
    if current.host_str().is_none() {
        return Err(GatewayError::MissingHost(current.to_string()));
    }

    let mut target = current.clone();

    if target.scheme() != "https" && target.set_scheme("https").is_err() {
        return Err(GatewayError::SchemeChange(current.to_string()));
    }

    target.set_path(&config.purchase_entry_path);
    target.set_fragment(None);
    if target.query() == Some("") {
        target.set_query(None);
    }

    if let Some(port) = config.secure_port {
        target
            .set_port(Some(port))
            .map_err(|()| GatewayError::InvalidAddress(current.to_string()))?;
    }

    Ok(target)
}

/// Reconstruct the address the visitor requested
///
/// Honors `X-Forwarded-Proto` and `X-Forwarded-Host` from a fronting proxy,
/// then falls back to `Host` and the request URI. Without any forwarded
/// scheme the request is taken to be plain `http`.
///
/// # Errors
///
/// - [`GatewayError::MissingHost`] if no host can be determined
/// - [`GatewayError::InvalidAddress`] if the pieces do not form a URL
pub fn current_address(headers: &HeaderMap, uri: &Uri) -> Result<Url, GatewayError> {
    let scheme = first_value(headers, FORWARDED_PROTO)
        .or_else(|| uri.scheme_str().map(str::to_string))
        .unwrap_or_else(|| "http".to_string());

    let host = first_value(headers, FORWARDED_HOST)
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .or_else(|| uri.authority().map(|authority| authority.as_str().to_string()))
        .ok_or_else(|| GatewayError::MissingHost(uri.to_string()))?;

    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let address = format!("{scheme}://{host}{path_and_query}");

    Url::parse(&address).map_err(|e| GatewayError::InvalidAddress(format!("{address}: {e}")))
}

/// First comma-separated entry of a proxy header
fn first_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_upgrades_scheme_and_path_in_one_step() {
        let target = secure_entry_url(&url("http://host/captive"), &GatewayConfig::default());
        assert_eq!(target.unwrap().as_str(), "https://host/buy-ticket");
    }

    #[test]
    fn test_keeps_query_and_drops_fragment() {
        let target = secure_entry_url(
            &url("http://portal.campus.cd/captive?type=weekly-5000#top"),
            &GatewayConfig::default(),
        )
        .unwrap();

        assert_eq!(
            target.as_str(),
            "https://portal.campus.cd/buy-ticket?type=weekly-5000"
        );
    }

    #[test]
    fn test_empty_query_is_dropped() {
        let target =
            secure_entry_url(&url("http://host/captive/continue?"), &GatewayConfig::default())
                .unwrap();
        assert_eq!(target.as_str(), "https://host/buy-ticket");
    }

    #[test]
    fn test_secure_address_only_changes_path() {
        let target =
            secure_entry_url(&url("https://host/captive"), &GatewayConfig::default()).unwrap();
        assert_eq!(target.as_str(), "https://host/buy-ticket");
    }

    #[test]
    fn test_configured_entry_path_and_port() {
        let config = GatewayConfig {
            purchase_entry_path: "/login".to_string(),
            secure_port: Some(8443),
        };

        let target = secure_entry_url(&url("http://10.0.0.1:8080/captive"), &config).unwrap();

        assert_eq!(target.as_str(), "https://10.0.0.1:8443/login");
    }

    #[test]
    fn test_default_https_port_is_elided() {
        let config = GatewayConfig {
            secure_port: Some(443),
            ..GatewayConfig::default()
        };

        let target = secure_entry_url(&url("http://host/captive"), &config).unwrap();

        assert_eq!(target.as_str(), "https://host/buy-ticket");
    }

    #[test]
    fn test_rejects_scheme_that_cannot_be_upgraded() {
        let result = secure_entry_url(&url("file:///captive"), &GatewayConfig::default());
        assert!(matches!(result, Err(GatewayError::MissingHost(_))));

        let result = secure_entry_url(&url("foo://host/captive"), &GatewayConfig::default());
        assert!(matches!(result, Err(GatewayError::SchemeChange(_))));
    }

    #[test]
    fn test_current_address_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("hotspot.local"));
        let uri: Uri = "/captive?lang=fr".parse().unwrap();

        let address = current_address(&headers, &uri).unwrap();

        assert_eq!(address.as_str(), "http://hotspot.local/captive?lang=fr");
    }

    #[test]
    fn test_current_address_prefers_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("127.0.0.1:3000"));
        headers.insert(FORWARDED_PROTO, HeaderValue::from_static("https, http"));
        headers.insert(FORWARDED_HOST, HeaderValue::from_static("portal.example.cd"));
        let uri: Uri = "/captive".parse().unwrap();

        let address = current_address(&headers, &uri).unwrap();

        assert_eq!(address.as_str(), "https://portal.example.cd/captive");
    }

    #[test]
    fn test_current_address_without_host() {
        let uri: Uri = "/captive".parse().unwrap();
        assert!(matches!(
            current_address(&HeaderMap::new(), &uri),
            Err(GatewayError::MissingHost(_))
        ));
    }
}
