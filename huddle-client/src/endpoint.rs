//! Hub endpoint derivation

use huddle_core::WS_PATH;
use url::Url;

use crate::error::ClientError;

/// Derive the hub's WebSocket URL from the origin the client was served from
///
/// Secure origins map to `wss`, plain ones to `ws`. Any path, query or
/// fragment on the origin is replaced by the hub's well-known path.
pub fn endpoint_from_origin(origin: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidOrigin {
        origin: origin.to_string(),
        reason,
    };

    let mut url = Url::parse(origin.trim()).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    };
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    url.set_scheme(scheme)
        .map_err(|()| invalid(format!("cannot switch to {scheme}")))?;
    url.set_path(WS_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
