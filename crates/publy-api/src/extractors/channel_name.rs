//! Channel name and request-kind parsing.

use axum::http::{HeaderMap, Method, header};
use percent_encoding::percent_decode_str;

use publy_core::config::ChannelNamePolicy;
use publy_core::error::AppError;

/// Extracts the channel name from a request path.
///
/// The path is percent-decoded, then leading and trailing slashes are
/// stripped; the remainder must satisfy `policy`.
pub fn parse_channel_name(path: &str, policy: &ChannelNamePolicy) -> Result<String, AppError> {
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| AppError::validation("Channel name must be valid UTF-8"))?;
    let name = decoded.trim_matches('/');

    if name.len() < policy.min_length {
        return Err(AppError::validation(format!(
            "Channel name must be at least {} chars",
            policy.min_length
        )));
    }

    if !policy.allow_slash && name.contains('/') {
        return Err(AppError::validation("Channel name cannot contain /"));
    }

    Ok(name.to_string())
}

/// A subscribe request is a `GET` carrying both `Upgrade` and `Connection`.
pub fn is_websocket_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::GET
        && headers.contains_key(header::UPGRADE)
        && headers.contains_key(header::CONNECTION)
}
