//! Master-key request signing.
//!
//! Every request carries an `authorization` header derived from the account
//! primary key: HMAC-SHA256 over the verb, resource type, resource link and
//! the `x-ms-date` header value. Verb, resource type and date must be
//! lowercased in the signing payload; the resource link is used verbatim.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{CosmosError, CosmosResult};

type HmacSha256 = Hmac<Sha256>;

/// Decode the base64 account primary key into HMAC key bytes.
pub fn decode_key(primary_key: &str) -> CosmosResult<Vec<u8>> {
    BASE64
        .decode(primary_key)
        .map_err(|e| CosmosError::auth_error(format!("Invalid primary key: {}", e)))
}

/// Compute the `authorization` header value for one request.
///
/// `date` must equal the request's `x-ms-date` header (RFC 1123 GMT).
pub fn authorization(
    key: &[u8],
    verb: &str,
    resource_type: &str,
    resource_link: &str,
    date: &str,
) -> String {
    let payload = format!(
        "{}\n{}\n{}\n{}\n\n",
        verb.to_lowercase(),
        resource_type.to_lowercase(),
        resource_link,
        date.to_lowercase()
    );

    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());

    urlencoding::encode(&format!("type=master&ver=1.0&sig={}", signature)).into_owned()
}

/// Current UTC time in the RFC 1123 form the signature requires.
pub fn request_date(now: chrono::DateTime<chrono::Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
