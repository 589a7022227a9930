//! OAuth 1.0a request signing (HMAC-SHA1) for the social posting API.
//!
//! Only the `oauth_*` parameters plus any query/form parameters passed in
//! are signed. JSON request bodies are not part of the signature.

use crate::config::Credentials;
use crate::error::{AutoblogError, Result};
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";

#[derive(Clone)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OAuthCredentials(<redacted>)")
    }
}

impl OAuthCredentials {
    /// All four user-context values must be present.
    pub fn from_credentials(creds: &Credentials) -> Result<Self> {
        match (
            &creds.consumer_key,
            &creds.consumer_secret,
            &creds.access_token,
            &creds.access_token_secret,
        ) {
            (Some(ck), Some(cs), Some(at), Some(ats)) => Ok(Self {
                consumer_key: ck.clone(),
                consumer_secret: cs.clone(),
                access_token: at.clone(),
                access_token_secret: ats.clone(),
            }),
            _ => Err(AutoblogError::MissingSocialCredentials),
        }
    }
}

/// RFC 3986 percent-encoding (unreserved characters pass through).
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// `METHOD&enc(url)&enc(sorted, encoded params)`.
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let joined = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&joined)
    )
}

pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| AutoblogError::Config(format!("invalid signing key: {e}")))?;
    mac.update(base_string.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Build the `Authorization: OAuth ...` header value.
///
/// `extra_params` are query or form parameters that take part in the
/// signature but are not emitted in the header.
pub fn authorization_header(
    method: &str,
    url: &str,
    creds: &OAuthCredentials,
    extra_params: &[(String, String)],
    nonce: &str,
    timestamp: i64,
) -> Result<String> {
    let mut oauth_params: Vec<(String, String)> = vec![
        ("oauth_consumer_key".into(), creds.consumer_key.clone()),
        ("oauth_nonce".into(), nonce.to_string()),
        ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
        ("oauth_timestamp".into(), timestamp.to_string()),
        ("oauth_token".into(), creds.access_token.clone()),
        ("oauth_version".into(), VERSION.into()),
    ];

    let mut all = oauth_params.clone();
    all.extend_from_slice(extra_params);
    let base = signature_base_string(method, url, &all);
    let signature = sign(&base, &creds.consumer_secret, &creds.access_token_secret)?;
    oauth_params.push(("oauth_signature".into(), signature));
    oauth_params.sort();

    let fields = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("OAuth {fields}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
