//! Telegram WebApp `initData` verification.
//!
//! The mini-app sends back the signed query string Telegram hands it. The
//! signature is HMAC-SHA256 over the key-sorted parameters (minus `hash`),
//! with a secret key derived from the bot token. Only after the signature
//! checks out is the embedded identity claim trusted.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("initData is missing the hash parameter")]
    MissingHash,
    #[error("initData signature mismatch")]
    BadSignature,
    #[error("initData is missing the user parameter")]
    MissingUser,
    #[error("malformed user payload: {0}")]
    MalformedUser(String),
}

/// The authenticated WebApp user, from the `user` parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebAppUser {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Verify `init_data` against the bot token and extract the user.
pub fn verify_init_data(init_data: &str, bot_token: &str) -> Result<WebAppUser, AuthError> {
    let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(init_data.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let hash = pairs
        .iter()
        .find(|(k, _)| k == "hash")
        .map(|(_, v)| v.clone())
        .ok_or(AuthError::MissingHash)?;

    pairs.retain(|(k, _)| k != "hash");
    pairs.sort();

    let data_check_string = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n");

    // A hash that isn't well-formed hex can't match any signature.
    let claimed = decode_hex(&hash).ok_or(AuthError::BadSignature)?;

    let mut mac = HmacSha256::new_from_slice(&secret_key(bot_token))
        .map_err(|_| AuthError::BadSignature)?;
    mac.update(data_check_string.as_bytes());
    mac.verify_slice(&claimed)
        .map_err(|_| AuthError::BadSignature)?;

    let user_json = pairs
        .iter()
        .find(|(k, _)| k == "user")
        .map(|(_, v)| v.as_str())
        .ok_or(AuthError::MissingUser)?;

    serde_json::from_str(user_json).map_err(|e| AuthError::MalformedUser(e.to_string()))
}

/// Signing key per the WebApp scheme:
/// secret = HMAC-SHA256(key = "WebAppData", msg = bot token).
fn secret_key(bot_token: &str) -> Vec<u8> {
    let mut secret = HmacSha256::new_from_slice(b"WebAppData").expect("hmac accepts any key size");
    secret.update(bot_token.as_bytes());
    secret.finalize().into_bytes().to_vec()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if !s.is_ascii() || s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "12345:TEST_TOKEN";

    fn sign(data_check_string: &str, bot_token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&secret_key(bot_token)).unwrap();
        mac.update(data_check_string.as_bytes());
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    fn signed_init_data() -> String {
        let user = r#"{"id":99,"first_name":"Ada","username":"ada"}"#;
        let auth_date = "1700000000";
        // Data-check string uses decoded values, key-sorted.
        let dcs = format!("auth_date={}\nuser={}", auth_date, user);
        let hash = sign(&dcs, TOKEN);

        let mut out = url::form_urlencoded::Serializer::new(String::new());
        out.append_pair("user", user);
        out.append_pair("auth_date", auth_date);
        out.append_pair("hash", &hash);
        out.finish()
    }

    #[test]
    fn test_valid_signature_yields_user() {
        let user = verify_init_data(&signed_init_data(), TOKEN).unwrap();
        assert_eq!(user.id, 99);
        assert_eq!(user.username.as_deref(), Some("ada"));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let data = signed_init_data().replace("Ada", "Eve");
        assert_eq!(
            verify_init_data(&data, TOKEN),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_wrong_token_is_rejected() {
        assert_eq!(
            verify_init_data(&signed_init_data(), "999:OTHER"),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        // Not hex at all, odd length, and multibyte input must all read as
        // a bad signature rather than panic or slip through comparison.
        for bad in ["zz", "abc", "caf\u{e9}", ""] {
            let mut out = url::form_urlencoded::Serializer::new(String::new());
            out.append_pair("auth_date", "1700000000");
            out.append_pair("hash", bad);
            assert_eq!(
                verify_init_data(&out.finish(), TOKEN),
                Err(AuthError::BadSignature),
                "hash {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_missing_hash() {
        assert_eq!(
            verify_init_data("user=%7B%22id%22%3A1%7D", TOKEN),
            Err(AuthError::MissingHash)
        );
    }
}
