//! One-shot notifications carried across the redirect in a signed cookie.
//!
//! The payload is JSON, base64url-encoded, with an HMAC-SHA256 tag keyed by a
//! secret generated at process start. A restarted server drops in-flight
//! messages, which is harmless for display-only state.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "taskboard_flash";

pub const CLEAR_COOKIE: &str = "taskboard_flash=; Path=/; HttpOnly; Max-Age=0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
    Info,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: Level::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: Level::Info, message: message.into() }
    }
}

pub struct FlashSigner {
    key: [u8; 32],
}

impl FlashSigner {
    pub fn new() -> Self {
        let mut key = [0u8; 32];
        rand::rng().fill_bytes(&mut key);
        Self { key }
    }

    #[cfg(test)]
    fn with_key(key: [u8; 32]) -> Self {
        Self { key }
    }

    fn tag(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC takes any key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    pub fn encode(&self, flash: &Flash) -> String {
        let payload = serde_json::to_vec(flash).expect("flash serializes to JSON");
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(self.tag(&payload))
        )
    }

    /// Returns `None` for anything that was not produced by this process:
    /// malformed tokens, bad signatures, stale keys.
    pub fn decode(&self, token: &str) -> Option<Flash> {
        let (payload_b64, tag_b64) = token.split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let tag = URL_SAFE_NO_PAD.decode(tag_b64).ok()?;
        let expected = self.tag(&payload);
        if !bool::from(expected.as_slice().ct_eq(tag.as_slice())) {
            return None;
        }
        serde_json::from_slice(&payload).ok()
    }
}

impl Default for FlashSigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Set-Cookie value carrying a signed flash token.
pub fn set_cookie(token: &str) -> String {
    format!("{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Pull the flash token out of a Cookie request header, if present.
pub fn from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == COOKIE_NAME).then_some(value)
    })
}
