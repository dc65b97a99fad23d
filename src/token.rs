// Auth token generation for the upload API.
//
// A token is `{timestamp}.{signature}` where the signature is the hex
// HMAC-SHA256 of `{timestamp}:{api_key}` keyed by the API secret. The
// server decides how long a token stays valid, so a fresh one is built
// for every request.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Build a token for the current wall-clock second.
pub fn create_token(api_key: &str, api_secret: &str) -> String {
    create_token_at(api_key, api_secret, Utc::now().timestamp())
}

/// Build a token for an explicit Unix timestamp.
pub fn create_token_at(api_key: &str, api_secret: &str, timestamp: i64) -> String {
    let signature_data = format!("{}:{}", timestamp, api_key);
    format!("{}.{}", timestamp, sign(api_secret, &signature_data))
}

fn sign(secret: &str, data: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
