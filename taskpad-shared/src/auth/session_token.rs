/// Session token generation and cookie signing
///
/// A session token is 32 random alphanumeric characters. The cookie carries
/// `<token>.<signature>` where the signature is the hex HMAC-SHA256 of the
/// token under the deployment's session secret. The database only ever stores
/// the SHA-256 of the token, so a leaked `session` table cannot be replayed
/// as cookies.
///
/// # Example
///
/// ```
/// use taskpad_shared::auth::session_token::{generate_token, sign_token, verify_signed_token};
///
/// let secret = "a-deployment-secret-of-at-least-32-bytes";
/// let token = generate_token();
/// let cookie_value = sign_token(&token, secret);
///
/// assert_eq!(verify_signed_token(&cookie_value, secret), Some(token));
/// assert_eq!(verify_signed_token(&cookie_value, "some-other-secret"), None);
/// ```

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Length of the random token
pub const TOKEN_LENGTH: usize = 32;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a new random session token
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();

    (0..TOKEN_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Hashes a token for storage (SHA-256, lowercase hex)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn mac(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key of any size is valid")
}

/// Produces the cookie value for a token
pub fn sign_token(token: &str, secret: &str) -> String {
    let mut mac = mac(secret);
    mac.update(token.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    format!("{}.{}", token, signature)
}

/// Checks a cookie value and returns the token it carries
///
/// Returns `None` for malformed values and bad signatures. The signature
/// comparison is constant-time.
pub fn verify_signed_token(value: &str, secret: &str) -> Option<String> {
    let (token, signature) = value.split_once('.')?;

    if !validate_token_format(token) {
        return None;
    }

    let signature = hex::decode(signature).ok()?;

    let mut mac = mac(secret);
    mac.update(token.as_bytes());
    mac.verify_slice(&signature).ok()?;

    Some(token.to_string())
}

/// Checks token length and alphabet
pub fn validate_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.chars().all(|c| c.is_ascii_alphanumeric())
}
