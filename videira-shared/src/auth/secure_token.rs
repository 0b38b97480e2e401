/// Single-use token generation and hashing
///
/// Used for password resets and email confirmation. Tokens follow the
/// format `vid_` followed by 32 random alphanumeric characters. Only the
/// SHA-256 hash of a token is stored; the plaintext is shown to the
/// caller once and never persisted.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Token prefix for identification
const TOKEN_PREFIX: &str = "vid_";

/// Length of the random portion of the token
const TOKEN_RANDOM_LENGTH: usize = 32;

/// Character set for token generation (alphanumeric)
const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a new single-use token
///
/// Returns a tuple of (plaintext_token, token_hash). The plaintext is
/// delivered to the user; only the hash is stored.
pub fn generate_token() -> (String, String) {
    let mut rng = rand::thread_rng();

    let random_part: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_CHARSET.len());
            TOKEN_CHARSET[idx] as char
        })
        .collect();

    let token = format!("{}{}", TOKEN_PREFIX, random_part);
    let hash = hash_token(&token);

    (token, hash)
}

/// Hashes a token using SHA-256
///
/// Returns the hash as a lowercase hex string (64 characters).
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validates token format without checking the database
///
/// Checks prefix, length, and that the random portion is alphanumeric.
pub fn validate_token_format(token: &str) -> bool {
    if !token.starts_with(TOKEN_PREFIX) {
        return false;
    }

    let random_part = &token[TOKEN_PREFIX.len()..];

    random_part.len() == TOKEN_RANDOM_LENGTH
        && random_part.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_format() {
        let (token, hash) = generate_token();

        assert!(token.starts_with("vid_"));
        assert_eq!(token.len(), TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH);
        assert_eq!(hash.len(), 64);
        assert!(validate_token_format(&token));
    }

    #[test]
    fn test_generate_unique_tokens() {
        let (token1, hash1) = generate_token();
        let (token2, hash2) = generate_token();

        assert_ne!(token1, token2);
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let token = "vid_abcdefghijklmnopqrstuvwxyz123456";

        let hash1 = hash_token(token);
        let hash2 = hash_token(token);

        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_matches_generated() {
        let (token, hash) = generate_token();

        assert_eq!(hash_token(&token), hash);
    }

    #[test]
    fn test_validate_format_rejects_bad_tokens() {
        assert!(!validate_token_format(""));
        assert!(!validate_token_format("vid_"));
        assert!(!validate_token_format("vid_short"));
        assert!(!validate_token_format("api_abcdefghijklmnopqrstuvwxyz123456"));
        assert!(!validate_token_format("vid_abcdefghijklmnopqrstuvwxyz12345!"));
    }

    #[test]
    fn test_validate_format_accepts_valid_token() {
        assert!(validate_token_format("vid_ABCDEFghijkl012345MNOPQRstuvwx67"));
    }
}
