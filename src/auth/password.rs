use crate::error::AuthError;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const FRAGMENT_LEN: usize = 10;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Constant-time verification against a stored bcrypt hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, stored_hash)?)
}

/// Replacement password for the forgot-password flow: two independent random
/// base-36 fragments, ~20 characters. Returned to the caller exactly once and
/// never persisted or logged in plaintext.
pub fn generate_reset_password() -> String {
    format!("{}{}", base36_fragment(), base36_fragment())
}

fn base36_fragment() -> String {
    let mut rng = rand::rng();
    (0..FRAGMENT_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("grimberg").unwrap();
        assert!(verify_password("grimberg", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn reset_password_is_base36_and_long_enough() {
        let pw = generate_reset_password();
        assert_eq!(pw.len(), 2 * FRAGMENT_LEN);
        assert!(pw.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn reset_passwords_are_independent() {
        assert_ne!(generate_reset_password(), generate_reset_password());
    }
}
