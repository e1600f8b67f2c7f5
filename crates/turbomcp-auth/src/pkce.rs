//! PKCE (RFC 7636) verifier/challenge and CSRF state generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A generated PKCE verifier/challenge pair plus the CSRF `state` value
/// for one authorization attempt.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// Sent to the authorization endpoint; never leaves this process otherwise.
    pub code_verifier: String,
    /// `S256` hash of `code_verifier`, sent in the authorization URL.
    pub code_challenge: String,
    /// CSRF protection value echoed back by the callback.
    pub state: String,
}

impl PkceChallenge {
    /// Generate a fresh verifier/challenge/state triple using random bytes
    /// from the operating system's CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let code_verifier = random_base64url(32);
        let code_challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(code_verifier.as_bytes()));
        let state = random_base64url(16);

        Self {
            code_verifier,
            code_challenge,
            state,
        }
    }
}

fn random_base64url(num_bytes: usize) -> String {
    let mut bytes = vec![0u8; num_bytes];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_is_sha256_of_verifier() {
        let challenge = PkceChallenge::generate();
        let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(challenge.code_verifier.as_bytes()));
        assert_eq!(challenge.code_challenge, expected);
    }

    #[test]
    fn state_is_at_least_16_bytes_of_entropy() {
        let challenge = PkceChallenge::generate();
        let decoded = URL_SAFE_NO_PAD.decode(&challenge.state).unwrap();
        assert_eq!(decoded.len(), 16);
    }

    #[test]
    fn successive_generations_differ() {
        let a = PkceChallenge::generate();
        let b = PkceChallenge::generate();
        assert_ne!(a.code_verifier, b.code_verifier);
        assert_ne!(a.state, b.state);
    }
}
