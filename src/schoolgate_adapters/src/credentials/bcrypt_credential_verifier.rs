use schoolgate_core::{CredentialError, CredentialVerifier, Password, PasswordHash};
use secrecy::{ExposeSecret, Secret};

/// Work factor of every hash this verifier produces.
pub const BCRYPT_COST: u32 = 10;

/// bcrypt password hashing. Hashing and verification run on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptCredentialVerifier {
    cost: u32,
}

impl BcryptCredentialVerifier {
    pub fn new() -> Self {
        Self { cost: BCRYPT_COST }
    }

    /// Lower cost for tests only; stored hashes still verify regardless of cost.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptCredentialVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for BcryptCredentialVerifier {
    #[tracing::instrument(name = "Verify password hash", skip_all)]
    async fn verify(
        &self,
        candidate: &Password,
        stored: &PasswordHash,
    ) -> Result<bool, CredentialError> {
        let candidate = candidate.clone();
        let stored = stored.clone();
        let current_span: tracing::Span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                match bcrypt::verify(
                    candidate.as_ref().expose_secret(),
                    stored.as_ref().expose_secret(),
                ) {
                    Ok(matches) => matches,
                    Err(e) => {
                        tracing::warn!(error = %e, "Stored password hash is unreadable");
                        false
                    }
                }
            })
        })
        .await
        .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialError> {
        let password = password.clone();
        let cost = self.cost;
        let current_span: tracing::Span = tracing::Span::current();

        let result = tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                bcrypt::hash(password.as_ref().expose_secret(), cost)
                    .map(|h| PasswordHash::new(Secret::new(h)))
                    .map_err(|e| CredentialError::Hashing(e.to_string()))
            })
        })
        .await
        .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password(raw: &str) -> Password {
        Password::try_from(Secret::new(raw.to_owned())).unwrap()
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let verifier = BcryptCredentialVerifier::with_cost(4);
        let hash = verifier.hash(&password("correct horse")).await.unwrap();

        let right = password("correct horse");
        let wrong = password("wrong horse");
        assert!(verifier.verify(&right, &hash).await.unwrap());
        assert!(!verifier.verify(&wrong, &hash).await.unwrap());
    }

    #[tokio::test]
    async fn default_cost_is_ten() {
        let hash = BcryptCredentialVerifier::new()
            .hash(&password("password123"))
            .await
            .unwrap();
        assert!(hash.as_ref().expose_secret().starts_with("$2b$10$"));
    }

    #[tokio::test]
    async fn malformed_hash_never_verifies() {
        let verifier = BcryptCredentialVerifier::new();
        let broken = PasswordHash::new(Secret::new("not-a-bcrypt-hash".to_owned()));
        let candidate = password("anything");
        assert!(!verifier.verify(&candidate, &broken).await.unwrap());
    }

    #[tokio::test]
    async fn hash_never_contains_the_plaintext() {
        let hash = BcryptCredentialVerifier::with_cost(4)
            .hash(&password("plaintext-secret"))
            .await
            .unwrap();
        assert!(!hash.as_ref().expose_secret().contains("plaintext-secret"));
    }
}
