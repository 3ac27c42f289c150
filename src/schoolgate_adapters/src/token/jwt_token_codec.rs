use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};
use schoolgate_core::{
    Account, IssuedToken, TokenClaims, TokenCodec, TokenId, TokenIssueError, TokenRejection,
    VerifyMode,
};
use secrecy::{ExposeSecret, Secret};

pub const MIN_SIGNER_KEY_BYTES: usize = 32;

/// Signing configuration for [`JwtTokenCodec`]. Durations are in seconds.
#[derive(Clone)]
pub struct JwtConfig {
    pub signer_key: Secret<String>,
    pub issuer: String,
    pub valid_duration_secs: i64,
    pub refreshable_duration_secs: i64,
}

impl JwtConfig {
    pub fn as_bytes(&self) -> &[u8] {
        self.signer_key.expose_secret().as_bytes()
    }
}

struct CodecInner {
    issuer: String,
    valid_secs: i64,
    refreshable_secs: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

/// HS512 JWT codec with a single symmetric key.
///
/// Expiry is never checked by the JWT library: the effective expiry depends on the
/// [`VerifyMode`] and is compared against the caller's `now`.
#[derive(Clone)]
pub struct JwtTokenCodec {
    inner: Arc<CodecInner>,
}

impl JwtTokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        if config.as_bytes().len() < MIN_SIGNER_KEY_BYTES {
            tracing::warn!(
                key_bytes = config.as_bytes().len(),
                "JWT signer key is shorter than {MIN_SIGNER_KEY_BYTES} bytes"
            );
        }

        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            inner: Arc::new(CodecInner {
                issuer: config.issuer.clone(),
                valid_secs: config.valid_duration_secs,
                refreshable_secs: config.refreshable_duration_secs,
                encoding_key: EncodingKey::from_secret(config.as_bytes()),
                decoding_key: DecodingKey::from_secret(config.as_bytes()),
                validation,
            }),
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn mint(&self, account: &Account, now: DateTime<Utc>) -> Result<IssuedToken, TokenIssueError> {
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.inner.valid_secs)
            .ok_or(TokenIssueError::TimestampOutOfRange)?;
        let expires_at =
            DateTime::from_timestamp(exp, 0).ok_or(TokenIssueError::TimestampOutOfRange)?;

        let claims = TokenClaims {
            sub: account.id().to_string(),
            iss: self.inner.issuer.clone(),
            iat,
            exp,
            jti: TokenId::generate(),
            scope: account.scope(),
            email: account.email().as_ref().expose_secret().clone(),
            email_verified: account.email_verified(),
            google_id: account.external_id().map(|id| id.as_str().to_owned()),
        };

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &self.inner.encoding_key,
        )
        .map_err(|e| TokenIssueError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token: Secret::new(token),
            token_id: claims.jti,
            expires_at,
        })
    }

    fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
        mode: VerifyMode,
    ) -> Result<TokenClaims, TokenRejection> {
        let claims = decode::<TokenClaims>(token, &self.inner.decoding_key, &self.inner.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))?;

        let effective_expiry = match mode {
            VerifyMode::Access => claims.exp,
            VerifyMode::Refresh => claims.iat.saturating_add(self.inner.refreshable_secs),
        };
        if now.timestamp() >= effective_expiry {
            return Err(TokenRejection::Expired);
        }

        Ok(claims)
    }

    fn refreshable_secs(&self) -> i64 {
        self.inner.refreshable_secs
    }
}

fn classify(kind: &JwtErrorKind) -> TokenRejection {
    match kind {
        JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
            TokenRejection::BadSignature
        }
        _ => TokenRejection::Malformed,
    }
}
