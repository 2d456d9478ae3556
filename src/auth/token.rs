use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::SecurityConfig;

/// The only algorithm this service signs with or accepts.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Distinguishes access tokens from refresh tokens. The two are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Signed token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: i64,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl Claims {
    fn new(subject: i64, token_type: TokenType, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: subject,
            token_type,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

/// Access/refresh pair handed back by login, registration and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Token issuance failures. Always a server-side fault.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Reasons a presented token is rejected, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("token is empty or not a parseable JWT")]
    Malformed,

    #[error("token declares an unexpected signing algorithm")]
    AlgorithmMismatch,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token claims are incomplete or of the wrong type")]
    WrongType,
}

/// Issues and verifies signed tokens with one immutable secret.
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            security.jwt_secret.as_bytes(),
            Duration::seconds(security.access_token_ttl_secs),
            Duration::seconds(security.refresh_token_ttl_secs),
        )
    }

    /// Mint a fresh access/refresh pair for `subject`.
    pub fn issue(&self, subject: i64) -> Result<TokenPair, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    pub(crate) fn issue_at(&self, subject: i64, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        let access = Claims::new(subject, TokenType::Access, now, self.access_ttl);
        let refresh = Claims::new(subject, TokenType::Refresh, now, self.refresh_ttl);

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            token_type: "Bearer",
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        let encoding_key = EncodingKey::from_secret(&self.secret);
        encode(&Header::new(SIGNING_ALGORITHM), claims, &encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Validate `token` and return its subject if it is a live token of `expected` type.
    ///
    /// Checks run in a fixed order and stop at the first failure: structure, declared
    /// algorithm, signature, expiry, then claim shape and type. Claims are decoded into a
    /// loose JSON value first so an expired token reports `Expired` even when its payload
    /// would not deserialize.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<i64, VerificationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(VerificationError::Malformed);
        }

        let header = decode_header(token).map_err(|_| unparsed_header_error(token))?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(VerificationError::AlgorithmMismatch);
        }

        if self.secret.is_empty() {
            return Err(VerificationError::BadSignature);
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let decoding_key = DecodingKey::from_secret(&self.secret);
        let data = decode::<Value>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidAlgorithm => VerificationError::AlgorithmMismatch,
            ErrorKind::InvalidSignature => VerificationError::BadSignature,
            ErrorKind::ExpiredSignature => VerificationError::Expired,
            ErrorKind::MissingRequiredClaim(_) => VerificationError::WrongType,
            _ => VerificationError::Malformed,
        })?;

        let claims: Claims = serde_json::from_value(data.claims).map_err(|_| VerificationError::WrongType)?;
        if claims.token_type != expected {
            return Err(VerificationError::WrongType);
        }

        Ok(claims.sub)
    }
}

/// `decode_header` only knows the algorithms jsonwebtoken supports, so a header naming
/// anything else (`none` included) fails to parse. Read the raw `alg` to tell those apart
/// from tokens that are not JWTs at all.
fn unparsed_header_error(token: &str) -> VerificationError {
    let declared_alg = token
        .split('.')
        .next()
        .and_then(|segment| URL_SAFE_NO_PAD.decode(segment).ok())
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
        .and_then(|header| header.get("alg").and_then(Value::as_str).map(str::to_owned));

    match declared_alg {
        Some(alg) if alg != "HS256" => VerificationError::AlgorithmMismatch,
        _ => VerificationError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, Duration::hours(1), Duration::days(7))
    }

    fn sign_raw(secret: &str, alg: Algorithm, payload: &Value) -> String {
        encode(&Header::new(alg), payload, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn issued_access_token_round_trips_subject() {
        let tokens = service("secret");
        let pair = tokens.issue(42).unwrap();
        assert_eq!(tokens.verify(&pair.access_token, TokenType::Access), Ok(42));
        assert_eq!(tokens.verify(&pair.refresh_token, TokenType::Refresh), Ok(42));
        assert_eq!(pair.expires_in, 3600);
    }

    #[test]
    fn access_and_refresh_tokens_are_not_interchangeable() {
        let tokens = service("secret");
        let pair = tokens.issue(7).unwrap();
        assert_eq!(
            tokens.verify(&pair.access_token, TokenType::Refresh),
            Err(VerificationError::WrongType)
        );
        assert_eq!(
            tokens.verify(&pair.refresh_token, TokenType::Access),
            Err(VerificationError::WrongType)
        );
    }

    #[test]
    fn refresh_outlives_access() {
        let tokens = service("secret");
        let now = Utc::now();
        let access = Claims::new(1, TokenType::Access, now, tokens.access_ttl);
        let refresh = Claims::new(1, TokenType::Refresh, now, tokens.refresh_ttl);
        assert_eq!(access.iat, refresh.iat);
        assert!(access.exp < refresh.exp);
    }

    #[test]
    fn access_token_expires_after_its_lifetime() {
        let tokens = service("secret");
        let two_hours_ago = Utc::now() - Duration::hours(2);
        let pair = tokens.issue_at(9, two_hours_ago).unwrap();

        assert_eq!(
            tokens.verify(&pair.access_token, TokenType::Access),
            Err(VerificationError::Expired)
        );
        // the refresh token from the same issuance is still live
        assert_eq!(tokens.verify(&pair.refresh_token, TokenType::Refresh), Ok(9));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let ours = service("ours");
        let theirs = service("theirs");
        let forged = theirs.issue(1).unwrap();
        assert_eq!(
            ours.verify(&forged.access_token, TokenType::Access),
            Err(VerificationError::BadSignature)
        );
    }

    #[test]
    fn empty_and_garbage_tokens_are_malformed() {
        let tokens = service("secret");
        assert_eq!(tokens.verify("", TokenType::Access), Err(VerificationError::Malformed));
        assert_eq!(tokens.verify("   ", TokenType::Access), Err(VerificationError::Malformed));
        assert_eq!(tokens.verify("not-a-jwt", TokenType::Access), Err(VerificationError::Malformed));
    }

    #[test]
    fn other_algorithms_are_rejected_before_signature_check() {
        let tokens = service("secret");
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = sign_raw(
            "secret",
            Algorithm::HS384,
            &json!({ "sub": 1, "type": "access", "iat": 0, "exp": exp }),
        );
        assert_eq!(
            tokens.verify(&token, TokenType::Access),
            Err(VerificationError::AlgorithmMismatch)
        );
    }

    #[test]
    fn unsigned_alg_none_tokens_are_algorithm_mismatches() {
        let tokens = service("secret");
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            json!({ "sub": 1, "type": "access", "iat": 0, "exp": exp }).to_string(),
        );
        let token = format!("{}.{}.", header, payload);

        assert_eq!(
            tokens.verify(&token, TokenType::Access),
            Err(VerificationError::AlgorithmMismatch)
        );
    }

    #[test]
    fn unreadable_header_is_malformed() {
        let tokens = service("secret");
        let token = format!("{}.e30.", URL_SAFE_NO_PAD.encode(b"not json"));
        assert_eq!(tokens.verify(&token, TokenType::Access), Err(VerificationError::Malformed));
    }

    #[test]
    fn expiry_is_checked_before_claim_shape() {
        let tokens = service("secret");
        let exp = (Utc::now() - Duration::minutes(5)).timestamp();
        let token = sign_raw("secret", SIGNING_ALGORITHM, &json!({ "exp": exp }));
        assert_eq!(tokens.verify(&token, TokenType::Access), Err(VerificationError::Expired));
    }

    #[test]
    fn missing_claims_are_wrong_type() {
        let tokens = service("secret");
        let exp = (Utc::now() + Duration::hours(1)).timestamp();

        let no_type = sign_raw("secret", SIGNING_ALGORITHM, &json!({ "sub": 1, "iat": 0, "exp": exp }));
        assert_eq!(tokens.verify(&no_type, TokenType::Access), Err(VerificationError::WrongType));

        let no_subject = sign_raw("secret", SIGNING_ALGORITHM, &json!({ "type": "access", "iat": 0, "exp": exp }));
        assert_eq!(tokens.verify(&no_subject, TokenType::Access), Err(VerificationError::WrongType));

        let no_exp = sign_raw("secret", SIGNING_ALGORITHM, &json!({ "sub": 1, "type": "access", "iat": 0 }));
        assert_eq!(tokens.verify(&no_exp, TokenType::Access), Err(VerificationError::WrongType));
    }

    #[test]
    fn signing_without_secret_is_a_configuration_fault() {
        let tokens = TokenService::new(Vec::new(), Duration::hours(1), Duration::days(7));
        assert!(matches!(tokens.issue(1), Err(AuthError::InvalidSecret)));
    }

    #[test]
    fn claims_serialize_type_field() {
        let claims = Claims::new(5, TokenType::Refresh, Utc::now(), Duration::days(7));
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["type"], "refresh");
        assert_eq!(value["sub"], 5);
    }
}
