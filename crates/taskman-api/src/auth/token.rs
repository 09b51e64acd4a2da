//! Token issuing and verification
//!
//! Tokens are HS256-signed JWTs carrying the user's e-mail as subject and
//! the user's role as a single-element authority list. Keys are derived
//! once from the configured secret and shared read-only for the lifetime
//! of the process.

use super::principal::Principal;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};
use taskman_core::{AuthConfig, Role, User};
use thiserror::Error;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
const SIGNING_ALGORITHM_NAME: &str = "HS256";

/// JWT claims carried by every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user e-mail
    pub sub: String,
    /// Granted authorities, e.g. `["ROLE_USER"]`
    pub authorities: Vec<String>,
    /// Issued at (Unix epoch seconds)
    pub iat: u64,
    /// Expiration (Unix epoch seconds)
    pub exp: u64,
}

/// Token failures reported to the client as 401
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token algorithm is not supported")]
    Unsupported,

    #[error("Token is malformed")]
    Malformed,

    #[error("Failed to encode JWT: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Issues, verifies and decodes session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_secs)
    }

    /// Token lifetime in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a token for a user, valid for the configured TTL from now
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = get_current_timestamp();
        let claims = Claims {
            sub: user.email.clone(),
            authorities: vec![user.role.authority().to_string()],
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims with the process secret
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(encode(
            &Header::new(SIGNING_ALGORITHM),
            claims,
            &self.encoding_key,
        )?)
    }

    /// Verify signature and expiry
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - token is valid
    /// * `Ok(false)` - signature mismatch or another unrecognized failure
    /// * `Err(TokenError::Expired | Unsupported | Malformed)` - failures the
    ///   boundary reports with their reason
    pub fn verify(&self, token: &str) -> Result<bool, TokenError> {
        if header_algorithm(token)? != SIGNING_ALGORITHM_NAME {
            return Err(TokenError::Unsupported);
        }

        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(_) => Ok(true),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::MissingAlgorithm => Err(TokenError::Unsupported),
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::MissingRequiredClaim(_) => Err(TokenError::Malformed),
                _ => {
                    tracing::debug!(error = %e, "Token rejected");
                    Ok(false)
                }
            },
        }
    }

    /// Decode claims without checking signature or expiry
    ///
    /// Callers must have verified the token first.
    pub fn claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Malformed)
    }

    /// Build the request principal from decoded claims
    ///
    /// The first recognized authority decides the role; claims without one
    /// are malformed.
    pub fn principal_from(&self, claims: Claims) -> Result<Principal, TokenError> {
        let role = claims
            .authorities
            .iter()
            .find_map(|a| Role::from_authority(a))
            .ok_or(TokenError::Malformed)?;

        let mut principal = Principal::new(claims.sub, role);
        principal.set_authenticated(true);
        Ok(principal)
    }
}

/// Read the `alg` field of the JWT header
fn header_algorithm(token: &str) -> Result<String, TokenError> {
    let mut segments = token.split('.');
    let header = segments.next().filter(|s| !s.is_empty());
    if segments.count() != 2 {
        return Err(TokenError::Malformed);
    }

    let bytes = header
        .and_then(|h| URL_SAFE_NO_PAD.decode(h).ok())
        .ok_or(TokenError::Malformed)?;
    let header: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

    header
        .get("alg")
        .and_then(|alg| alg.as_str())
        .map(str::to_owned)
        .ok_or(TokenError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    fn user(email: &str, role: Role) -> User {
        User {
            id: 1,
            email: email.to_string(),
            password_hash: "irrelevant".to_string(),
            role,
        }
    }

    #[test]
    fn test_issue_verify_and_decode() {
        let service = service();
        let token = service.issue(&user("u@test.io", Role::User)).unwrap();

        assert!(service.verify(&token).unwrap());

        let claims = service.claims(&token).unwrap();
        assert_eq!(claims.sub, "u@test.io");
        assert_eq!(claims.authorities, vec!["ROLE_USER".to_string()]);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_huge_ttl_saturates_expiry() {
        let service = TokenService::new("test-secret", u64::MAX);
        let token = service.issue(&user("u@test.io", Role::User)).unwrap();

        let claims = service.claims(&token).unwrap();
        assert_eq!(claims.exp, u64::MAX);
        assert!(service.verify(&token).unwrap());
    }

    #[test]
    fn test_principal_role_follows_user_role() {
        let service = service();

        for (role, authority) in [(Role::Admin, "ROLE_ADMIN"), (Role::User, "ROLE_USER")] {
            let token = service.issue(&user("x@test.io", role)).unwrap();
            let principal = service
                .principal_from(service.claims(&token).unwrap())
                .unwrap();

            assert_eq!(principal.email(), "x@test.io");
            assert_eq!(principal.role(), role);
            assert_eq!(principal.authorities(), vec![authority]);
            assert!(principal.is_authenticated());
        }
    }

    #[test]
    fn test_expired_token_is_expired_kind() {
        let service = service();
        let now = get_current_timestamp();
        let token = service
            .sign(&Claims {
                sub: "u@test.io".to_string(),
                authorities: vec!["ROLE_USER".to_string()],
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));
        // Decoding alone does not look at expiry
        assert_eq!(service.claims(&token).unwrap().sub, "u@test.io");
    }

    #[test]
    fn test_malformed_token_is_malformed_kind() {
        let service = service();
        for token in ["", "invalid", "invalid.token.here", "a.b", "a.b.c.d"] {
            assert!(
                matches!(service.verify(token), Err(TokenError::Malformed)),
                "{token:?} should be malformed"
            );
        }
        assert!(matches!(service.claims("not-a-jwt"), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_foreign_algorithm_is_unsupported() {
        let service = service();
        let token = service.issue(&user("u@test.io", Role::User)).unwrap();
        let (_, rest) = token.split_once('.').unwrap();

        let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let forged = format!("{none_header}.{rest}");
        assert!(matches!(service.verify(&forged), Err(TokenError::Unsupported)));

        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &service.claims(&token).unwrap(),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(service.verify(&hs512), Err(TokenError::Unsupported)));
    }

    #[test]
    fn test_wrong_secret_is_plain_false() {
        let issuer = TokenService::new("secret1", 3600);
        let verifier = TokenService::new("secret2", 3600);

        let token = issuer.issue(&user("u@test.io", Role::Admin)).unwrap();
        assert!(!verifier.verify(&token).unwrap());
    }

    #[test]
    fn test_unknown_authority_is_malformed() {
        let service = service();
        let claims = Claims {
            sub: "u@test.io".to_string(),
            authorities: vec!["ROLE_ROOT".to_string()],
            iat: 0,
            exp: 0,
        };
        assert!(matches!(
            service.principal_from(claims),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_first_recognized_authority_wins() {
        let service = service();
        let claims = Claims {
            sub: "u@test.io".to_string(),
            authorities: vec!["SCOPE_read".to_string(), "ROLE_ADMIN".to_string()],
            iat: 0,
            exp: 0,
        };
        assert_eq!(service.principal_from(claims).unwrap().role(), Role::Admin);
    }
}
