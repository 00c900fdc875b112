use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{info, instrument};

use super::domain::{AuthUser, Claims, LoginInput, TokenPair};
use super::errors::AuthError;
use super::repository::AuthRepository;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

/// Hash a plaintext password with argon2 (used on login setup and enrollment).
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Decode and validate any of our HS256 tokens, mapping expiry separately
/// from malformed/garbage input.
pub fn decode_claims(jwt_secret: &str, token: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(AuthError::TokenExpired),
            _ => Err(AuthError::TokenInvalid),
        },
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Authenticate a user and issue an access/refresh token pair.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig, hash_password}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{AuthUser, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let user = AuthUser { id: uuid::Uuid::new_v4(), branch_id: uuid::Uuid::new_v4(), email: "u@e.com".into(), name: "N".into(), role: "staff".into() };
    /// repo.insert_user(user, hash_password("Passw0rd").unwrap());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), access_ttl_minutes: 30, refresh_ttl_days: 14 });
    /// let pair = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert!(!pair.access_token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<TokenPair, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let pair = self.issue_pair(&user)?;
        info!(user_id = %user.id, branch_id = %user.branch_id, "login_succeeded");
        Ok(pair)
    }

    /// Exchange a valid refresh token for a fresh token pair.
    ///
    /// Expired refresh tokens fail with `TokenExpired`; access tokens and
    /// malformed input fail with `TokenInvalid`. The user is re-loaded so a
    /// deleted account cannot keep refreshing.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = decode_claims(&self.cfg.jwt_secret, refresh_token)?;
        if claims.typ != TOKEN_TYPE_REFRESH {
            return Err(AuthError::TokenInvalid);
        }
        let user_id = claims.uid.parse().map_err(|_| AuthError::TokenInvalid)?;
        let user = self.repo
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let pair = self.issue_pair(&user)?;
        info!(user_id = %user.id, "token_refreshed");
        Ok(pair)
    }

    /// Validate an access token and return its claims (used by middleware).
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode_claims(&self.cfg.jwt_secret, token)?;
        if claims.typ != TOKEN_TYPE_ACCESS {
            return Err(AuthError::TokenInvalid);
        }
        Ok(claims)
    }

    fn issue_pair(&self, user: &AuthUser) -> Result<TokenPair, AuthError> {
        let access_exp = chrono::Utc::now() + chrono::Duration::minutes(self.cfg.access_ttl_minutes);
        let refresh_exp = chrono::Utc::now() + chrono::Duration::days(self.cfg.refresh_ttl_days);
        let access_token = self.issue_token(user, TOKEN_TYPE_ACCESS, access_exp.timestamp() as usize)?;
        let refresh_token = self.issue_token(user, TOKEN_TYPE_REFRESH, refresh_exp.timestamp() as usize)?;
        Ok(TokenPair { access_token, refresh_token })
    }

    fn issue_token(&self, user: &AuthUser, typ: &str, exp: usize) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id.to_string(),
            bid: user.branch_id.to_string(),
            role: user.role.clone(),
            typ: typ.to_string(),
            exp,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::auth::domain::{AuthUser, LoginInput};
    use crate::auth::repository::mock::MockAuthRepository;

    fn test_cfg() -> AuthConfig {
        AuthConfig { jwt_secret: "test-secret".into(), access_ttl_minutes: 30, refresh_ttl_days: 14 }
    }

    fn seeded_service(password: &str) -> (AuthService<MockAuthRepository>, AuthUser) {
        let repo = Arc::new(MockAuthRepository::default());
        let user = AuthUser {
            id: Uuid::new_v4(),
            branch_id: Uuid::new_v4(),
            email: "teacher@school.vn".into(),
            name: "Tran Thi B".into(),
            role: "staff".into(),
        };
        repo.insert_user(user.clone(), hash_password(password).expect("hash"));
        (AuthService::new(repo, test_cfg()), user)
    }

    #[tokio::test]
    async fn login_issues_both_tokens() {
        let (svc, user) = seeded_service("Passw0rd!");
        let pair = svc.login(LoginInput { email: user.email.clone(), password: "Passw0rd!".into() })
            .await
            .expect("login");

        let access = svc.verify_access(&pair.access_token).expect("access claims");
        assert_eq!(access.sub, user.email);
        assert_eq!(access.uid, user.id.to_string());
        assert_eq!(access.typ, TOKEN_TYPE_ACCESS);

        let refresh = decode_claims("test-secret", &pair.refresh_token).expect("refresh claims");
        assert_eq!(refresh.typ, TOKEN_TYPE_REFRESH);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let (svc, user) = seeded_service("Passw0rd!");
        let err = svc.login(LoginInput { email: user.email, password: "wrong".into() })
            .await
            .expect_err("should fail");
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn login_rejects_unknown_user() {
        let (svc, _user) = seeded_service("Passw0rd!");
        let err = svc.login(LoginInput { email: "nobody@school.vn".into(), password: "x".into() })
            .await
            .expect_err("should fail");
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn refresh_rotates_the_pair() {
        let (svc, user) = seeded_service("Passw0rd!");
        let pair = svc.login(LoginInput { email: user.email, password: "Passw0rd!".into() })
            .await
            .expect("login");
        let rotated = svc.refresh(&pair.refresh_token).await.expect("refresh");
        let claims = svc.verify_access(&rotated.access_token).expect("claims");
        assert_eq!(claims.uid, user.id.to_string());
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() {
        let (svc, user) = seeded_service("Passw0rd!");
        let pair = svc.login(LoginInput { email: user.email, password: "Passw0rd!".into() })
            .await
            .expect("login");
        let err = svc.refresh(&pair.access_token).await.expect_err("wrong token type");
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn refresh_rejects_expired_token() {
        let (svc, user) = seeded_service("Passw0rd!");
        // Hand-craft a refresh token that expired an hour ago (beyond leeway)
        let exp = (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp() as usize;
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id.to_string(),
            bid: user.branch_id.to_string(),
            role: user.role.clone(),
            typ: TOKEN_TYPE_REFRESH.into(),
            exp,
        };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret("test-secret".as_bytes()))
            .expect("encode");
        let err = svc.refresh(&token).await.expect_err("expired");
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn refresh_rejects_garbage() {
        let (svc, _user) = seeded_service("Passw0rd!");
        let err = svc.refresh("not-a-jwt").await.expect_err("garbage");
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn verify_access_rejects_refresh_token() {
        let (svc, user) = seeded_service("Passw0rd!");
        let pair = svc.login(LoginInput { email: user.email, password: "Passw0rd!".into() })
            .await
            .expect("login");
        let err = svc.verify_access(&pair.refresh_token).expect_err("wrong type");
        assert!(matches!(err, AuthError::TokenInvalid));
    }
}
