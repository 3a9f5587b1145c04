//! Core business logic for the authentication system.
//!
//! This service handles operations such as user creation, password hashing,
//! token issuance, rotation and revocation. It orchestrates interactions
//! between handlers and the database.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, info, warn};

use super::errors::AuthError;
use super::models::{Claims, LoginRequest, RegisterRequest, TokenKind, TokenPair};
use crate::config::Config;
use crate::database::models::{NewUser, User, UserRole};
use crate::database::{queries, Database};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const STUDENT_DOMAIN: &str = "@students.iitmandi.ac.in";
pub const STAFF_DOMAIN: &str = "@iitmandi.ac.in";

pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    bcrypt_cost: u32,
}

/// Lower-cases and trims an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.contains('@') && domain.contains('.')
        }
        None => false,
    }
}

/// Students register with the student domain, everyone else with the staff
/// domain. The student domain does not satisfy the staff rule.
pub fn email_matches_role(email: &str, role: UserRole) -> bool {
    match role {
        UserRole::Student => email.ends_with(STUDENT_DOMAIN),
        _ => email.ends_with(STAFF_DOMAIN) && !email.ends_with(STUDENT_DOMAIN),
    }
}

pub fn check_password_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            access_ttl: Duration::minutes(config.access_token_expire_minutes),
            refresh_ttl: Duration::days(config.refresh_token_expire_days),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }

    /// A malformed stored hash counts as a mismatch.
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await?
            .unwrap_or(false);
        Ok(verified)
    }

    fn issue(&self, user: &User, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            token_type: kind,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Encoding)
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(TokenPair::bearer(
            self.issue(user, TokenKind::Access)?,
            self.issue(user, TokenKind::Refresh)?,
        ))
    }

    /// Verifies signature and expiry and checks the token is of the expected
    /// kind.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| {
                debug!(error = %err, "rejected token");
                match expected {
                    TokenKind::Access => AuthError::InvalidToken,
                    TokenKind::Refresh => AuthError::InvalidRefreshToken,
                }
            })?
            .claims;
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType);
        }
        Ok(claims)
    }

    pub async fn register(&self, db: &Database, request: RegisterRequest) -> Result<User, AuthError> {
        if request.role == UserRole::Admin.as_str() {
            return Err(AuthError::AdminSelfAssignment);
        }
        let role: UserRole = request.role.parse().map_err(|_| AuthError::InvalidRole)?;

        let email = normalize_email(&request.email);
        if !is_plausible_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if !email_matches_role(&email, role) {
            return Err(AuthError::EmailDomain(role));
        }
        check_password_strength(&request.password)?;

        // Hashing happens before the lock is taken; the duplicate check and
        // the insert share one critical section.
        let password_hash = self.hash_password(&request.password).await?;
        let user = db
            .call(|conn| -> rusqlite::Result<Option<User>> {
                if queries::find_user_by_email(conn, &email)?.is_some() {
                    return Ok(None);
                }
                queries::insert_user(
                    conn,
                    &NewUser {
                        email: &email,
                        password_hash: &password_hash,
                        role,
                        display_name: request.display_name.as_deref(),
                        department: request.department.as_deref(),
                        avatar_url: request.avatar_url.as_deref(),
                    },
                )
                .map(Some)
            })
            .await?
            .ok_or(AuthError::EmailTaken)?;
        info!(user_id = %user.id, role = %user.role, "registered user");
        Ok(user)
    }

    pub async fn login(&self, db: &Database, request: LoginRequest) -> Result<TokenPair, AuthError> {
        let email = normalize_email(&request.email);
        let user = db
            .call(|conn| queries::find_user_by_email(conn, &email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(&request.password, &user.password_hash).await? {
            warn!(user_id = %user.id, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        debug!(user_id = %user.id, "issued tokens");
        self.issue_pair(&user)
    }

    /// Exchanges a refresh token for a new pair. The presented token is
    /// revoked, so each refresh token works once.
    pub async fn refresh(&self, db: &Database, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .decode(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        // Revocation check, user lookup and revocation run under one lock so
        // a token cannot be exchanged twice by concurrent requests.
        let user = db
            .call(|conn| -> rusqlite::Result<Result<User, AuthError>> {
                if queries::is_token_revoked(conn, &claims.jti)? {
                    return Ok(Err(AuthError::InvalidRefreshToken));
                }
                let user = match queries::find_user(conn, &claims.sub)? {
                    Some(user) if user.is_active => user,
                    _ => return Ok(Err(AuthError::UserUnavailable)),
                };
                if !queries::revoke_token(conn, &claims.jti, claims.exp)? {
                    return Ok(Err(AuthError::InvalidRefreshToken));
                }
                Ok(Ok(user))
            })
            .await??;
        self.issue_pair(&user)
    }

    /// Revokes the refresh token when it verifies. Unverifiable tokens are
    /// ignored: the client is logging out either way.
    pub async fn logout(&self, db: &Database, refresh_token: &str) -> Result<(), AuthError> {
        match self.decode(refresh_token, TokenKind::Refresh) {
            Ok(claims) => {
                let now = Utc::now().timestamp();
                db.call(|conn| {
                    queries::revoke_token(conn, &claims.jti, claims.exp)?;
                    queries::purge_expired_revocations(conn, now).map(|_| ())
                })
                .await?;
                debug!(user_id = %claims.sub, "revoked refresh token");
            }
            Err(err) => debug!(error = %err, "logout with unusable token"),
        }
        Ok(())
    }

    pub async fn change_password(
        &self,
        db: &Database,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = db
            .call(|conn| queries::find_user(conn, user_id))
            .await?
            .ok_or(AuthError::UserUnavailable)?;
        if !self.verify_password(current_password, &user.password_hash).await? {
            return Err(AuthError::WrongPassword);
        }
        check_password_strength(new_password)?;

        let hash = self.hash_password(new_password).await?;
        db.call(|conn| queries::update_password(conn, user_id, &hash))
            .await?;
        info!(user_id, "changed password");
        Ok(())
    }
}
