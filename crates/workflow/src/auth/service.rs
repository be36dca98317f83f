use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{encode, decode, Header as JwtHeader, EncodingKey, DecodingKey, Validation as JwtValidation};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};
use uuid::Uuid;

use super::domain::{
    password_meets_policy, AuthSession, AuthUser, Claims, LoginInput, NewProfile, SignupInput,
    PASSWORD_POLICY_MSG, TOKEN_TTL_HOURS,
};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub password_algorithm: String,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new account and hand back a signed session.
    ///
    /// # Examples
    /// ```
    /// use workflow::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use workflow::auth::domain::SignupInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), password_algorithm: "argon2".into() });
    /// let input = SignupInput {
    ///     email: "user@example.com".into(), username: "tester".into(), password: "Secret123".into(),
    ///     phone_number: None, address: None, city: None, profile_picture: None,
    /// };
    /// let session = tokio_test::block_on(svc.signup(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, username = %input.username))]
    pub async fn signup(&self, input: SignupInput) -> Result<AuthSession, AuthError> {
        if input.email.trim().is_empty()
            || input.username.trim().is_empty()
            || input.password.is_empty()
        {
            return Err(AuthError::Validation(vec!["All fields are required.".into()]));
        }

        let mut problems = Vec::new();
        if let Err(e) = models::user::validate_email(&input.email) {
            problems.push(e.to_string());
        }
        if let Err(e) = models::user::validate_username(&input.username) {
            problems.push(e.to_string());
        }
        if let Some(phone) = input.phone_number.as_deref() {
            if let Err(e) = models::user::validate_phone_number(phone) {
                problems.push(e.to_string());
            }
        }
        if !password_meets_policy(&input.password) {
            problems.push(PASSWORD_POLICY_MSG.into());
        }
        if !problems.is_empty() {
            return Err(AuthError::Validation(problems));
        }

        let by_email = self.repo.find_user_by_email(&input.email).await?;
        let by_username = self.repo.find_user_by_username(&input.username).await?;
        if by_email.is_some() || by_username.is_some() {
            debug!("signup rejected, identity taken");
            return Err(AuthError::Conflict("Username or email already exist.".into()));
        }

        let user = self.repo.create_user(NewProfile::from(&input)).await?;
        let hash = self.hash_password(&input.password)?;
        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(AuthSession { user, token })
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use workflow::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use workflow::auth::domain::{SignupInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: "secret".into(), password_algorithm: "argon2".into() });
    /// let _ = tokio_test::block_on(svc.signup(SignupInput {
    ///     email: "u@example.com".into(), username: "neo".into(), password: "Passw0rd".into(),
    ///     phone_number: None, address: None, city: None, profile_picture: None,
    /// })).unwrap();
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@example.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.username, "neo");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or_else(|| AuthError::Unauthorized(
                "Sorry, the provided email address could not be found in our system.".into(),
            ))?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or_else(|| AuthError::Unauthorized(
                "Oops! The password you entered is incorrect.".into(),
            ))?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized(
                "Oops! The password you entered is incorrect.".into(),
            ));
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Swap the stored password after checking the old one.
    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(&self, user_id: Uuid, old_password: &str, new_password: &str) -> Result<(), AuthError> {
        let cred = self.repo
            .get_credentials(user_id)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("Invalid old password. Please try again.".into()))?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(old_password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized("Invalid old password. Please try again.".into()));
        }

        if !password_meets_policy(new_password) {
            return Err(AuthError::Validation(vec![PASSWORD_POLICY_MSG.into()]));
        }

        let hash = self.hash_password(new_password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user_id, "password_changed");
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string())
    }

    fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

/// Verify a bearer token and return its claims. Expiry is enforced.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &JwtValidation::default(),
    )
    .map_err(|e| AuthError::TokenError(e.to_string()))?;
    Ok(data.claims)
}
