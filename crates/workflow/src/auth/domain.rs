use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signup input. Contact fields are optional; format checks apply when
/// they are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupInput {
    pub email: String,
    pub username: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub profile_picture: Option<String>,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Profile fields persisted at signup, minus the password.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProfile {
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<&SignupInput> for NewProfile {
    fn from(input: &SignupInput) -> Self {
        Self {
            email: input.email.clone(),
            username: input.username.clone(),
            phone_number: input.phone_number.clone(),
            address: input.address.clone(),
            city: input.city.clone(),
            profile_picture: input.profile_picture.clone(),
        }
    }
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub profile_picture: Option<String>,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Login/signup result: the user plus a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
}

/// Bearer token claims. `sub` carries the verified user id every
/// protected operation receives as its actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sessions last six hours.
pub const TOKEN_TTL_HOURS: i64 = 6;

pub const PASSWORD_POLICY_MSG: &str = "Password must have at least 6 characters and contain at least one number, one lowercase and one uppercase letter.";

/// At least 6 characters with one digit, one lowercase and one uppercase.
pub fn password_meets_policy(password: &str) -> bool {
    password.len() >= 6
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::password_meets_policy;

    #[test]
    fn password_policy_accepts_and_rejects() {
        assert!(password_meets_policy("Abc123"));
        assert!(password_meets_policy("S3curePass"));
        assert!(!password_meets_policy("short"));
        assert!(!password_meets_policy("alllowercase1"));
        assert!(!password_meets_policy("ALLUPPERCASE1"));
        assert!(!password_meets_policy("NoDigitsHere"));
        assert!(!password_meets_policy("Ab1"));
    }
}
