use crate::db::user_repository::UserRepository;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand_core::OsRng;
use serde::{Serialize, Deserialize};
use sqlx::MySqlPool;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub struct AuthService<'a> {
    repo: UserRepository<'a>,
    jwt_secret: &'a str,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: &'a MySqlPool, jwt_secret: &'a str) -> Self {
        Self {
            repo: UserRepository::new(pool),
            jwt_secret,
        }
    }

    pub async fn register_user(&self, name: &str, email: &str, password: &str) -> Result<String, &'static str> {
        if let Ok(Some(_)) = self.repo.get_by_email(email).await {
            return Err("User already exists");
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| "Failed to hash password")?
            .to_string();

        let user_id = self
            .repo
            .create_user(name, email, &password_hash)
            .await
            .map_err(|_| "Failed to create user")?;

        self.issue_token(user_id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, &'static str> {
        let user = self
            .repo
            .get_by_email(email)
            .await
            .map_err(|_| "Database error")?
            .ok_or("Invalid credentials")?;

        let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|_| "Invalid stored hash")?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Err("Invalid credentials");
        }

        self.issue_token(user.id)
    }

    fn issue_token(&self, user_id: u64) -> Result<String, &'static str> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + Duration::hours(24)).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|_| "Failed to create token")
    }
}
