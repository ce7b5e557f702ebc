use crate::models::user::User;
use sqlx::MySqlPool;

pub struct UserRepository<'a> {
    pub pool: &'a MySqlPool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<u64, sqlx::Error> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        Ok(res.last_insert_id())
    }
}
