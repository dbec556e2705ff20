//! User repository for database operations

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::{NewUser, Role, UpdateUser, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new user with the customer role
    pub async fn create(&self, new_user: &NewUser) -> AppResult<User> {
        info!("Creating new user: {}", new_user.login);

        let password_hash = hash_password(&new_user.password)?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (login, password_hash, role, favorite_item, phone_number)
            VALUES ($1, $2, 'customer', NULL, $3)
            "#,
        )
        .bind(&new_user.login)
        .bind(&password_hash)
        .bind(&new_user.phone_number)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(User {
                login: new_user.login.clone(),
                password_hash,
                role: Role::Customer,
                favorite_item: None,
                phone_number: new_user.phone_number.clone(),
            }),
            Err(e) if is_unique_violation(&e) => Err(AppError::Validation(format!(
                "User {} already exists. Please use a different login.",
                new_user.login
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Find a user by login
    pub async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT login, password_hash, role, favorite_item, phone_number
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_user).transpose()
    }

    /// Load the current role for a login.
    ///
    /// Called on every dispatch so a role change made mid-session is
    /// honored on the next action.
    pub async fn role_of(&self, login: &str) -> AppResult<Role> {
        let row = sqlx::query(r#"SELECT role FROM users WHERE login = $1"#)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        parse_role(&row.get::<String, _>("role"))
    }

    /// Verify a password against the stored hash
    pub fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Validation(format!("Failed to parse password hash: {}", e)))?;

        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Apply an update to a user record, one field per statement.
    ///
    /// Passwords are re-hashed before storage. Fails with NotFound when
    /// the login does not exist.
    pub async fn update(&self, login: &str, update: &UpdateUser) -> AppResult<()> {
        info!("Updating user: {}", login);

        if let Some(password) = &update.password {
            let hash = hash_password(password)?;
            self.set_field(login, "password_hash", &hash).await?;
        }

        if let Some(role) = update.role {
            self.set_field(login, "role", role.as_str()).await?;
        }

        if let Some(favorite_item) = &update.favorite_item {
            let result = sqlx::query(r#"UPDATE users SET favorite_item = $2 WHERE login = $1"#)
                .bind(login)
                .bind(favorite_item.as_deref())
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("User"));
            }
        }

        if let Some(phone_number) = &update.phone_number {
            self.set_field(login, "phone_number", phone_number).await?;
        }

        Ok(())
    }

    /// Rename a login (manager action); cascading references are not in
    /// scope, so this fails on logins with existing orders.
    pub async fn rename(&self, login: &str, new_login: &str) -> AppResult<()> {
        let result = sqlx::query(r#"UPDATE users SET login = $2 WHERE login = $1"#)
            .bind(login)
            .bind(new_login)
            .execute(&self.pool)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => Err(AppError::NotFound("User")),
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AppError::Validation(format!(
                "User {} already exists. Please use a different login.",
                new_login
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_field(&self, login: &str, column: &'static str, value: &str) -> AppResult<()> {
        // column names come from a fixed set above, values are bound
        let sql = format!("UPDATE users SET {} = $2 WHERE login = $1", column);
        let result = sqlx::query(&sql)
            .bind(login)
            .bind(value)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User"));
        }
        Ok(())
    }
}

/// Hash a password with a fresh salt
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Validation(format!("Failed to hash password: {}", e)))?
        .to_string())
}

fn parse_role(raw: &str) -> AppResult<Role> {
    raw.parse()
        .map_err(|e: String| AppError::Store(sqlx::Error::Decode(e.into())))
}

fn map_user(row: PgRow) -> AppResult<User> {
    Ok(User {
        login: row.get("login"),
        password_hash: row.get("password_hash"),
        role: parse_role(&row.get::<String, _>("role"))?,
        favorite_item: row.get("favorite_item"),
        phone_number: row.get("phone_number"),
    })
}
