//! Admin user management commands.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use orchard_core::Role;

use super::CommandError;

/// Create an admin user, together with their cart and wishlist rows.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for an unknown role and
/// `CommandError::Database` if the email or nickname is already taken.
pub async fn create_user(
    email: &str,
    name: &str,
    nickname: &str,
    password: &str,
    role: &str,
) -> Result<(), CommandError> {
    let role: Role = role
        .parse()
        .map_err(|e: String| CommandError::InvalidArgument(e))?;
    if role == Role::User {
        return Err(CommandError::InvalidArgument(
            "use the sign-up endpoint for regular users".to_string(),
        ));
    }

    let password_hash = hash_password(password)?;

    let pool = super::connect().await?;
    let mut tx = pool.begin().await?;

    let (user_id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (email, password_hash, name, nickname, role)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(email)
    .bind(&password_hash)
    .bind(name)
    .bind(nickname)
    .bind(role.to_string())
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO carts (user_id) VALUES ($1)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO wishlists (user_id) VALUES ($1)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(%user_id, %role, "admin user created");
    Ok(())
}

fn hash_password(password: &str) -> Result<String, CommandError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CommandError::PasswordHash)
}
