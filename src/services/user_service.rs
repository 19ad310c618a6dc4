use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::user_models::{NewUser, User};
use crate::schema::users;
use crate::utils::auth_utils::{hash_password, verify_password};

pub fn find_by_username(conn: &mut SqliteConnection, username: &str) -> AppResult<Option<User>> {
    Ok(users::table
        .filter(users::username.eq(username))
        .select(User::as_select())
        .first(conn)
        .optional()?)
}

pub fn get_user(conn: &mut SqliteConnection, user_id: &str) -> AppResult<User> {
    users::table
        .filter(users::id.eq(user_id))
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

pub fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
    is_admin: bool,
    bcrypt_cost: u32,
) -> AppResult<User> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Username and password are required.".into()));
    }

    let new_user = NewUser {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: hash_password(password, bcrypt_cost)?,
        is_admin,
        created_at: Utc::now().naive_utc(),
    };

    match diesel::insert_into(users::table).values(&new_user).execute(conn) {
        Ok(_) => {}
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(AppError::Validation(format!("Username {} is already taken.", username)));
        }
        Err(e) => return Err(e.into()),
    }

    users::table
        .filter(users::id.eq(&new_user.id))
        .select(User::as_select())
        .first(conn)
        .map_err(AppError::from)
}

/// Creates the configured admin account unless the username already exists.
/// Returns whether an account was created.
pub fn ensure_admin(conn: &mut SqliteConnection, username: &str, password: &str, bcrypt_cost: u32) -> AppResult<bool> {
    if find_by_username(conn, username)?.is_some() {
        return Ok(false);
    }
    create_user(conn, username, password, true, bcrypt_cost)?;
    log::info!("created admin account {}", username);
    Ok(true)
}

/// Unknown usernames and wrong passwords are indistinguishable to the caller.
pub fn authenticate(conn: &mut SqliteConnection, username: &str, password: &str) -> AppResult<User> {
    let user = find_by_username(conn, username.trim())?.ok_or(AppError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }
    Ok(user)
}
