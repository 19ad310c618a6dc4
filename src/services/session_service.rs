use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::session_models::{NewSession, Session, SessionResponse};
use crate::schema::sessions;
use crate::services::user_service;
use crate::utils::token_utils::generate_jwt;

/// Verifies credentials and records a new session token.
pub fn login(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
    secret: &[u8],
    ttl_hours: i64,
) -> AppResult<SessionResponse> {
    let user = user_service::authenticate(conn, username, password)?;
    let (token, expires_at) = generate_jwt(&user.id, secret, ttl_hours)?;

    let new_session = NewSession {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        token: token.clone(),
        created_at: Utc::now().naive_utc(),
        expires_at,
    };
    diesel::insert_into(sessions::table)
        .values(&new_session)
        .execute(conn)?;

    log::info!("user {} logged in", user.username);
    Ok(SessionResponse { token, expires_at })
}

pub fn logout(conn: &mut SqliteConnection, token: &str) -> AppResult<()> {
    let deleted = diesel::delete(sessions::table.filter(sessions::token.eq(token))).execute(conn)?;
    if deleted == 0 {
        return Err(AppError::NotFound("Session not found".into()));
    }
    Ok(())
}

/// The session behind `token`, if it exists and has not expired.
pub fn find_active(conn: &mut SqliteConnection, token: &str) -> AppResult<Option<Session>> {
    Ok(sessions::table
        .filter(sessions::token.eq(token))
        .filter(sessions::expires_at.gt(Utc::now().naive_utc()))
        .select(Session::as_select())
        .first(conn)
        .optional()?)
}

pub fn purge_expired(conn: &mut SqliteConnection) -> AppResult<usize> {
    Ok(diesel::delete(sessions::table.filter(sessions::expires_at.le(Utc::now().naive_utc()))).execute(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{connection, user};
    use chrono::Duration;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn login_then_logout() {
        let mut conn = connection();
        user(&mut conn, "alice");

        let session = login(&mut conn, "alice", "password", SECRET, 1).unwrap();
        assert!(find_active(&mut conn, &session.token).unwrap().is_some());

        logout(&mut conn, &session.token).unwrap();
        assert!(find_active(&mut conn, &session.token).unwrap().is_none());
        assert!(matches!(logout(&mut conn, &session.token), Err(AppError::NotFound(_))));
    }

    #[test]
    fn wrong_password_creates_no_session() {
        let mut conn = connection();
        user(&mut conn, "alice");
        assert!(matches!(
            login(&mut conn, "alice", "wrong", SECRET, 1),
            Err(AppError::InvalidCredentials)
        ));
        let count: i64 = sessions::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn expired_sessions_are_inactive_and_purged() {
        let mut conn = connection();
        user(&mut conn, "alice");
        let session = login(&mut conn, "alice", "password", SECRET, 1).unwrap();

        diesel::update(sessions::table)
            .set(sessions::expires_at.eq(Utc::now().naive_utc() - Duration::hours(1)))
            .execute(&mut conn)
            .unwrap();

        assert!(find_active(&mut conn, &session.token).unwrap().is_none());
        assert_eq!(purge_expired(&mut conn).unwrap(), 1);
    }
}
