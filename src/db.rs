use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, PooledConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::errors::AppError;

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Per-connection pragmas: cascades need foreign keys, concurrent writers
/// wait on the lock instead of failing with SQLITE_BUSY.
#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        apply_pragmas(conn).map_err(r2d2::Error::QueryError)
    }
}

pub fn apply_pragmas(conn: &mut SqliteConnection) -> diesel::QueryResult<()> {
    conn.batch_execute(
        "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;",
    )
}

pub fn init_pool(database_url: &str, max_size: u32) -> Result<DbPool, AppError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| AppError::Pool(e.to_string()))
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), AppError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| {
            if !applied.is_empty() {
                log::info!("applied {} database migration(s)", applied.len());
            }
        })
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
}

/// Helper function to get a pooled DB connection
pub fn get_conn(pool: &DbPool) -> Result<DbConn, AppError> {
    pool.get().map_err(|e| AppError::Pool(e.to_string()))
}
