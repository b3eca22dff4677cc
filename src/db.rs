use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;

use crate::errors::{DatabaseError, Result};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Per-connection pragmas. Foreign keys must be enabled explicitly on SQLite
/// or the ON DELETE CASCADE clauses in the schema are silently ignored.
#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Build an r2d2 connection pool for the given SQLite database path.
///
/// Tests pass `":memory:"` with `max_connections = 1`; a larger pool over an
/// in-memory database would hand out independent empty databases.
pub fn create_pool(db_url: &str, max_connections: u32) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_url);
    let pool = Pool::builder()
        .max_size(max_connections)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(DatabaseError::PoolFailed)?;
    Ok(Arc::new(pool))
}

/// Apply any pending embedded migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
    if !applied.is_empty() {
        info!("Applied {} database migration(s)", applied.len());
    }
    Ok(())
}
