use std::sync::Arc;

use glidepath_core::db::{create_pool, run_migrations, DbPool};

/// In-memory SQLite with migrations applied. The pool is capped at one
/// connection; separate connections would each get their own empty
/// in-memory database.
pub fn test_pool() -> Arc<DbPool> {
    let pool = create_pool(":memory:", 1).expect("failed to create test pool");
    let mut conn = pool.get().expect("failed to get connection");
    run_migrations(&mut conn).expect("failed to run migrations");
    pool
}
