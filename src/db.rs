// taskmasters_backend/src/db.rs
use std::time::Duration;

use anyhow::Context;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

// an R2D2 connection pool
pub type SqlitePool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConn = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Per-connection pragmas. SQLite keeps these per handle, so they are applied
/// every time the pool opens a connection.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        let pragmas = format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        );
        conn.batch_execute(&pragmas).map_err(r2d2::Error::QueryError)
    }
}

/// Initialize the database pool.
pub fn init_pool(database_url: &str, max_size: u32) -> anyhow::Result<SqlitePool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: Duration::from_secs(5),
        }))
        .build(manager)
        .with_context(|| format!("failed to open database at {}", database_url))
}

/// Create any missing table. Every statement is `IF NOT EXISTS`, so this is
/// safe against a database file created by an older build.
pub fn run_migrations(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("failed to run migrations: {}", e))?;
    for version in applied {
        log::info!("applied migration {}", version);
    }
    Ok(())
}
