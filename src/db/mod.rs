pub mod department;

use crate::errors::DbError;
use log::{debug, error, info, warn};
use sqlx::{AnyConnection, Connection};
use std::sync::Once;

pub const INIT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS departments (
    code VARCHAR(20) PRIMARY KEY NOT NULL,
    name VARCHAR(50) NOT NULL,
    location_id INTEGER NOT NULL,
    manager_id INTEGER NOT NULL
)
"#;

static INSTALL_DRIVERS: Once = Once::new();

/// Owns the one database connection the application uses.
///
/// The connection is opened on first use and reopened when the cached one
/// has been closed, invalidated, or no longer answers a ping.
pub struct ConnectionProvider {
    url: String,
    conn: Option<AnyConnection>,
}

impl ConnectionProvider {
    pub fn new(url: impl Into<String>) -> Self {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
        ConnectionProvider {
            url: url.into(),
            conn: None,
        }
    }

    pub async fn get_connection(&mut self) -> Result<&mut AnyConnection, DbError> {
        if let Some(conn) = self.conn.as_mut() {
            if let Err(err) = conn.ping().await {
                warn!("Cached database connection is dead, reconnecting: {}", err);
                self.conn = None;
            }
        }

        if self.conn.is_none() {
            let conn = AnyConnection::connect(&self.url).await.map_err(|err| {
                error!("Failed to connect to the database: {}", err);
                DbError::Connection(err.to_string())
            })?;
            info!("Database connection established");
            self.conn = Some(conn);
        }

        self.conn
            .as_mut()
            .ok_or_else(|| DbError::Connection("connection unavailable".to_string()))
    }

    /// Drops the cached connection without a graceful shutdown.
    pub fn invalidate(&mut self) {
        if self.conn.take().is_some() {
            debug!("Database connection invalidated");
        }
    }

    pub async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close().await {
                Ok(()) => info!("Database connection closed"),
                Err(err) => error!("Error while closing the database connection: {}", err),
            }
        }
    }

    /// Creates the departments table if it does not exist yet.
    pub async fn init_schema(&mut self) -> Result<(), DbError> {
        let conn = self.get_connection().await?;
        sqlx::query(INIT_SCHEMA).execute(&mut *conn).await?;
        debug!("Departments table ready");
        Ok(())
    }
}
