use clap::{Args, ValueEnum};
use log::warn;
use thiserror::Error;
use url::Url;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://departments.db?mode=rwc";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid database URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Database URL scheme '{scheme}' does not match driver '{driver}'")]
    DriverMismatch { driver: Driver, scheme: String },

    #[error("Credentials cannot be applied to database URL '{0}'")]
    Credentials(String),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Driver {
    Sqlite,
    Postgres,
    /// MySQL or MariaDB.
    #[value(alias = "mariadb")]
    Mysql,
}

impl Driver {
    fn accepts_scheme(&self, scheme: &str) -> bool {
        match self {
            Driver::Sqlite => scheme == "sqlite",
            Driver::Postgres => scheme == "postgres" || scheme == "postgresql",
            Driver::Mysql => scheme == "mysql" || scheme == "mariadb",
        }
    }

    fn takes_credentials(&self) -> bool {
        matches!(self, Driver::Postgres | Driver::Mysql)
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Driver::Sqlite => write!(f, "sqlite"),
            Driver::Postgres => write!(f, "postgres"),
            Driver::Mysql => write!(f, "mysql"),
        }
    }
}

/// Connection settings, read from flags with environment fallbacks.
#[derive(Args, Clone, Debug)]
pub struct DatabaseConfig {
    /// Database driver.
    #[arg(long, env = "DB_DRIVER", value_enum, default_value_t = Driver::Sqlite)]
    pub driver: Driver,

    /// Connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    #[arg(long = "db-user", env = "DB_USERNAME")]
    pub username: Option<String>,

    #[arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip creating the departments table when it is missing.
    #[arg(long = "no-init-schema", env = "DB_NO_INIT_SCHEMA")]
    pub no_init_schema: bool,
}

impl DatabaseConfig {
    /// Checks the URL against the driver and folds the credentials into it.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        let mut url = Url::parse(&self.database_url)?;

        if !self.driver.accepts_scheme(url.scheme()) {
            return Err(ConfigError::DriverMismatch {
                driver: self.driver,
                scheme: url.scheme().to_string(),
            });
        }

        if self.username.is_none() && self.password.is_none() {
            return Ok(self.database_url.clone());
        }

        if !self.driver.takes_credentials() {
            warn!("Ignoring database credentials for driver {}", self.driver);
            return Ok(self.database_url.clone());
        }

        if let Some(username) = &self.username {
            url.set_username(username)
                .map_err(|_| ConfigError::Credentials(self.database_url.clone()))?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| ConfigError::Credentials(self.database_url.clone()))?;
        }

        Ok(url.to_string())
    }
}
