use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_schema: String,
    pub database_max_connections: u32,
    pub secret_key: String,
    pub session_ttl_hours: i64,
    pub seed_script_path: PathBuf,
    pub reset_requires_auth: bool,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_URL not set, using local sqlite file");
                    "sqlite://pharmacy_testing.db".to_string()
                }),
            database_schema: env::var("DATABASE_SCHEMA")
                .unwrap_or_else(|_| "pharmacy_testing".to_string()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5),
            secret_key: env::var("SECRET_KEY")
                .unwrap_or_else(|_| {
                    warn!("SECRET_KEY not set, using empty value");
                    String::new()
                }),
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 8),
            seed_script_path: env::var("SEED_SCRIPT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("insert_create.sql")),
            reset_requires_auth: parse_var("RESET_REQUIRES_AUTH", false),
            bind_addr: parse_var("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000))),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - session tokens cannot be issued");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.secret_key.is_empty() && !self.database_url.is_empty()
    }
}

fn parse_var<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value {:?}, using default {:?}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
