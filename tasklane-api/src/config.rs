/// Environment-driven configuration
///
/// Everything the server needs arrives through environment variables, with
/// a `.env` file honored in development via `dotenvy`. Required: `DATABASE_URL`
/// and `JWT_SECRET` (32+ characters). Optional, with defaults: `API_HOST`
/// (0.0.0.0), `API_PORT` (8080), `DATABASE_MAX_CONNECTIONS` (10),
/// `CORS_ORIGINS` (comma-separated, `*` for permissive), and `APP_ENV`
/// (`production` turns on strict transport headers). Log filtering is the
/// usual `RUST_LOG`.

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; a single "*" entry means permissive
    pub cors_origins: Vec<String>,

    /// Production mode enables HSTS
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret, at least 32 bytes. Generate with `openssl rand -hex 32`.
    pub secret: String,
}

fn load_api() -> anyhow::Result<ApiConfig> {
    let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("API_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()?;

    let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "*".to_string())
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    let production = env::var("APP_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    Ok(ApiConfig {
        host,
        port,
        cors_origins,
        production,
    })
}

fn load_database() -> anyhow::Result<DatabaseConfig> {
    let url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .unwrap_or_else(|_| "10".to_string())
        .parse::<u32>()?;

    Ok(DatabaseConfig {
        url,
        max_connections,
    })
}

fn load_jwt() -> anyhow::Result<JwtConfig> {
    let secret = env::var("JWT_SECRET")
        .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

    if secret.len() < 32 {
        anyhow::bail!("JWT_SECRET must be at least 32 characters long");
    }

    Ok(JwtConfig { secret })
}

impl Config {
    /// Reads the full configuration from the environment
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing, a numeric one does not
    /// parse, or the JWT secret is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api: load_api()?,
            database: load_database()?,
            jwt: load_jwt()?,
        })
    }

    /// `host:port` string for the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_permissive_cors_marker() {
        assert!(test_config().api.cors_origins.contains(&"*".to_string()));
    }
}
