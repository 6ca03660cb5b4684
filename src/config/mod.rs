use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub listing: ListingConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    /// Shared PostgreSQL database
    Postgres,
    /// Process-local store for demo and offline use
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub allow_demo_principal: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("BIND_ADDRESS") {
            self.server.bind_address = v;
        }
        if let Some(port) = env::var("CAREERBRIDGE_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
            self.database.backend = StorageBackend::Postgres;
        }
        match env::var("STORAGE_BACKEND").as_deref() {
            Ok("memory") => self.database.backend = StorageBackend::Memory,
            Ok("postgres") => self.database.backend = StorageBackend::Postgres,
            _ => {}
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Listing overrides
        if let Ok(v) = env::var("LISTING_PAGE_SIZE") {
            self.listing.page_size = v.parse().unwrap_or(self.listing.page_size);
        }
        if let Ok(v) = env::var("LISTING_MAX_PAGE_SIZE") {
            self.listing.max_page_size = v.parse().unwrap_or(self.listing.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ALLOW_DEMO_PRINCIPAL") {
            self.security.allow_demo_principal = v.parse().unwrap_or(self.security.allow_demo_principal);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            listing: ListingConfig {
                page_size: 10,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: "careerbridge-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                allow_demo_principal: true,
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            listing: ListingConfig {
                page_size: 10,
                max_page_size: 50,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                allow_demo_principal: true,
                enable_cors: true,
                cors_origins: vec!["https://staging.careerbridge.app".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            listing: ListingConfig {
                page_size: 10,
                max_page_size: 50,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                allow_demo_principal: false,
                enable_cors: true,
                cors_origins: vec!["https://careerbridge.app".to_string()],
            },
        }
    }

    /// Page size actually used for a listing request
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(n) if n > 0 => {
                if n > self.listing.max_page_size {
                    tracing::debug!("Page size {} exceeds max {}, capping", n, self.listing.max_page_size);
                }
                n.min(self.listing.max_page_size)
            }
            _ => self.listing.page_size,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.listing.page_size, 10);
        assert!(config.security.allow_demo_principal);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert!(!config.security.allow_demo_principal);
        assert!(config.security.jwt_secret.is_empty());
    }

    #[test]
    fn page_size_defaults_and_caps() {
        let config = AppConfig::development();
        assert_eq!(config.page_size(None), 10);
        assert_eq!(config.page_size(Some(0)), 10);
        assert_eq!(config.page_size(Some(25)), 25);
        assert_eq!(config.page_size(Some(5000)), 100);
    }
}
