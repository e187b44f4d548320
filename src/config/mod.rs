use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub master_username: String,
    pub master_password: String,
}

/// Authority rules that diverged across the original server snapshots.
/// Selected once at startup; the scoping engine branches on these, never on
/// hardcoded role special cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// When false, master is read-only on reservations.
    pub master_can_manage_reservations: bool,
    /// When true, new admins are parented to the seeded root master (id 1)
    /// instead of the creating master account.
    pub admin_creation_restricted_to_root_master: bool,
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
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("MASTER_USERNAME") {
            self.security.master_username = v;
        }
        if let Ok(v) = env::var("MASTER_PASSWORD") {
            self.security.master_password = v;
        }

        // Policy overrides
        if let Ok(v) = env::var("POLICY_MASTER_CAN_MANAGE_RESERVATIONS") {
            self.policy.master_can_manage_reservations = v
                .parse()
                .unwrap_or(self.policy.master_can_manage_reservations);
        }
        if let Ok(v) = env::var("POLICY_ADMIN_CREATION_RESTRICTED_TO_ROOT_MASTER") {
            self.policy.admin_creation_restricted_to_root_master = v
                .parse()
                .unwrap_or(self.policy.admin_creation_restricted_to_root_master);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "sqlite://ems.db?mode=rwc".to_string(),
                max_connections: 5,
                acquire_timeout_secs: 30,
            },
            security: SecurityConfig {
                jwt_secret: "dev-only-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                master_username: "master".to_string(),
                master_password: "master1234".to_string(),
            },
            policy: PolicyConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: "sqlite://ems.db?mode=rwc".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_expiry_hours: 24,
                master_username: "master".to_string(),
                master_password: "master1234".to_string(),
            },
            policy: PolicyConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "sqlite://ems.db?mode=rwc".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_expiry_hours: 4,
                master_username: "master".to_string(),
                master_password: "master1234".to_string(),
            },
            policy: PolicyConfig::default(),
        }
    }
}

impl Default for PolicyConfig {
    // Defaults match the newest server snapshot: master stays read-only on
    // reservations, admins are always parented to the root master.
    fn default() -> Self {
        Self {
            master_can_manage_reservations: false,
            admin_creation_restricted_to_root_master: true,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
