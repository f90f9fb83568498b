use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File, Source};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// A caller known to the service by a static bearer token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub port: u16,
    pub enable_swagger: bool,
    /// Facility time zone used for weekday, hour and date checks.
    pub timezone: Tz,
    /// PostgreSQL connection string; the in-process store is used when unset.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub seed_demo_data: bool,
    pub admin_token: String,
    /// Read from `[[accounts]]` tables in `settings.toml`. Environment
    /// variables cannot set this list.
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(File::with_name("settings").required(false))
    }

    fn load(file: impl Source + Send + Sync + 'static) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(file)
            // APP_DATABASE_URL, APP_ADMIN_TOKEN, ...; nested keys use `__`
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("debug", false)?
            .set_default("port", 8080)?
            .set_default("enable_swagger", true)?
            .set_default("timezone", "UTC")?
            .set_default("database_max_connections", 5)?
            .set_default("seed_demo_data", false)?
            .set_default("admin_token", "admin-token-change-me")?
            .build()?;

        config.try_deserialize()
    }

    pub fn in_memory(admin_token: impl Into<String>) -> Self {
        Self {
            debug: false,
            port: 8080,
            enable_swagger: true,
            timezone: Tz::UTC,
            database_url: None,
            database_max_connections: 5,
            seed_demo_data: false,
            admin_token: admin_token.into(),
            accounts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_defaults() {
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.timezone, Tz::UTC);
        assert!(settings.database_url.is_none());
        assert!(settings.accounts.is_empty());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        // SAFETY: serialized with the other environment tests.
        unsafe {
            std::env::set_var("APP_PORT", "9090");
            std::env::set_var("APP_TIMEZONE", "Asia/Kolkata");
            std::env::set_var("APP_SEED_DEMO_DATA", "true");
        }
        let settings = Settings::from_env();
        unsafe {
            std::env::remove_var("APP_PORT");
            std::env::remove_var("APP_TIMEZONE");
            std::env::remove_var("APP_SEED_DEMO_DATA");
        }

        let settings = settings.unwrap();
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.timezone, chrono_tz::Asia::Kolkata);
        assert!(settings.seed_demo_data);
    }

    #[test]
    #[serial]
    fn test_accounts_from_settings_file() {
        let toml = r#"
            admin_token = "file-admin"

            [[accounts]]
            token = "alice-token"
            user_id = "00000000-0000-0000-0000-000000000001"
            name = "Alice"

            [[accounts]]
            token = "ops-token"
            user_id = "00000000-0000-0000-0000-000000000002"
            name = "Ops"
            role = "admin"
        "#;

        let settings = Settings::load(File::from_str(toml, config::FileFormat::Toml)).unwrap();

        assert_eq!(settings.admin_token, "file-admin");
        assert_eq!(settings.accounts.len(), 2);
        assert_eq!(settings.accounts[0].user_id, Uuid::from_u128(1));
        assert_eq!(settings.accounts[0].role, Role::User);
        assert_eq!(settings.accounts[1].name, "Ops");
        assert_eq!(settings.accounts[1].role, Role::Admin);
    }
}
