use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

pub const CONFIG_FILE: &str = "curriculum-ingest.toml";
pub const ENV_PREFIX: &str = "CURRICULUM_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend project URL, e.g. `https://xyz.supabase.co`
    pub supabase_url: Option<String>,
    /// Privileged (service role) key used for every backend call
    pub supabase_service_role_key: Option<String>,
    /// Table holding curriculum outcomes
    pub table: String,
    pub host: String,
    pub port: u16,
    /// Data rows processed by the diagnostic endpoints
    pub diagnostic_row_limit: usize,
    pub max_upload_mb: usize,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_service_role_key: None,
            table: "curriculum_outcomes".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3001,
            diagnostic_row_limit: 5,
            max_upload_mb: 50,
            request_timeout_secs: 60,
        }
    }
}

/// Connection settings once both credentials are known to be present.
#[derive(Debug, Clone)]
pub struct BackendCredentials {
    pub url: String,
    pub service_key: String,
    pub table: String,
    pub timeout_secs: u64,
}

impl AppConfig {
    /// Defaults, then the optional TOML file, then the backend's
    /// conventional variables, then `CURRICULUM_*` overrides.
    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_file))
            .merge(
                Env::raw()
                    .only(&["next_public_supabase_url"])
                    .map(|_| "supabase_url".into()),
            )
            .merge(Env::raw().only(&["supabase_url", "supabase_service_role_key"]))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self> {
        // A missing .env file is normal outside development
        let _ = dotenvy::dotenv();
        Self::from_figment(Self::figment(Path::new(CONFIG_FILE)))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(AppError::ConfigurationError("table must not be empty".to_string()));
        }
        if self.diagnostic_row_limit == 0 {
            return Err(AppError::ConfigurationError(
                "diagnostic_row_limit must be > 0".to_string(),
            ));
        }
        if self.max_upload_mb == 0 {
            return Err(AppError::ConfigurationError("max_upload_mb must be > 0".to_string()));
        }
        Ok(())
    }

    /// Both backend credentials, or a configuration error naming what is missing.
    pub fn credentials(&self) -> Result<BackendCredentials> {
        let url = self
            .supabase_url
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::ConfigurationError("SUPABASE_URL is not set".to_string())
            })?;
        let service_key = self
            .supabase_service_role_key
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::ConfigurationError("SUPABASE_SERVICE_ROLE_KEY is not set".to_string())
            })?;

        Ok(BackendCredentials {
            url: url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            table: self.table.clone(),
            timeout_secs: self.request_timeout_secs,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_credentials() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config = AppConfig::from_figment(AppConfig::figment(Path::new(CONFIG_FILE)))
                .expect("defaults load");
            assert_eq!(config.table, "curriculum_outcomes");
            assert_eq!(config.port, 3001);
            assert!(matches!(
                config.credentials(),
                Err(AppError::ConfigurationError(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn test_conventional_env_and_prefixed_overrides() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("SUPABASE_URL", "https://example.supabase.co/");
            jail.set_env("SUPABASE_SERVICE_ROLE_KEY", "service-key");
            jail.set_env("CURRICULUM_PORT", "8080");
            jail.set_env("CURRICULUM_TABLE", "outcomes_v2");

            let config = AppConfig::from_figment(AppConfig::figment(Path::new(CONFIG_FILE)))
                .expect("env load");
            let credentials = config.credentials().expect("credentials present");
            assert_eq!(credentials.url, "https://example.supabase.co");
            assert_eq!(credentials.table, "outcomes_v2");
            assert_eq!(config.port, 8080);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_and_next_public_url() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                CONFIG_FILE,
                r#"
                supabase_service_role_key = "from-file"
                diagnostic_row_limit = 3
                "#,
            )?;
            jail.set_env("NEXT_PUBLIC_SUPABASE_URL", "https://public.supabase.co");

            let config = AppConfig::from_figment(AppConfig::figment(Path::new(CONFIG_FILE)))
                .expect("file load");
            assert_eq!(config.diagnostic_row_limit, 3);
            assert_eq!(
                config.credentials().expect("credentials").url,
                "https://public.supabase.co"
            );
            Ok(())
        });
    }

    #[test]
    fn test_zero_row_limit_is_configuration_error() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("CURRICULUM_DIAGNOSTIC_ROW_LIMIT", "0");
            let result = AppConfig::from_figment(AppConfig::figment(Path::new(CONFIG_FILE)));
            assert!(matches!(result, Err(AppError::ConfigurationError(_))));
            Ok(())
        });
    }
}
