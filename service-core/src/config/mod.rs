use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Settings every service binds with: where to listen.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Reads `configuration.*` (optional) and `APP__*` environment overrides, after `.env`.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_without_overrides() {
        unsafe {
            std::env::remove_var("APP__PORT");
            std::env::remove_var("APP__HOST");
        }
        let config = Config::load().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    #[serial]
    fn environment_overrides_port() {
        unsafe {
            std::env::set_var("APP__PORT", "9191");
        }
        let config = Config::load().unwrap();
        unsafe {
            std::env::remove_var("APP__PORT");
        }
        assert_eq!(config.port, 9191);
    }
}
