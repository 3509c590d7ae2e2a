use chrono_tz::Tz;
use clap::Args;
use engine::Currency;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/tally.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub api_key: String,
    pub access_token: String,
    pub user_id: String,
    pub currency: String,
    pub timezone: String,
    pub output_dir: String,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            api_key: String::new(),
            access_token: String::new(),
            user_id: String::new(),
            currency: "BRL".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            output_dir: ".".to_string(),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn currency(&self) -> Result<Currency> {
        Currency::try_from(self.currency.as_str())
            .map_err(|err| AppError::Settings(format!("currency: {err}")))
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| AppError::Settings(format!("timezone {:?}: {err}", self.timezone)))
    }
}

/// Config overrides accepted on the command line. Secrets (`api_key`,
/// `access_token`) only come from the file or the environment.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:54321).
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override the user id queries are scoped to.
    #[arg(long, global = true)]
    user_id: Option<String>,
    /// Override display currency (BRL, EUR, USD).
    #[arg(long, global = true)]
    currency: Option<String>,
    /// Override timezone (IANA name) used for the current month.
    #[arg(long, global = true)]
    timezone: Option<String>,
    /// Override the directory exports are written to.
    #[arg(long, global = true)]
    output_dir: Option<String>,
}

pub fn load(args: &ConfigArgs) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("TALLY"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(user_id) = &args.user_id {
        settings.user_id = user_id.clone();
    }
    if let Some(currency) = &args.currency {
        settings.currency = currency.clone();
    }
    if let Some(timezone) = &args.timezone {
        settings.timezone = timezone.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        settings.output_dir = output_dir.clone();
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve() {
        let config = AppConfig::default();
        assert_eq!(config.currency().unwrap(), Currency::Brl);
        assert_eq!(config.timezone().unwrap(), chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn bad_values_are_setting_errors() {
        let config = AppConfig {
            currency: "XYZ".to_string(),
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.currency(), Err(AppError::Settings(_))));
        assert!(matches!(config.timezone(), Err(AppError::Settings(_))));
    }
}
