use std::path::Path;
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::credentials::CredentialsConfig;
use crate::config::settings::{LogFormat, LoggingConfig, Settings};
use crate::config::validator::validate_service_config;

/// ================================
/// Full config file
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: Settings,
    pub credentials: CredentialsConfig,
}

/// Load and validate config from a YAML file
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config '{}'", path.display()))?;
    parse_config(&expand_env_vars(&content))
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }

    debug!("validation config ...");
    validate_service_config(&service_config)
        .map_err(|errors| anyhow!("config is not valid: {}", errors.join("; ")))?;

    Ok(service_config)
}

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("valid placeholder pattern"));

/// Replaces `${VAR}` and `${VAR:default}` with environment values.
fn expand_env_vars(input: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(input, |caps: &Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .into_owned()
}
