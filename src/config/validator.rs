//! Configuration validation with aggregated errors.
//! - every issue is collected into one Vec<String> instead of failing on the first
//! - covers base url, retry, logging and refresh margin invariants

use crate::config::loader::ServiceConfig;
use crate::config::settings::{RetryConfig, Settings};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_settings(settings: &Settings, errors: &mut Vec<String>) {
    let base_url = settings.base_url.trim();
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        errors.push(format!(
            "settings.base_url '{}' must start with http:// or https://",
            settings.base_url
        ));
    }

    if let Some(retry) = &settings.retry {
        validate_retry("settings.retry", retry, errors);
    }

    if let Some(timeout_ms) = settings.timeout_ms {
        if timeout_ms == 0 {
            errors.push("settings.timeout_ms must be > 0".to_string());
        }
    }

    // capped at one year
    if let Some(margin) = settings.refresh_margin_seconds {
        if margin > 60 * 60 * 24 * 365 {
            errors.push(format!(
                "settings.refresh_margin_seconds ({}) is unreasonably large",
                margin
            ));
        }
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_retry(path: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if let Some(attempts) = retry.attempts {
        if attempts == 0 {
            errors.push(format!("{}.attempts must be > 0", path));
        }
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "{}.max_delay_ms ({}) must be >= base_delay_ms ({})",
                path, max, base
            ));
        }
    }
}
