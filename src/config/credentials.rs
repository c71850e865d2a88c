use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::auth::credentials::Credentials;

/// Credentials block of the config file.
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    pub consumer_token: SecretValue,
    pub employee_token: SecretValue,
    /// accountant acting on behalf of this client
    pub client_id: Option<i64>,
}

/// Secret value sources
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SecretValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

impl SecretValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            SecretValue::Literal { value } => Ok(value.to_owned()),
            SecretValue::FromEnv { from_env } => {
                env::var(from_env).map_err(|err| anyhow!("env '{}': {}", from_env, err))
            }
            SecretValue::FromFile { path } => fs::read_to_string(path)
                .map(|res| res.trim().to_string())
                .with_context(|| format!("reading secret from '{}'", path)),
        }
    }
}

impl CredentialsConfig {
    pub fn resolve(&self) -> Result<Credentials> {
        let consumer_token = self.consumer_token.resolve().context("consumer_token")?;
        let employee_token = self.employee_token.resolve().context("employee_token")?;
        if consumer_token.is_empty() || employee_token.is_empty() {
            return Err(anyhow!("consumer_token and employee_token must not be empty"));
        }

        let credentials = Credentials::new(consumer_token, employee_token);
        Ok(match self.client_id {
            Some(client_id) => credentials.with_accountant_client(client_id),
            None => credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn resolves_every_source_kind() {
        let mut secret_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(secret_file, "  employee-from-file  ").unwrap();

        env::set_var("TRIPLETEX_TEST_CONSUMER", "consumer-from-env");
        let yaml = format!(
            "consumer_token: {{ from_env: TRIPLETEX_TEST_CONSUMER }}\nemployee_token: {{ path: '{}' }}\nclient_id: 42\n",
            secret_file.path().display()
        );
        let config: CredentialsConfig = serde_yaml::from_str(&yaml).unwrap();
        let credentials = config.resolve().unwrap();
        env::remove_var("TRIPLETEX_TEST_CONSUMER");

        assert_eq!(credentials.consumer_token(), "consumer-from-env");
        assert_eq!(credentials.employee_token(), "employee-from-file");
        assert_eq!(credentials.client_id(), Some(42));
    }

    #[test]
    #[serial]
    fn missing_env_is_an_error() {
        env::remove_var("TRIPLETEX_TEST_MISSING");
        let config: CredentialsConfig = serde_yaml::from_str(
            "consumer_token: { from_env: TRIPLETEX_TEST_MISSING }\nemployee_token: { value: e }\n",
        )
        .unwrap();
        let err = config.resolve().unwrap_err();
        assert!(format!("{:#}", err).contains("TRIPLETEX_TEST_MISSING"));
    }

    #[test]
    fn empty_literal_is_rejected() {
        let config: CredentialsConfig = serde_yaml::from_str(
            "consumer_token: { value: '' }\nemployee_token: { value: e }\n",
        )
        .unwrap();
        assert!(config.resolve().is_err());
    }
}
