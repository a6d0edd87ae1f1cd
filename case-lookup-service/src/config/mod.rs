use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_ALLOWED_ORIGINS: &str =
    "https://cyber-frontend-jade.vercel.app,https://cyber-frontend-jade.vercel.app/";

const DEFAULT_SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub credentials: ServiceAccountConfig,
    pub sheets: SheetsApiConfig,
    pub security: SecurityConfig,
}

/// Google service-account key fields, one environment variable each.
#[derive(Debug, Clone)]
pub struct ServiceAccountConfig {
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: Secret<String>,
    pub client_email: String,
    pub client_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub client_x509_cert_url: String,
}

#[derive(Debug, Clone)]
pub struct SheetsApiConfig {
    pub api_base_url: String,
    /// Upper bound for each outbound call (token exchange and Sheets API).
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl LookupConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Missing required keys fail here,
    /// at startup, rather than on the first spreadsheet request.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default);

        Ok(LookupConfig {
            common,
            service_name: get("SERVICE_NAME", Some("case-lookup-service"))?,
            service_version: get("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")))?,
            log_level: get("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|s| !s.trim().is_empty()),
            credentials: ServiceAccountConfig {
                project_id: get("PROJECT_ID", None)?,
                private_key_id: get("PRIVATE_KEY_ID", None)?,
                private_key: Secret::new(unescape_newlines(&get("PRIVATE_KEY", None)?)),
                client_email: get("CLIENT_EMAIL", None)?,
                client_id: get("CLIENT_ID", None)?,
                auth_uri: get("AUTH_URI", None)?,
                token_uri: get("TOKEN_URI", None)?,
                auth_provider_x509_cert_url: get("AUTH_PROVIDER_X509_CERT_URL", None)?,
                client_x509_cert_url: get("CLIENT_X509_CERT_URL", None)?,
            },
            sheets: SheetsApiConfig {
                api_base_url: get("SHEETS_API_BASE_URL", Some(DEFAULT_SHEETS_API_BASE_URL))?
                    .trim_end_matches('/')
                    .to_string(),
                request_timeout_secs: parse_timeout(&get(
                    "SHEETS_REQUEST_TIMEOUT_SECS",
                    Some(DEFAULT_REQUEST_TIMEOUT_SECS.to_string().as_str()),
                )?)?,
            },
            security: SecurityConfig {
                allowed_origins: get("ALLOWED_ORIGINS", Some(DEFAULT_ALLOWED_ORIGINS))?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
        })
    }
}

/// Private keys pasted into `.env` files usually carry literal `\n` sequences.
fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}

/// A zero timeout would fail every outbound call, so it is rejected with the rest of the config.
fn parse_timeout(value: &str) -> Result<u64, AppError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(anyhow::anyhow!(
            "SHEETS_REQUEST_TIMEOUT_SECS must be greater than zero"
        ))),
        Ok(secs) => Ok(secs),
        Err(e) => Err(AppError::ConfigError(anyhow::anyhow!(
            "SHEETS_REQUEST_TIMEOUT_SECS is not a number: {}",
            e
        ))),
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.is_empty()) {
        Some(val) => Ok(val),
        None => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}
