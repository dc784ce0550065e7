use crate::clients::gateway_client::GatewayClient;
use crate::prompt::PromptTemplate;
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub gateway: GatewaySettings,
    pub job: JobSettings,
    #[serde(default)]
    pub prompt: PromptSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
            .database(&self.database_name)
    }
}

/// Gateway credentials are optional at load time: a missing value only
/// prevents publish runs, it does not stop the server from starting.
#[derive(serde::Deserialize, Clone)]
pub struct GatewaySettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl GatewaySettings {
    pub fn client(&self) -> Result<GatewayClient, ConfigurationError> {
        let base_url = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigurationError::MissingGatewayUrl)?;
        let api_key = self
            .api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?;

        GatewayClient::new(base_url.to_string(), api_key.clone(), self.timeout())
            .map_err(ConfigurationError::HttpClient)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct JobSettings {
    pub source_label: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub interval_seconds: u64,
    #[serde(default)]
    pub run_on_startup: bool,
}

impl JobSettings {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_seconds)
    }
}

#[derive(serde::Deserialize, Clone, Default)]
pub struct PromptSettings {
    #[serde(default)]
    pub template: Option<String>,
}

impl PromptSettings {
    pub fn template(&self) -> Result<PromptTemplate, String> {
        match &self.template {
            Some(template) => PromptTemplate::parse(template.clone()),
            None => Ok(PromptTemplate::default()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("The gateway base url is not configured.")]
    MissingGatewayUrl,
    #[error("The gateway api key is not configured.")]
    MissingApiKey,
    #[error("Failed to build the gateway http client.")]
    HttpClient(#[source] reqwest::Error),
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_GATEWAY__API_KEY=secret` would set `Settings.gateway.api_key`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
