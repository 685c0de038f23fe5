use std::fmt;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;

/// Path of the YAML configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "./config.yaml";

/// Optional dotenv file read into the environment before the config is built.
pub const DOTENV_FILE: &str = "./.env";

/// Prefix for environment overrides, e.g. `RELAY_SPOTIFY__SCOPE`.
pub const ENV_PREFIX: &str = "RELAY_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Directory served for any path that does not match a route.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub flows: FlowsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Client credentials and upstream locations of the Spotify service.
#[derive(Deserialize, Serialize, Clone, JsonSchema)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Base of the accounts service; `/authorize` and `/api/token` hang off it.
    #[serde(default = "default_accounts_url")]
    pub accounts_url: String,
    /// Base of the Web API, including the version segment.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("accounts_url", &self.accounts_url)
            .field("api_url", &self.api_url)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Pre-registered redirect URIs, one per login flow.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FlowsConfig {
    /// Redirect URI of the browser flow (`/login` -> `/callback`).
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Redirect URI of the application flow (`/appLogin` -> `/appCallback`).
    #[serde(default = "default_app_redirect_uri")]
    pub app_redirect_uri: String,
}

impl Default for FlowsConfig {
    fn default() -> Self {
        FlowsConfig {
            redirect_uri: default_redirect_uri(),
            app_redirect_uri: default_app_redirect_uri(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct CorsConfig {
    /// Origins allowed to call the relay with credentials.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig {
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct UpstreamConfig {
    /// Timeout applied to every outbound call to Spotify.
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            timeout_in_ms: default_timeout_in_ms(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8888".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_accounts_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_scope() -> String {
    "user-read-private user-read-email playlist-read-private".to_string()
}

fn default_redirect_uri() -> String {
    "http://localhost:8888/callback/".to_string()
}

fn default_app_redirect_uri() -> String {
    "http://localhost:1234/token".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:1234".to_string()]
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

/// Builds the layered configuration source.
///
/// Later layers win: the version default, then the YAML file, then the bare
/// `CLIENT_ID`/`CLIENT_SECRET` variables, then `RELAY_`-prefixed variables
/// where `__` separates nested keys.
pub fn figment(path: &str) -> Figment {
    Figment::from(Serialized::default("version", "1.0.0"))
        .merge(Yaml::file(path))
        .merge(
            Env::raw()
                .only(&["CLIENT_ID", "CLIENT_SECRET"])
                .map(|key| {
                    if key.as_str().eq_ignore_ascii_case("CLIENT_ID") {
                        "spotify.client_id".into()
                    } else {
                        "spotify.client_secret".into()
                    }
                }),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extracts a `ConfigV1` from any figment, resolving the version tag.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Loads `KEY=value` lines from `path` into the process environment.
///
/// A missing file is fine. Variables already set in the environment win.
pub fn load_dotenv(path: &str) -> Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}

/// Load config from "config.yaml" in the current directory plus the
/// environment, after reading ".env" if there is one.
pub fn load_config() -> ConfigV1 {
    if let Err(e) = load_dotenv(DOTENV_FILE) {
        eprintln!("Error loading {}: {}", DOTENV_FILE, e);
        std::process::exit(1);
    }
    match extract_config(&figment(CONFIG_FILE)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Render the JSON schema for the configuration.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let figment = Figment::from(Serialized::default("version", "1.0.0")).merge(Yaml::string(
            r#"
spotify:
  client_id: id
  client_secret: secret
"#,
        ));

        let config = extract_config(&figment).expect("config should parse");
        assert_eq!(config.bind_address, "0.0.0.0:8888");
        assert_eq!(config.spotify.accounts_url, "https://accounts.spotify.com");
        assert_eq!(
            config.spotify.scope,
            "user-read-private user-read-email playlist-read-private"
        );
        assert_eq!(config.flows.app_redirect_uri, "http://localhost:1234/token");
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:1234"]);
        assert_eq!(config.upstream.timeout_in_ms, 10_000);
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn missing_credentials_is_an_error() {
        let figment = Figment::from(Serialized::default("version", "1.0.0"))
            .merge(Yaml::string("bind_address: 127.0.0.1:9000"));
        assert!(extract_config(&figment).is_err());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let figment = Figment::new().merge(Yaml::string(
            r#"
version: "2.0.0"
spotify:
  client_id: id
  client_secret: secret
"#,
        ));
        assert!(extract_config(&figment).is_err());
    }

    #[test]
    fn debug_output_hides_client_secret() {
        let spotify = SpotifyConfig {
            client_id: "id".to_string(),
            client_secret: "hunter2".to_string(),
            accounts_url: default_accounts_url(),
            api_url: default_api_url(),
            scope: default_scope(),
        };
        let rendered = format!("{:?}", spotify);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn schema_names_the_version_tag() {
        let schema = config_schema().expect("schema should serialize");
        assert!(schema.contains("1.0.0"));
        assert!(schema.contains("client_secret"));
    }

    #[test]
    fn dotenv_file_is_optional() {
        assert!(load_dotenv("./no-such-dir/.env").is_ok());
    }

    #[test]
    fn dotenv_file_fills_but_does_not_override_environment() {
        let path = std::env::temp_dir().join(format!("relay-{}.env", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "DOTENV_CHECK_FRESH=from-file\nDOTENV_CHECK_SET=from-file\n",
        )
        .unwrap();
        std::env::set_var("DOTENV_CHECK_SET", "from-env");

        load_dotenv(path.to_str().unwrap()).expect("dotenv should load");

        assert_eq!(std::env::var("DOTENV_CHECK_FRESH").unwrap(), "from-file");
        assert_eq!(std::env::var("DOTENV_CHECK_SET").unwrap(), "from-env");
        std::fs::remove_file(path).unwrap();
    }
}
