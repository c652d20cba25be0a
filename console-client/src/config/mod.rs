use std::path::PathBuf;

use serde::Deserialize;

use console_core::error::ClientError;

/// Client settings, loadable from an optional `configuration` file plus
/// `APP_`-prefixed environment variables (`APP_API__BASE_URL`, ...).
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub frontend: FrontendSettings,
    #[serde(default)]
    pub routes: Routes,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Backend API base URL, without a trailing slash.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FrontendSettings {
    /// Where this client is served from; the backend redirects OAuth
    /// callbacks here.
    #[serde(default = "default_frontend_base_url")]
    pub base_url: String,
}

/// App routes the client navigates to on its own.
#[derive(Debug, Deserialize, Clone)]
pub struct Routes {
    #[serde(default = "default_login_route")]
    pub login: String,
    #[serde(default = "default_dashboard_route")]
    pub dashboard: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Namespace prefixed onto the persisted session document.
    #[serde(default = "default_storage_namespace")]
    pub namespace: String,
    /// Directory for the persisted session document. `None` keeps the
    /// session in memory only.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_frontend_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_dashboard_route() -> String {
    "/".to_string()
}

fn default_storage_namespace() -> String {
    "admin".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
        }
    }
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            base_url: default_frontend_base_url(),
        }
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: default_login_route(),
            dashboard: default_dashboard_route(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            namespace: default_storage_namespace(),
            path: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            frontend: FrontendSettings::default(),
            routes: Routes::default(),
            storage: StorageSettings::default(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
