use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Frontend origin allowed by CORS.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    #[serde(default)]
    pub seed_demo_notes: bool,
    #[serde(default)]
    pub log_json: bool,

    // build
    pub app_version: Option<String>,
    #[serde(default = "default_local")]
    pub source: String,
    #[serde(default = "default_local")]
    pub git_commit: String,
    #[serde(default = "default_local")]
    pub pipeline_id: String,
    #[serde(default = "default_local")]
    pub version: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    5138
}

fn default_cors_origin() -> String {
    "http://localhost:5173".into()
}

fn default_local() -> String {
    "local".into()
}

impl Config {
    pub fn from_env() -> envy::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Self>()
    }

    #[cfg(test)]
    fn from_iter<I>(vars: I) -> envy::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            seed_demo_notes: false,
            log_json: false,
            app_version: None,
            source: default_local(),
            git_commit: default_local(),
            pipeline_id: default_local(),
            version: default_local(),
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Reads the environment once. Call at startup so bad values surface as errors.
pub fn init_config() -> envy::Result<&'static Config> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}

/// Global config. Falls back to defaults, with a warning, when read before
/// `init_config` and the environment is invalid.
pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| or_default(Config::from_env()))
}

fn or_default(loaded: envy::Result<Config>) -> Config {
    loaded.unwrap_or_else(|error| {
        tracing::warn!("invalid configuration, using defaults: {error}");
        Config::default()
    })
}

#[cfg(test)]
pub fn config_override<F>(override_config: F) -> &'static Config
where
    F: FnOnce(Config) -> Config,
{
    CONFIG.get_or_init(|| override_config(Config::default()))
}
