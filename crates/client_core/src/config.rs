use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "traveller.toml";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid server url '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("server url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("invalid request timeout '{0}'")]
    InvalidTimeout(String),
    #[error("unknown layout '{0}' (expected 'full' or 'compact')")]
    InvalidLayout(String),
    #[error("unknown page element '{0}'")]
    UnknownElement(String),
}

/// Which page variant to bind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Full,
    Compact,
}

impl FromStr for Layout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Layout::Full),
            "compact" => Ok(Layout::Compact),
            _ => Err(ConfigError::InvalidLayout(s.to_string())),
        }
    }
}

/// Behavior switches that differed between earlier page scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Re-fetch every snapshot after a reveal instead of patching the
    /// character mirror from the reveal response.
    pub refresh_after_reveal: bool,
    /// Render the roll-by-roll outcome log.
    pub outcome_log: bool,
    /// Ask the server for the skill breakdown on each refresh.
    pub term_skills: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            refresh_after_reveal: true,
            outcome_log: true,
            term_skills: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub server_url: Url,
    pub request_timeout: Duration,
    pub layout: Layout,
    /// Explicit element ids to bind; overrides `layout` when present.
    pub bindings: Option<Vec<String>>,
    pub features: Features,
}

impl ClientSettings {
    /// Built-in settings: the local development server and every feature on.
    pub fn local() -> Result<Self, ConfigError> {
        Ok(Self {
            server_url: parse_server_url(DEFAULT_SERVER_URL)?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            layout: Layout::Full,
            bindings: None,
            features: Features::default(),
        })
    }

    pub fn with_server_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.server_url = parse_server_url(raw)?;
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
    layout: Option<Layout>,
    bindings: Option<Vec<String>>,
    features: Option<Features>,
}

/// Defaults, then `path` (or `traveller.toml` if present), then environment.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings, ConfigError> {
    load_settings_with(path, &read_non_empty_env_var)
}

pub fn load_settings_with(
    path: Option<&Path>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ConfigError> {
    let mut settings = ClientSettings::local()?;

    if let Some(file_cfg) = read_settings_file(path)? {
        if let Some(v) = file_cfg.server_url {
            settings.server_url = parse_server_url(&v)?;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            settings.request_timeout = timeout_from_secs(v)?;
        }
        if let Some(v) = file_cfg.layout {
            settings.layout = v;
        }
        if let Some(v) = file_cfg.bindings {
            settings.bindings = Some(v);
        }
        if let Some(v) = file_cfg.features {
            settings.features = v;
        }
    }

    if let Some(v) = env("TRAVELLER_SERVER_URL") {
        settings.server_url = parse_server_url(&v)?;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = parse_server_url(&v)?;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        let secs = v
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout(v.clone()))?;
        settings.request_timeout = timeout_from_secs(secs)?;
    }
    if let Some(v) = env("APP__LAYOUT") {
        settings.layout = v.parse()?;
    }

    Ok(settings)
}

fn read_settings_file(path: Option<&Path>) -> Result<Option<FileSettings>, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if !required && err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    toml::from_str::<FileSettings>(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Parse { path, source })
}

fn read_non_empty_env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn timeout_from_secs(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidTimeout(secs.to_string()));
    }
    Ok(Duration::from_secs(secs))
}

pub fn parse_server_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let mut url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        value: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
