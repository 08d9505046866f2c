use std::{net::SocketAddr, path::PathBuf};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:443";
pub const DEFAULT_JOTFORM_URL: &str = "https://api.jotform.com";
pub const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com";
pub const DEFAULT_TELEGRAM_URL: &str = "https://api.telegram.org";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set!")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Всё, что читается из окружения, — один раз при старте.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub jotform_form_id: String,
    pub jotform_api_key: String,
    pub omdb_api_key: String,

    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,

    pub jotform_url: String,
    pub omdb_url: String,
    pub telegram_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // пустая строка = не задано
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let telegram_token = required("TELEGRAM_TOKEN")?;
        let jotform_api_key = required("JOTFORM_API_KEY")?;
        let jotform_form_id = required("JOTFORM_FORM_ID")?;
        let omdb_api_key = required("OMDB_API_KEY")?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid { name: "BIND_ADDR", reason: e.to_string() })?;

        let plaintext =
            get("DISABLE_TLS").is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));
        let tls = if plaintext {
            None
        } else {
            Some(TlsPaths {
                cert: path_or_default(get("CERT_FILE_PATH"), "cert.pem"),
                key: path_or_default(get("KEY_FILE_PATH"), "key.pem"),
            })
        };

        Ok(Self {
            telegram_token,
            jotform_form_id,
            jotform_api_key,
            omdb_api_key,
            bind_addr,
            tls,
            jotform_url: base_url(get("JOTFORM_API_URL"), DEFAULT_JOTFORM_URL),
            omdb_url: base_url(get("OMDB_API_URL"), DEFAULT_OMDB_URL),
            telegram_url: base_url(get("TELEGRAM_API_URL"), DEFAULT_TELEGRAM_URL),
        })
    }
}

/// Относительный путь раскрываем от текущего каталога; если не вышло — оставляем как есть.
fn path_or_default(value: Option<String>, default: &str) -> PathBuf {
    let path = PathBuf::from(value.unwrap_or_else(|| default.to_string()));
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "can't resolve working directory");
            path
        }
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string()).trim_end_matches('/').to_string()
}
