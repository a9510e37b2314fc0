//! Environment-driven configuration, one `from_env` per concern.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidVar(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Association REST backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            env::var("AGC_BACKEND_URL").map_err(|_| ConfigError::MissingVar("AGC_BACKEND_URL"))?;
        Ok(Self { base_url })
    }
}

/// Content store (Cloudinary-style upload API).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub api_base: String,
    pub upload_timeout: Duration,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: var_or("AGC_STORE_API_BASE", "https://api.cloudinary.com/v1_1"),
            upload_timeout: Duration::from_secs(parse_var("AGC_UPLOAD_TIMEOUT_SECS", 30u64)?),
        })
    }
}

/// External QR rendering service.
#[derive(Debug, Clone)]
pub struct QrConfig {
    pub endpoint: String,
}

impl QrConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: var_or(
                "AGC_QR_ENDPOINT",
                "https://api.qrserver.com/v1/create-qr-code/",
            ),
        }
    }
}

/// Off-screen rendering surface and its markup engine.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    pub engine_binary: String,
    /// Extra settle margin before capture; zero for engines with an
    /// explicit completion signal.
    pub settle: Duration,
}

impl SurfaceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            engine_binary: var_or("AGC_RENDER_BIN", "typst"),
            settle: Duration::from_millis(parse_var("AGC_RENDER_SETTLE_MS", 0u64)?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub store: StoreConfig,
    pub qr: QrConfig,
    pub surface: SurfaceConfig,
    pub association_name: String,
    pub logo_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(Self {
            backend: BackendConfig::from_env()?,
            store: StoreConfig::from_env()?,
            qr: QrConfig::from_env(),
            surface: SurfaceConfig::from_env()?,
            association_name: var_or("AGC_ASSOCIATION_NAME", "Association Générale Consulaire"),
            logo_url: env::var("AGC_LOGO_URL").ok(),
        })
    }
}
