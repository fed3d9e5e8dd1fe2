use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use speechact_classifier::ModelConfig;
use speechact_core::DEFAULT_MODEL_NAME;

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    pub model: ModelConfig,
    pub allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            model: ModelConfig::default(),
            allowed_origins: parse_allowed_origins(None),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let bind_raw = env::var("SPEECHACT_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid SPEECHACT_BIND address: {bind_raw}"))?;

        let model_name = env::var("SPEECHACT_MODEL_NAME")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string());
        let model_dir = env::var("SPEECHACT_MODEL_DIR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind,
            model: ModelConfig {
                model_name,
                model_dir,
            },
            allowed_origins: parse_allowed_origins(
                env::var("SPEECHACT_ALLOWED_ORIGINS").ok().as_deref(),
            ),
        })
    }
}

fn parse_allowed_origins(raw: Option<&str>) -> Vec<String> {
    let parsed = raw
        .map(|value| {
            value
                .split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if parsed.is_empty() {
        DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|origin| origin.to_string())
            .collect()
    } else {
        parsed
    }
}
