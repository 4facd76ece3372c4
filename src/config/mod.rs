pub mod toml_config;

pub use toml_config::{NetworkConfig, ToolkitConfig};

use crate::utils::error::{Result, ToolkitError};

#[cfg(feature = "cli")]
pub mod cli;

/// 載入 `.env`，檔案不存在時忽略
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

pub fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ToolkitError::MissingEnvError {
            name: name.to_string(),
        }),
    }
}
