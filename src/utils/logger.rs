use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("hedera_toolkit=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hedera_toolkit=info"))
    };

    // try_init: 測試中可能重複初始化
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

/// 帶應用前綴的日誌 (例如 `[Assets]`)，部署流程使用
#[derive(Debug, Clone)]
pub struct AppLogger {
    prefix: String,
}

impl AppLogger {
    pub fn new(app: &str) -> Self {
        Self {
            prefix: format!("[{}]", app),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{} ℹ️  {}", self.prefix, message);
    }

    pub fn success(&self, message: &str) {
        tracing::info!("{} ✅ {}", self.prefix, message);
    }

    pub fn warning(&self, message: &str) {
        tracing::warn!("{} ⚠️  {}", self.prefix, message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{} ❌ {}", self.prefix, message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{} 🔍 {}", self.prefix, message);
    }
}
