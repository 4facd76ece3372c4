use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to fetch data from Mirror Node ({status} {reason}): {body}")]
    MirrorNodeError {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Unexpected Mirror Node response from {url}: {message}")]
    MirrorNodeResponseError { url: String, message: String },

    #[error("JSON-RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("JSON-RPC provider error: {message}")]
    ProviderError { message: String },

    #[error("Invalid signing key in `{name}`: {message}")]
    SignerError { name: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Missing `{name}` environment variable")]
    MissingEnvError { name: String },

    #[error("Invalid {kind}: {value}")]
    InvalidIdentifierError { kind: String, value: String },

    #[error("Deployment file not found: {path}")]
    DeploymentNotFound { path: String },

    #[error("{message}")]
    PrerequisiteMissing { message: String, hint: String },

    #[error("Artifact for contract `{contract}` not found under {directory}")]
    ArtifactNotFound { contract: String, directory: String },

    #[error("Compilation failed with {} error(s)", errors.len())]
    CompilationError { errors: Vec<String> },

    #[error("Transaction {hash} failed: {reason}")]
    TransactionFailed { hash: String, reason: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("{message}")]
    NoDataError { message: String },

    #[error("{feature} is not implemented: {hint}")]
    NotImplemented { feature: String, hint: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Chain,
    Compiler,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ToolkitError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ToolkitError::HttpError(_)
            | ToolkitError::MirrorNodeError { .. }
            | ToolkitError::MirrorNodeResponseError { .. } => ErrorCategory::Network,
            ToolkitError::ConfigError { .. }
            | ToolkitError::ConfigValidationError { .. }
            | ToolkitError::InvalidConfigValueError { .. }
            | ToolkitError::MissingConfigError { .. }
            | ToolkitError::MissingEnvError { .. }
            | ToolkitError::SignerError { .. }
            | ToolkitError::NotImplemented { .. } => ErrorCategory::Configuration,
            ToolkitError::SerializationError(_)
            | ToolkitError::InvalidIdentifierError { .. }
            | ToolkitError::DeploymentNotFound { .. }
            | ToolkitError::PrerequisiteMissing { .. }
            | ToolkitError::ArtifactNotFound { .. }
            | ToolkitError::ProcessingError { .. }
            | ToolkitError::NoDataError { .. } => ErrorCategory::Data,
            ToolkitError::RpcError { .. }
            | ToolkitError::ProviderError { .. }
            | ToolkitError::TransactionFailed { .. } => ErrorCategory::Chain,
            ToolkitError::CompilationError { .. } => ErrorCategory::Compiler,
            ToolkitError::IoError(_) => ErrorCategory::System,
        }
    }

    /// 應用層錯誤為 Medium，其他處理錯誤為 High，系統錯誤為 Critical
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ToolkitError::MirrorNodeError { .. }
            | ToolkitError::ConfigError { .. }
            | ToolkitError::ConfigValidationError { .. }
            | ToolkitError::InvalidConfigValueError { .. }
            | ToolkitError::MissingConfigError { .. }
            | ToolkitError::MissingEnvError { .. }
            | ToolkitError::SignerError { .. }
            | ToolkitError::InvalidIdentifierError { .. }
            | ToolkitError::DeploymentNotFound { .. }
            | ToolkitError::PrerequisiteMissing { .. }
            | ToolkitError::NoDataError { .. }
            | ToolkitError::NotImplemented { .. } => ErrorSeverity::Medium,
            ToolkitError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ToolkitError::HttpError(e) if e.is_connect() => {
                "無法連線到遠端服務，請確認網路與節點位址".to_string()
            }
            ToolkitError::HttpError(e) if e.is_timeout() => "請求逾時".to_string(),
            ToolkitError::MirrorNodeError { status, .. } => {
                format!("Mirror Node 回應狀態 {}: {}", status, self)
            }
            ToolkitError::CompilationError { errors } => {
                let mut message = self.to_string();
                for error in errors {
                    message.push('\n');
                    message.push_str(error);
                }
                message
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ToolkitError::HttpError(_) => "檢查網路連線以及 mirror node / JSON-RPC 位址".to_string(),
            ToolkitError::MirrorNodeError { status: 404, .. } => {
                "確認帳戶、合約或代幣 ID 是否存在於所選網路".to_string()
            }
            ToolkitError::MirrorNodeError { .. } | ToolkitError::MirrorNodeResponseError { .. } => {
                "確認 --network 指向正確的 mirror node".to_string()
            }
            ToolkitError::RpcError { .. } | ToolkitError::ProviderError { .. } => {
                "確認 JSON-RPC relay 可用，且簽署帳戶有足夠的 HBAR".to_string()
            }
            ToolkitError::SignerError { name, .. } => {
                format!("在 {} 設定 ECDSA 私鑰 (64 位十六進位，可加 0x)", name)
            }
            ToolkitError::MissingEnvError { name } => {
                format!("在環境變數或 .env 檔中設定 {}", name)
            }
            ToolkitError::ConfigError { .. }
            | ToolkitError::ConfigValidationError { .. }
            | ToolkitError::InvalidConfigValueError { .. }
            | ToolkitError::MissingConfigError { .. } => {
                "檢查命令列參數與 hedera-toolkit.toml".to_string()
            }
            ToolkitError::InvalidIdentifierError { kind, .. } => {
                format!("提供有效的 {}", kind)
            }
            ToolkitError::DeploymentNotFound { .. } => {
                "先執行前置部署步驟 (例如 `hedera-toolkit deploy assets`)".to_string()
            }
            ToolkitError::ArtifactNotFound { .. } => {
                "先編譯合約並確認 artifacts 目錄設定正確".to_string()
            }
            ToolkitError::CompilationError { .. } => "修正 Yul 原始碼中的錯誤後重試".to_string(),
            ToolkitError::TransactionFailed { .. } => {
                "在 explorer 檢查交易內容與 gas 設定".to_string()
            }
            ToolkitError::NotImplemented { hint, .. }
            | ToolkitError::PrerequisiteMissing { hint, .. } => hint.clone(),
            ToolkitError::NoDataError { .. } => "確認合約地址與 --network 是否正確".to_string(),
            ToolkitError::IoError(_) => "檢查檔案權限與磁碟空間".to_string(),
            ToolkitError::SerializationError(_) | ToolkitError::ProcessingError { .. } => {
                "使用 --verbose 取得更多細節".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolkitError>;
