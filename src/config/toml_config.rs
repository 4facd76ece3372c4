use crate::utils::error::{Result, ToolkitError};
use crate::utils::validation::{
    required, validate_at_least, validate_chain_id, validate_contract_ref, validate_endpoint,
    validate_entity_id, validate_network_name, validate_path, validate_program, PathKind, Validate,
    INTRINSIC_GAS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "hedera-toolkit.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolkitConfig {
    #[serde(default = "builtin_networks")]
    pub networks: BTreeMap<String, NetworkConfig>,
    #[serde(default)]
    pub deployments: DeploymentsConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub hbarx: HbarxConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub mirror_node: String,
    pub json_rpc: Option<String>,
    pub chain_id: Option<u64>,
    pub explorer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentsConfig {
    pub directory: String,
}

impl Default for DeploymentsConfig {
    fn default() -> Self {
        Self {
            directory: "./deployments".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    pub directory: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            directory: "./artifacts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    pub solc: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            solc: "solc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub receipt_poll_interval_ms: u64,
    pub receipt_attempts: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            receipt_poll_interval_ms: 1_000,
            receipt_attempts: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HbarxConfig {
    pub token_id: String,
    /// 合約 ID (`0.0.x`) 或 EVM 地址
    pub staking_contract: String,
    pub undelegation_contract: String,
    pub gas: u64,
}

impl Default for HbarxConfig {
    fn default() -> Self {
        Self {
            token_id: "0.0.834116".to_string(),
            staking_contract: "0.0.1060".to_string(),
            undelegation_contract: "0.0.1027587".to_string(),
            gas: 2_000_000,
        }
    }
}

fn network(mirror_node: &str, json_rpc: &str, chain_id: u64, explorer: &str) -> NetworkConfig {
    NetworkConfig {
        mirror_node: mirror_node.to_string(),
        json_rpc: Some(json_rpc.to_string()),
        chain_id: Some(chain_id),
        explorer: Some(explorer.to_string()),
    }
}

pub fn builtin_networks() -> BTreeMap<String, NetworkConfig> {
    BTreeMap::from([
        (
            "mainnet".to_string(),
            network(
                "https://mainnet.mirrornode.hedera.com",
                "https://mainnet.hashio.io/api",
                295,
                "https://hashscan.io/mainnet",
            ),
        ),
        (
            "testnet".to_string(),
            network(
                "https://testnet.mirrornode.hedera.com",
                "https://testnet.hashio.io/api",
                296,
                "https://hashscan.io/testnet",
            ),
        ),
        (
            "previewnet".to_string(),
            network(
                "https://previewnet.mirrornode.hedera.com",
                "https://previewnet.hashio.io/api",
                297,
                "https://hashscan.io/previewnet",
            ),
        ),
        (
            "solo".to_string(),
            network(
                "http://localhost:8081",
                "http://localhost:7546",
                298,
                "http://localhost:8080/localnet",
            ),
        ),
        (
            "local".to_string(),
            network(
                "http://localhost:5551",
                "http://localhost:7546",
                298,
                "http://localhost:8080/localnet",
            ),
        ),
    ])
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            networks: builtin_networks(),
            deployments: DeploymentsConfig::default(),
            artifacts: ArtifactsConfig::default(),
            compiler: CompilerConfig::default(),
            rpc: RpcConfig::default(),
            hbarx: HbarxConfig::default(),
        }
    }
}

impl ToolkitConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ToolkitError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 指定路徑時檔案必須存在；否則預設檔案不存在就使用內建設定
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// 從 TOML 字串解析配置，檔案中的網路會覆蓋同名的內建網路
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| ToolkitError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        let mut networks = builtin_networks();
        networks.append(&mut config.networks);
        config.networks = networks;

        Ok(config)
    }

    /// 替換環境變數 (例如 ${MIRROR_NODE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ToolkitError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn network(&self, name: &str) -> Result<&NetworkConfig> {
        self.networks
            .get(name)
            .ok_or_else(|| ToolkitError::InvalidConfigValueError {
                field: "network".to_string(),
                value: name.to_string(),
                reason: format!(
                    "Unknown network. Known networks: {}",
                    self.networks.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            })
    }

    /// 已知的網路名稱解析為其 mirror node，其他值直接視為 mirror node URL
    pub fn resolve_mirror_node(&self, network: &str) -> Result<String> {
        if let Some(config) = self.networks.get(network) {
            return Ok(config.mirror_node.clone());
        }
        validate_endpoint("network", network)?;
        Ok(network.trim_end_matches('/').to_string())
    }

    pub fn json_rpc_url(&self, network: &str) -> Result<String> {
        let config = self.network(network)?;
        required(&format!("networks.{}.json_rpc", network), &config.json_rpc).cloned()
    }

    /// 交易在 explorer 上的連結
    pub fn explorer_transaction_url(&self, network: &str, transaction: &str) -> Option<String> {
        self.networks
            .get(network)
            .and_then(|config| config.explorer.as_deref())
            .map(|explorer| format!("{}/transaction/{}", explorer.trim_end_matches('/'), transaction))
    }

    pub fn validate_config(&self) -> Result<()> {
        for (name, network) in &self.networks {
            validate_network_name("networks", name)?;
            validate_endpoint(&format!("networks.{}.mirror_node", name), &network.mirror_node)?;
            if let Some(json_rpc) = &network.json_rpc {
                validate_endpoint(&format!("networks.{}.json_rpc", name), json_rpc)?;
            }
            if let Some(explorer) = &network.explorer {
                validate_endpoint(&format!("networks.{}.explorer", name), explorer)?;
            }
            if let Some(chain_id) = network.chain_id {
                validate_chain_id(&format!("networks.{}.chain_id", name), chain_id)?;
            }
        }

        validate_path("deployments.directory", &self.deployments.directory, PathKind::Directory)?;
        validate_path("artifacts.directory", &self.artifacts.directory, PathKind::Directory)?;
        validate_program("compiler.solc", &self.compiler.solc)?;
        validate_at_least("rpc.receipt_attempts", self.rpc.receipt_attempts, 1)?;
        validate_at_least("hbarx.gas", self.hbarx.gas, INTRINSIC_GAS)?;
        validate_entity_id("hbarx.token_id", &self.hbarx.token_id)?;
        validate_contract_ref("hbarx.staking_contract", &self.hbarx.staking_contract)?;
        validate_contract_ref("hbarx.undelegation_contract", &self.hbarx.undelegation_contract)?;

        Ok(())
    }
}

impl Validate for ToolkitConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
