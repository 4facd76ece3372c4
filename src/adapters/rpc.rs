use crate::config::require_env;
use crate::domain::model::format_address;
use crate::domain::ports::{ContractDeployer, EvmRpc};
use crate::utils::error::{Result, ToolkitError};
use crate::utils::evm::{decode_address, function_selector, parse_hex_data};
use async_trait::async_trait;
use ethers::abi::{Abi, Token};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, MiddlewareError, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionReceipt, TransactionRequest, U256, U64};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_RECEIPT_ATTEMPTS: u64 = 60;

/// 從環境變數讀取 ECDSA 私鑰 (`PRIVATE_KEY`、`USER_PK`)
pub fn wallet_from_env(name: &str) -> Result<LocalWallet> {
    let key = require_env(name)?;
    key.trim()
        .parse::<LocalWallet>()
        .map_err(|e| ToolkitError::SignerError {
            name: name.to_string(),
            message: e.to_string(),
        })
}

/// JSON-RPC 的錯誤物件保留 code，其他 (連線、簽署) 只保留訊息
fn provider_error<E: MiddlewareError>(error: E) -> ToolkitError {
    match error.as_error_response() {
        Some(response) => ToolkitError::RpcError {
            code: response.code,
            message: response.message.clone(),
        },
        None => ToolkitError::ProviderError {
            message: error.to_string(),
        },
    }
}

async fn fetch_chain_id<M: Middleware>(client: &M) -> Result<u64> {
    let chain_id = client.get_chainid().await.map_err(provider_error)?;
    if chain_id > U256::from(u64::MAX) {
        return Err(ToolkitError::ProcessingError {
            message: format!("Chain ID {} out of range", chain_id),
        });
    }
    Ok(chain_id.as_u64())
}

/// Hedera JSON-RPC relay (hashio 或本地 relay) 加上本地簽署金鑰。
/// 交易以 `eth_sendRawTransaction` 送出，不使用 `eth_accounts` / `eth_sendTransaction`
pub struct RelayClient {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
    poll_interval: Duration,
    receipt_attempts: u64,
}

impl RelayClient {
    /// 先查詢 chain ID，簽章才會帶正確的 EIP-155 chain ID
    pub async fn connect(url: &str, wallet: LocalWallet) -> Result<Self> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| ToolkitError::InvalidConfigValueError {
                field: "json_rpc".to_string(),
                value: url.to_string(),
                reason: e.to_string(),
            })?
            .interval(DEFAULT_POLL_INTERVAL);

        let chain_id = fetch_chain_id(&provider).await?;
        let wallet = wallet.with_chain_id(chain_id);
        tracing::debug!(
            "🔑 Signing as {} on chain {} via {}",
            format_address(&wallet.address()),
            chain_id,
            url
        );

        Ok(Self {
            client: SignerMiddleware::new(provider, wallet),
            poll_interval: DEFAULT_POLL_INTERVAL,
            receipt_attempts: DEFAULT_RECEIPT_ATTEMPTS,
        })
    }

    pub fn with_receipt_polling(mut self, poll_interval: Duration, attempts: u64) -> Self {
        self.poll_interval = poll_interval;
        self.receipt_attempts = attempts;
        self
    }

    /// 輪詢次數加上初始延遲與 receipt 查詢
    fn receipt_budget(&self) -> Duration {
        let ticks = u32::try_from(self.receipt_attempts.saturating_add(2)).unwrap_or(u32::MAX);
        self.poll_interval.saturating_mul(ticks)
    }
}

#[async_trait]
impl EvmRpc for RelayClient {
    fn signer(&self) -> Address {
        self.client.address()
    }

    async fn chain_id(&self) -> Result<u64> {
        fetch_chain_id(&self.client).await
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.client
            .get_balance(address, None)
            .await
            .map_err(provider_error)
    }

    async fn send_transaction(&self, mut tx: TypedTransaction) -> Result<TransactionReceipt> {
        tx.set_from(self.signer());
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(provider_error)?;
        let hash = format!("{:#x}", pending.tx_hash());
        tracing::debug!("📤 Transaction sent: {}", hash);

        let pending = pending
            .interval(self.poll_interval)
            .retries(usize::try_from(self.receipt_attempts).unwrap_or(usize::MAX));
        let receipt = match tokio::time::timeout(self.receipt_budget(), pending).await {
            Ok(result) => result.map_err(provider_error)?,
            Err(_) => {
                return Err(ToolkitError::TransactionFailed {
                    hash,
                    reason: format!("no receipt after {} attempts", self.receipt_attempts),
                })
            }
        };

        let receipt = receipt.ok_or_else(|| ToolkitError::TransactionFailed {
            hash: hash.clone(),
            reason: "transaction was dropped by the relay".to_string(),
        })?;
        if receipt.status == Some(U64::zero()) {
            return Err(ToolkitError::TransactionFailed {
                hash,
                reason: "receipt status 0x0 (reverted)".to_string(),
            });
        }
        Ok(receipt)
    }

    async fn call(&self, tx: &TypedTransaction) -> Result<Bytes> {
        self.client.call(tx, None).await.map_err(provider_error)
    }
}

/// Hardhat artifact (`artifacts/**/Name.json`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub abi: Option<Abi>,
    pub bytecode: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    directory: PathBuf,
}

impl ArtifactStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn find(&self, contract: &str) -> Result<PathBuf> {
        let file_name = format!("{}.json", contract);
        find_file(&self.directory, &file_name)?.ok_or_else(|| ToolkitError::ArtifactNotFound {
            contract: contract.to_string(),
            directory: self.directory.display().to_string(),
        })
    }

    pub fn load(&self, contract: &str) -> Result<ContractArtifact> {
        let path = self.find(contract)?;
        tracing::debug!("📦 Loading artifact {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        let artifact: ContractArtifact = serde_json::from_str(&content)?;
        Ok(artifact)
    }

    /// 建構交易的 data: bytecode 接上依 ABI constructor 編碼的參數
    pub fn deployment_data(&self, contract: &str, constructor_args: &[Token]) -> Result<Bytes> {
        let artifact = self.load(contract)?;
        let bytecode = parse_hex_data(&artifact.bytecode)?;
        if bytecode.is_empty() {
            return Err(ToolkitError::ProcessingError {
                message: format!("Artifact for `{}` has no bytecode (abstract contract or interface?)", contract),
            });
        }

        match artifact.abi.as_ref().and_then(Abi::constructor) {
            Some(constructor) => constructor
                .encode_input(bytecode.to_vec(), constructor_args)
                .map(Bytes::from)
                .map_err(|e| ToolkitError::ProcessingError {
                    message: format!("Constructor arguments for `{}` do not match its ABI: {}", contract, e),
                }),
            None if constructor_args.is_empty() => Ok(bytecode),
            None => Err(ToolkitError::ProcessingError {
                message: format!(
                    "`{}` has no constructor in its ABI but {} argument(s) were given",
                    contract,
                    constructor_args.len()
                ),
            }),
        }
    }
}

fn find_file(directory: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    if !directory.is_dir() {
        return Ok(None);
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in &entries {
        if path.is_file() && path.file_name().and_then(|n| n.to_str()) == Some(file_name) {
            return Ok(Some(path.clone()));
        }
    }
    for path in entries.iter().filter(|p| p.is_dir()) {
        if let Some(found) = find_file(path, file_name)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// 以 artifact 部署合約，交易由 `EvmRpc` 簽署送出
pub struct RpcDeployer<R: EvmRpc> {
    rpc: R,
    artifacts: ArtifactStore,
}

impl<R: EvmRpc> RpcDeployer<R> {
    pub fn new(rpc: R, artifacts: ArtifactStore) -> Self {
        Self { rpc, artifacts }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }
}

#[async_trait]
impl<R: EvmRpc> ContractDeployer for RpcDeployer<R> {
    fn signer(&self) -> Address {
        self.rpc.signer()
    }

    async fn chain_id(&self) -> Result<u64> {
        self.rpc.chain_id().await
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.rpc.balance(address).await
    }

    async fn deploy(
        &self,
        contract: &str,
        constructor_args: &[Token],
        value: U256,
        gas: Option<u64>,
    ) -> Result<Address> {
        let data = self.artifacts.deployment_data(contract, constructor_args)?;
        let mut tx = TransactionRequest::new().data(data).value(value);
        if let Some(gas) = gas {
            tx = tx.gas(gas);
        }

        let receipt = self.rpc.send_transaction(tx.into()).await?;
        receipt
            .contract_address
            .ok_or_else(|| ToolkitError::TransactionFailed {
                hash: format!("{:#x}", receipt.transaction_hash),
                reason: format!("receipt for {} deployment has no contract address", contract),
            })
    }

    async fn call_address(&self, contract: Address, signature: &str) -> Result<Address> {
        let tx = TransactionRequest::new()
            .to(contract)
            .data(function_selector(signature).to_vec());
        let output = self.rpc.call(&tx.into()).await?;
        decode_address(&output)
    }
}
