use crate::utils::error::Result;
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionReceipt, U256};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
    /// 供日誌使用的完整路徑
    fn describe(&self, path: &str) -> String;
}

/// EVM JSON-RPC relay。交易在本地簽署後才送出，relay 不持有任何帳戶
#[async_trait]
pub trait EvmRpc: Send + Sync {
    /// 本地簽署金鑰對應的地址
    fn signer(&self) -> Address;
    async fn chain_id(&self) -> Result<u64>;
    async fn balance(&self, address: Address) -> Result<U256>;
    /// 簽署、送出並等待 receipt；失敗的交易回傳 `TransactionFailed`
    async fn send_transaction(&self, tx: TypedTransaction) -> Result<TransactionReceipt>;
    async fn call(&self, tx: &TypedTransaction) -> Result<Bytes>;
}

/// 部署合約用的抽象，部署流程只依賴此 trait
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    fn signer(&self) -> Address;
    async fn chain_id(&self) -> Result<u64>;
    async fn balance(&self, address: Address) -> Result<U256>;
    async fn deploy(
        &self,
        contract: &str,
        constructor_args: &[Token],
        value: U256,
        gas: Option<u64>,
    ) -> Result<Address>;
    /// 呼叫無參數且回傳 address 的 view 函式，例如 `token()`
    async fn call_address(&self, contract: Address, signature: &str) -> Result<Address>;
}
