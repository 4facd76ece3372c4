use crate::core::deployments::DeploymentStore;
use crate::domain::model::{format_address, parse_address, DeploymentRecord};
use crate::domain::ports::{ContractDeployer, Storage};
use crate::utils::error::{Result, ToolkitError};
use crate::utils::evm::{format_units, parse_units, WEIBAR_DECIMALS};
use crate::utils::logger::AppLogger;
use ethers::abi::Token;
use ethers::types::{Address, U256};
use std::collections::BTreeMap;

/// WHBAR 建構時需附帶的 HBAR 數量 (建立 HTS token 的費用)
pub const WHBAR_DEPLOY_VALUE_HBAR: u64 = 30;
pub const WHBAR_DEPLOY_GAS: u64 = 8_000_000;

pub const ASSETS_APP: &str = "Assets";
pub const ASSETS_VERSION: &str = "assets";
pub const SAUCERSWAP_APP: &str = "SaucerSwap";

/// 部署流程共用的部分: 應用名稱、日誌、部署紀錄
struct DeploymentContext<'a, D: ContractDeployer, S: Storage> {
    deployer: &'a D,
    store: &'a DeploymentStore<S>,
    network: String,
    logger: AppLogger,
}

impl<'a, D: ContractDeployer, S: Storage> DeploymentContext<'a, D, S> {
    fn new(app: &str, deployer: &'a D, store: &'a DeploymentStore<S>, network: &str) -> Self {
        Self {
            deployer,
            store,
            network: network.to_string(),
            logger: AppLogger::new(app),
        }
    }

    /// 記錄簽署帳戶、餘額與鏈 ID，回傳簽署帳戶
    async fn log_environment(&self) -> Result<Address> {
        let signer = self.deployer.signer();
        let balance = self.deployer.balance(signer).await?;
        let chain_id = self.deployer.chain_id().await?;

        self.logger
            .info(&format!("Deploying with account: {}", format_address(&signer)));
        self.logger.info(&format!(
            "Account balance: {} HBAR",
            format_units(balance, WEIBAR_DECIMALS)
        ));
        self.logger
            .info(&format!("Network: {} (Chain ID: {})", self.network, chain_id));
        Ok(signer)
    }

    async fn deploy(
        &self,
        label: &str,
        contract: &str,
        args: &[Token],
        value: U256,
        gas: Option<u64>,
    ) -> Result<Address> {
        self.logger.info(&format!("Deploying {}...", contract));
        let address = match self.deployer.deploy(contract, args, value, gas).await {
            Ok(address) => address,
            Err(e) => {
                self.logger.error(&format!("{} deployment failed: {}", contract, e));
                return Err(e);
            }
        };
        self.logger
            .success(&format!("{} deployed to: {}", label, format_address(&address)));
        Ok(address)
    }
}

pub struct AssetsDeployer<'a, D: ContractDeployer, S: Storage> {
    ctx: DeploymentContext<'a, D, S>,
}

impl<'a, D: ContractDeployer, S: Storage> AssetsDeployer<'a, D, S> {
    pub fn new(deployer: &'a D, store: &'a DeploymentStore<S>, network: &str) -> Self {
        Self {
            ctx: DeploymentContext::new(ASSETS_APP, deployer, store, network),
        }
    }

    pub async fn deploy_whbar(&self) -> Result<DeploymentRecord> {
        let logger = &self.ctx.logger;
        logger.info("Starting WHBAR deployment...");
        self.ctx.log_environment().await?;

        let whbar = self
            .ctx
            .deploy(
                "WHBAR",
                "WHBAR",
                &[],
                parse_units(WHBAR_DEPLOY_VALUE_HBAR, WEIBAR_DECIMALS),
                Some(WHBAR_DEPLOY_GAS),
            )
            .await?;

        let token = self.ctx.deployer.call_address(whbar, "token()").await?;
        logger.success(&format!("HTS Token created at: {}", format_address(&token)));

        let addresses = BTreeMap::from([("whbar".to_string(), format_address(&whbar))]);
        let record = self
            .ctx
            .store
            .save(ASSETS_APP, ASSETS_VERSION, &self.ctx.network, addresses)
            .await?;
        logger.success("Assets deployment completed!");
        Ok(record)
    }
}

pub struct SaucerSwapDeployer<'a, D: ContractDeployer, S: Storage> {
    ctx: DeploymentContext<'a, D, S>,
}

impl<'a, D: ContractDeployer, S: Storage> SaucerSwapDeployer<'a, D, S> {
    pub fn new(deployer: &'a D, store: &'a DeploymentStore<S>, network: &str) -> Self {
        Self {
            ctx: DeploymentContext::new(SAUCERSWAP_APP, deployer, store, network),
        }
    }

    pub async fn deploy(&self, version: &str) -> Result<DeploymentRecord> {
        match version {
            "v1" => self.deploy_v1().await,
            "v2" => self.deploy_v2().await,
            other => Err(ToolkitError::ConfigError {
                message: format!("Invalid version `{}`. Use v1 or v2", other),
            }),
        }
    }

    /// 先前部署的 WHBAR 地址 (Assets/assets 紀錄)
    async fn whbar_address(&self) -> Result<Address> {
        let missing = || ToolkitError::PrerequisiteMissing {
            message: "WHBAR not found. Please deploy assets first using: hedera-toolkit deploy assets"
                .to_string(),
            hint: format!(
                "執行 `hedera-toolkit deploy assets --network {}`",
                self.ctx.network
            ),
        };

        let addresses = match self
            .ctx
            .store
            .load_addresses(ASSETS_APP, ASSETS_VERSION, &self.ctx.network)
            .await
        {
            Ok(addresses) => addresses,
            Err(ToolkitError::DeploymentNotFound { path }) => {
                self.ctx.logger.debug(&format!("{} does not exist", path));
                return Err(missing());
            }
            Err(e) => return Err(e),
        };

        parse_address(addresses.get("whbar").ok_or_else(missing)?)
    }

    pub async fn deploy_v1(&self) -> Result<DeploymentRecord> {
        let logger = &self.ctx.logger;
        logger.info("Starting SaucerSwap V1 deployment...");
        let signer = self.ctx.log_environment().await?;

        let whbar = self.whbar_address().await?;
        logger.info(&format!("Using pre-deployed WHBAR at: {}", format_address(&whbar)));

        // pairCreateFee 與 tokenCreateFee 皆為 0
        let factory = self
            .ctx
            .deploy(
                "Factory",
                "UniswapV2Factory",
                &[Token::Address(signer), Token::Uint(U256::zero()), Token::Uint(U256::zero())],
                U256::zero(),
                None,
            )
            .await?;

        let router = self
            .ctx
            .deploy(
                "Router",
                "UniswapV2Router02",
                &[Token::Address(factory), Token::Address(whbar)],
                U256::zero(),
                None,
            )
            .await?;

        let addresses = BTreeMap::from([
            ("whbar".to_string(), format_address(&whbar)),
            ("factory".to_string(), format_address(&factory)),
            ("router".to_string(), format_address(&router)),
        ]);
        let record = self
            .ctx
            .store
            .save(SAUCERSWAP_APP, "v1", &self.ctx.network, addresses)
            .await?;
        logger.success("SaucerSwap V1 deployment completed!");
        Ok(record)
    }

    pub async fn deploy_v2(&self) -> Result<DeploymentRecord> {
        self.ctx.logger.warning("SaucerSwap V2 deployment not yet implemented");
        Err(ToolkitError::NotImplemented {
            feature: "SaucerSwap V2 deployment".to_string(),
            hint: "目前請使用 V1 (--version v1)".to_string(),
        })
    }
}

/// Assets 之後接著部署 SaucerSwap V1
pub async fn deploy_full<D: ContractDeployer, S: Storage>(
    deployer: &D,
    store: &DeploymentStore<S>,
    network: &str,
) -> Result<(DeploymentRecord, DeploymentRecord)> {
    tracing::info!("🚀 Starting full deployment...");

    tracing::info!("📦 Deploying Assets Layer...");
    let assets = AssetsDeployer::new(deployer, store, network).deploy_whbar().await?;

    tracing::info!("🔄 Deploying Application Layer...");
    let saucerswap = SaucerSwapDeployer::new(deployer, store, network)
        .deploy_v1()
        .await?;

    tracing::info!("✅ Full deployment completed!");
    Ok((assets, saucerswap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    struct DeployCall {
        contract: String,
        args: Vec<Token>,
        value: U256,
        gas: Option<u64>,
    }

    /// 依部署順序給地址 0x..01, 0x..02, ...
    #[derive(Default)]
    struct MockDeployer {
        calls: Arc<Mutex<Vec<DeployCall>>>,
    }

    fn address(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn signer_address() -> Address {
        parse_address("0x67d8d32e9bf1a9968a5ff53b87d777aa8ebbee69").unwrap()
    }

    #[async_trait]
    impl ContractDeployer for MockDeployer {
        fn signer(&self) -> Address {
            signer_address()
        }

        async fn chain_id(&self) -> Result<u64> {
            Ok(298)
        }

        async fn balance(&self, _address: Address) -> Result<U256> {
            Ok(parse_units(10_000, WEIBAR_DECIMALS))
        }

        async fn deploy(
            &self,
            contract: &str,
            constructor_args: &[Token],
            value: U256,
            gas: Option<u64>,
        ) -> Result<Address> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(DeployCall {
                contract: contract.to_string(),
                args: constructor_args.to_vec(),
                value,
                gas,
            });
            Ok(address(calls.len() as u64))
        }

        async fn call_address(&self, _contract: Address, signature: &str) -> Result<Address> {
            assert_eq!(signature, "token()");
            Ok(address(0xee))
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStorage {
        files: Arc<tokio::sync::Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MemoryStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files.lock().await.get(path).cloned().ok_or_else(|| {
                ToolkitError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string()))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }

        fn describe(&self, path: &str) -> String {
            format!("memory://{}", path)
        }
    }

    #[tokio::test]
    async fn test_deploy_whbar_sends_value_and_gas() {
        let deployer = MockDeployer::default();
        let store = DeploymentStore::new(MemoryStorage::default());

        let record = AssetsDeployer::new(&deployer, &store, "local")
            .deploy_whbar()
            .await
            .unwrap();

        let calls = deployer.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![DeployCall {
                contract: "WHBAR".to_string(),
                args: vec![],
                value: U256::from(30_000_000_000_000_000_000u128),
                gas: Some(8_000_000),
            }]
        );
        assert_eq!(record.app, "Assets");
        assert_eq!(record.version, "assets");
        assert_eq!(record.address("whbar"), Some("0x0000000000000000000000000000000000000001"));
        assert!(store.storage().exists("assets-assets-local.json").await);
    }

    #[tokio::test]
    async fn test_deploy_v1_requires_assets() {
        let deployer = MockDeployer::default();
        let store = DeploymentStore::new(MemoryStorage::default());

        let err = SaucerSwapDeployer::new(&deployer, &store, "testnet")
            .deploy_v1()
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("WHBAR not found. Please deploy assets first"));
        assert_eq!(err.exit_code(), 2);
        assert!(deployer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_v1_wires_factory_into_router() {
        let deployer = MockDeployer::default();
        let store = DeploymentStore::new(MemoryStorage::default());
        let whbar = address(0x42);
        store
            .save(
                "Assets",
                "assets",
                "testnet",
                BTreeMap::from([("whbar".to_string(), format_address(&whbar))]),
            )
            .await
            .unwrap();

        let record = SaucerSwapDeployer::new(&deployer, &store, "testnet")
            .deploy("v1")
            .await
            .unwrap();

        let calls = deployer.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].contract, "UniswapV2Factory");
        assert_eq!(
            calls[0].args,
            vec![
                Token::Address(signer_address()),
                Token::Uint(U256::zero()),
                Token::Uint(U256::zero())
            ]
        );
        assert_eq!(calls[1].contract, "UniswapV2Router02");
        assert_eq!(calls[1].args, vec![Token::Address(address(1)), Token::Address(whbar)]);

        assert_eq!(record.app, "SaucerSwap");
        assert_eq!(record.version, "v1");
        assert_eq!(record.addresses.len(), 3);
        assert_eq!(record.address("router"), Some("0x0000000000000000000000000000000000000002"));
        assert_eq!(record.file_name(), "saucerswap-v1-testnet.json");
    }

    #[tokio::test]
    async fn test_version_dispatch() {
        let deployer = MockDeployer::default();
        let store = DeploymentStore::new(MemoryStorage::default());
        let saucerswap = SaucerSwapDeployer::new(&deployer, &store, "local");

        assert!(matches!(
            saucerswap.deploy("v2").await,
            Err(ToolkitError::NotImplemented { .. })
        ));
        assert!(matches!(
            saucerswap.deploy("v3").await,
            Err(ToolkitError::ConfigError { .. })
        ));
    }

    #[tokio::test]
    async fn test_deploy_full_runs_both_layers() {
        let deployer = MockDeployer::default();
        let store = DeploymentStore::new(MemoryStorage::default());

        let (assets, saucerswap) = deploy_full(&deployer, &store, "local").await.unwrap();

        assert_eq!(assets.address("whbar"), saucerswap.address("whbar"));
        let contracts: Vec<String> = deployer
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.contract.clone())
            .collect();
        assert_eq!(contracts, vec!["WHBAR", "UniswapV2Factory", "UniswapV2Router02"]);
    }
}
