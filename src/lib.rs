pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{wallet_from_env, ArtifactStore, LocalStorage, RelayClient, RpcDeployer};
pub use config::ToolkitConfig;
pub use core::{
    deployer::{deploy_full, AssetsDeployer, SaucerSwapDeployer},
    deployments::DeploymentStore,
    hbarx::{BalanceReport, HbarxClient},
    mirror::MirrorNodeClient,
    yul::YulCompiler,
};
pub use domain::model::{DeploymentRecord, EntityId};
pub use utils::error::{Result, ToolkitError};
