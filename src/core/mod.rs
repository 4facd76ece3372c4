pub mod deployer;
pub mod deployments;
pub mod hbarx;
pub mod mirror;
pub mod storage_dump;
pub mod yul;

pub use crate::domain::ports::{ContractDeployer, EvmRpc, Storage};
pub use crate::utils::error::Result;
