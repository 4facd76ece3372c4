// Adapters layer: concrete implementations of the domain ports (filesystem, signing JSON-RPC relay).

pub mod rpc;
pub mod storage;

pub use rpc::{wallet_from_env, ArtifactStore, RelayClient, RpcDeployer};
pub use storage::LocalStorage;
