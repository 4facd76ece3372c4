pub mod error;
pub mod evm;
pub mod logger;
pub mod validation;
