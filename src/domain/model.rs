use crate::utils::error::{Result, ToolkitError};
use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Hedera 實體 ID (`shard.realm.num`)，shard 在 long-zero 地址中只佔 4 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    pub shard: u32,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    pub fn new(shard: u32, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// long-zero 格式: 4 bytes shard + 8 bytes realm + 8 bytes num
    pub fn to_evm_address(&self) -> Address {
        let mut bytes = [0u8; 20];
        bytes[..4].copy_from_slice(&self.shard.to_be_bytes());
        bytes[4..12].copy_from_slice(&self.realm.to_be_bytes());
        bytes[12..].copy_from_slice(&self.num.to_be_bytes());
        Address::from(bytes)
    }

    pub fn from_evm_address(address: &Address) -> Result<Self> {
        if !is_long_zero(address) {
            return Err(ToolkitError::InvalidIdentifierError {
                kind: "long-zero EVM address".to_string(),
                value: format_address(address),
            });
        }
        let bytes = address.as_bytes();
        let mut shard = [0u8; 4];
        let mut realm = [0u8; 8];
        let mut num = [0u8; 8];
        shard.copy_from_slice(&bytes[..4]);
        realm.copy_from_slice(&bytes[4..12]);
        num.copy_from_slice(&bytes[12..]);
        Ok(Self {
            shard: u32::from_be_bytes(shard),
            realm: u64::from_be_bytes(realm),
            num: u64::from_be_bytes(num),
        })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ToolkitError::InvalidIdentifierError {
            kind: "entity ID".to_string(),
            value: s.to_string(),
        };

        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        Ok(Self {
            shard: parts[0].parse().map_err(|_| invalid())?,
            realm: parts[1].parse().map_err(|_| invalid())?,
            num: parts[2].parse().map_err(|_| invalid())?,
        })
    }
}

/// 前 12 bytes 為 0 的地址對應到 Hedera 實體
pub fn is_long_zero(address: &Address) -> bool {
    address.as_bytes()[..12].iter().all(|b| *b == 0)
}

/// 完整的小寫十六進位 (`Address` 的 Display 會縮寫中間)
pub fn format_address(address: &Address) -> String {
    format!("{:#x}", address)
}

pub fn parse_address(value: &str) -> Result<Address> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let invalid = || ToolkitError::InvalidIdentifierError {
        kind: "EVM address".to_string(),
        value: value.to_string(),
    };

    if digits.len() != 40 {
        return Err(invalid());
    }
    digits.parse::<Address>().map_err(|_| invalid())
}

/// 接受 `0.0.x` 實體 ID 或 `0x` EVM 地址
pub fn parse_address_or_id(value: &str) -> Result<Address> {
    let trimmed = value.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        parse_address(trimmed)
    } else {
        Ok(trimmed.parse::<EntityId>()?.to_evm_address())
    }
}

/// Mirror node 的合約 storage slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub slot: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token_id: String,
    pub balance: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
}

impl AccountBalance {
    pub fn token_balance(&self, token_id: &str) -> Option<u64> {
        self.tokens
            .iter()
            .find(|token| token.token_id == token_id)
            .map(|token| token.balance)
    }
}

/// `/api/v1/accounts/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account: String,
    #[serde(default)]
    pub evm_address: Option<String>,
    #[serde(default)]
    pub balance: AccountBalance,
}

/// `/api/v1/tokens/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub token_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<String>,
    #[serde(default)]
    pub total_supply: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub network: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub addresses: BTreeMap<String, String>,
    pub app: String,
}

impl DeploymentRecord {
    pub fn new(app: &str, version: &str, network: &str, addresses: BTreeMap<String, String>) -> Self {
        Self {
            network: network.to_string(),
            version: version.to_string(),
            timestamp: Utc::now(),
            addresses,
            app: app.to_string(),
        }
    }

    pub fn file_name_for(app: &str, version: &str, network: &str) -> String {
        format!("{}-{}-{}.json", app.to_lowercase(), version, network)
    }

    pub fn file_name(&self) -> String {
        Self::file_name_for(&self.app, &self.version, &self.network)
    }

    pub fn address(&self, key: &str) -> Option<&str> {
        self.addresses.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_parse_and_display() {
        let id: EntityId = "0.0.1027587".parse().unwrap();
        assert_eq!(id, EntityId::new(0, 0, 1027587));
        assert_eq!(id.to_string(), "0.0.1027587");

        assert!("0.0".parse::<EntityId>().is_err());
        assert!("0.0.x".parse::<EntityId>().is_err());
        assert!("0.0.1.2".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_entity_id_long_zero_conversion() {
        let id = EntityId::new(0, 0, 1060);
        let address = id.to_evm_address();
        assert_eq!(format_address(&address), "0x0000000000000000000000000000000000000424");
        assert_eq!(EntityId::from_evm_address(&address).unwrap(), id);
    }

    #[test]
    fn test_entity_id_shard_fills_four_bytes() {
        let id = EntityId::new(u32::MAX, 1, 2);
        let address = id.to_evm_address();
        assert_eq!(format_address(&address), "0xffffffff00000000000000010000000000000002");
        assert_eq!(EntityId::from_evm_address(&address).unwrap(), id);

        // shard 超過 4 bytes 無法表示
        assert!("4294967296.0.1".parse::<EntityId>().is_err());
        assert_eq!("4294967295.0.1".parse::<EntityId>().unwrap().shard, u32::MAX);
    }

    #[test]
    fn test_entity_id_rejects_non_long_zero() {
        let address = parse_address("0x67d8d32e9bf1a9968a5ff53b87d777aa8ebbee69").unwrap();
        assert!(!is_long_zero(&address));
        assert!(EntityId::from_evm_address(&address).is_err());
    }

    #[test]
    fn test_parse_address() {
        let address = parse_address("0X000000000000000000000000000000000001E240").unwrap();
        assert_eq!(format_address(&address), "0x000000000000000000000000000000000001e240");

        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzz00000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn test_parse_address_or_id() {
        assert_eq!(
            format_address(&parse_address_or_id("0.0.1060").unwrap()),
            "0x0000000000000000000000000000000000000424"
        );
        assert_eq!(
            format_address(&parse_address_or_id(" 0x67d8d32e9bf1a9968a5ff53b87d777aa8ebbee69 ").unwrap()),
            "0x67d8d32e9bf1a9968a5ff53b87d777aa8ebbee69"
        );
        assert!(parse_address_or_id("staking").is_err());
    }

    #[test]
    fn test_deployment_record_file_name() {
        let record = DeploymentRecord::new("SaucerSwap", "v1", "local", BTreeMap::new());
        assert_eq!(record.file_name(), "saucerswap-v1-local.json");
    }

    #[test]
    fn test_account_token_balance() {
        let balance = AccountBalance {
            balance: 1_000,
            tokens: vec![TokenBalance {
                token_id: "0.0.834116".to_string(),
                balance: 42,
            }],
        };
        assert_eq!(balance.token_balance("0.0.834116"), Some(42));
        assert_eq!(balance.token_balance("0.0.1"), None);
    }
}
