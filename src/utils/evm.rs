use crate::utils::error::{Result, ToolkitError};
use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, Bytes, H256, U256};
use ethers::utils::{get_create2_address_from_hash, id, keccak256};

/// HBAR 在 JSON-RPC 層使用 18 位小數 (weibar)
pub const WEIBAR_DECIMALS: u32 = 18;
/// HAPI 層使用 8 位小數 (tinybar)
pub const TINYBAR_DECIMALS: u32 = 8;

pub fn function_selector(signature: &str) -> [u8; 4] {
    id(signature)
}

pub fn encode_call(signature: &str, args: &[Token]) -> Bytes {
    let mut data = function_selector(signature).to_vec();
    data.extend(abi::encode(args));
    data.into()
}

fn decode_single(kind: ParamType, data: &[u8]) -> Result<Token> {
    let label = kind.to_string();
    abi::decode(&[kind], data)
        .map_err(|e| ToolkitError::ProcessingError {
            message: format!("Cannot decode {} return value: {}", label, e),
        })?
        .pop()
        .ok_or_else(|| ToolkitError::ProcessingError {
            message: format!("Empty {} return value", label),
        })
}

pub fn decode_uint(data: &[u8]) -> Result<U256> {
    decode_single(ParamType::Uint(256), data)?
        .into_uint()
        .ok_or_else(|| ToolkitError::ProcessingError {
            message: "Expected a uint256 return value".to_string(),
        })
}

pub fn decode_address(data: &[u8]) -> Result<Address> {
    decode_single(ParamType::Address, data)?
        .into_address()
        .ok_or_else(|| ToolkitError::ProcessingError {
            message: "Expected an address return value".to_string(),
        })
}

pub fn parse_hex_data(value: &str) -> Result<Bytes> {
    value.trim().parse::<Bytes>().map_err(|e| ToolkitError::ProcessingError {
        message: format!("Invalid hex data `{}`: {}", value, e),
    })
}

/// 與 ethers.js `formatUnits` 相同的輸出，例如 `1.5`、`30.0`
pub fn format_units(value: U256, decimals: u32) -> String {
    let formatted = match ethers::utils::format_units(value, decimals) {
        Ok(formatted) => formatted,
        Err(_) => return value.to_string(),
    };
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => format!("{}.0", formatted),
    }
}

pub fn parse_units(whole: u64, decimals: u32) -> U256 {
    U256::from(whole) * U256::exp10(decimals as usize)
}

/// keccak256(abi.encodePacked(tokenA, tokenB))
pub fn create_salt(token_a: &Address, token_b: &Address) -> H256 {
    let mut packed = Vec::with_capacity(40);
    packed.extend_from_slice(token_a.as_bytes());
    packed.extend_from_slice(token_b.as_bytes());
    H256::from(keccak256(&packed))
}

/// 工廠合約以排序後的 token 計算 pair 地址
pub fn pair_address(factory: &Address, token_a: &Address, token_b: &Address, init_code_hash: &H256) -> Address {
    let (token0, token1) = if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    get_create2_address_from_hash(*factory, create_salt(token0, token1), init_code_hash)
}

pub fn parse_hash(value: &str) -> Result<H256> {
    let bytes = parse_hex_data(value)?;
    if bytes.len() != 32 {
        return Err(ToolkitError::InvalidIdentifierError {
            kind: "32-byte hash".to_string(),
            value: value.to_string(),
        });
    }
    Ok(H256::from_slice(&bytes))
}
