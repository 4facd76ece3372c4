//! 設定檔與命令列參數的檢查
//!
//! 每個 validator 都以欄位名稱回報錯誤 (`networks.local.json_rpc` 之類)，
//! 讓使用者能直接找到要修改的設定。

use crate::domain::model::{parse_address_or_id, EntityId};
use crate::utils::error::{Result, ToolkitError};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 簽署一筆最簡單的 HBAR 轉帳所需的 gas
pub const INTRINSIC_GAS: u64 = 21_000;

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> ToolkitError {
    ToolkitError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Mirror node、JSON-RPC relay 或 explorer 的位址，必須是帶主機名稱的 http(s) URL
pub fn validate_endpoint(field: &str, value: &str) -> Result<Url> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Endpoint URL is empty"));
    }

    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Not a URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("Endpoints are reached over http(s), not {}", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(field, value, "Endpoint URL has no host"));
    }
    Ok(url)
}

/// 網路名稱會出現在部署紀錄的檔名裡，只允許英數字、`-` 與 `_`
pub fn validate_network_name(field: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(field, name, "Network name is empty"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(invalid(
            field,
            name,
            format!("Network names may only use letters, digits, `-` and `_` (found `{}`)", c),
        ));
    }
    Ok(())
}

/// `--network` 可以是設定中的網路名稱，或唯讀指令使用的 mirror node URL
pub fn validate_network_arg(field: &str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        validate_endpoint(field, value).map(|_| ())
    } else {
        validate_network_name(field, value)
    }
}

/// EIP-155 chain id；Hedera 使用 295 到 298
pub fn validate_chain_id(field: &str, chain_id: u64) -> Result<()> {
    if chain_id == 0 || chain_id > u32::MAX as u64 {
        return Err(invalid(
            field,
            chain_id,
            format!("Chain id must be between 1 and {}", u32::MAX),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

/// 路徑不必存在 (輸出目錄會自動建立)，但已存在時種類必須正確
pub fn validate_path(field: &str, value: &str, kind: PathKind) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Path is empty"));
    }
    if value.contains('\0') {
        return Err(invalid(field, value, "Path contains a NUL byte"));
    }

    let path = Path::new(value);
    match kind {
        PathKind::Directory if path.is_file() => {
            Err(invalid(field, value, "Expected a directory but found a file"))
        }
        PathKind::File if path.is_dir() => {
            Err(invalid(field, value, "Expected a file but found a directory"))
        }
        _ => Ok(()),
    }
}

/// 外部程式 (例如 `solc`)：PATH 上的名稱或執行檔路徑
pub fn validate_program(field: &str, program: &str) -> Result<()> {
    if program.trim().is_empty() {
        return Err(invalid(field, program, "Program name is empty"));
    }
    if program.trim() != program {
        return Err(invalid(field, program, "Program name has surrounding whitespace"));
    }
    validate_path(field, program, PathKind::File)
}

pub fn validate_at_least(field: &str, value: u64, min: u64) -> Result<()> {
    if value < min {
        return Err(invalid(field, value, format!("Must be at least {}", min)));
    }
    Ok(())
}

pub fn required<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ToolkitError::MissingConfigError {
        field: field.to_string(),
    })
}

/// 合約可以用 `0.0.x` 或 EVM 地址指定
pub fn validate_contract_ref(field: &str, value: &str) -> Result<()> {
    parse_address_or_id(value)
        .map(|_| ())
        .map_err(|e| invalid(field, value, e.to_string()))
}

/// HTS token 只能用 `shard.realm.num` 指定，mirror node 的餘額以此比對
pub fn validate_entity_id(field: &str, value: &str) -> Result<()> {
    value
        .parse::<EntityId>()
        .map(|_| ())
        .map_err(|e| invalid(field, value, e.to_string()))
}
