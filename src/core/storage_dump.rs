use crate::core::mirror::MirrorNodeClient;
use crate::domain::model::StorageEntry;
use crate::utils::error::{Result, ToolkitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Json,
    Yul,
}

/// 讀取合約所有 storage slot；沒有任何 slot 視為錯誤
pub async fn fetch_storage(client: &MirrorNodeClient, contract: &str) -> Result<Vec<StorageEntry>> {
    let state = client.fetch_contract_state(contract).await?;
    if state.is_empty() {
        return Err(ToolkitError::NoDataError {
            message: format!(
                "No storage entries found for contract `{}` on network {}",
                contract,
                client.base_url()
            ),
        });
    }
    tracing::info!("📦 {} storage entries found for {}", state.len(), contract);
    Ok(state)
}

pub fn render(state: &[StorageEntry], format: DumpFormat) -> Result<String> {
    match format {
        DumpFormat::Json => Ok(serde_json::to_string_pretty(state)?),
        DumpFormat::Yul => Ok(render_yul(state)),
    }
}

/// 例如:
/// ```text
/// // 2 entries found
/// sstore(0x00, 0x01)
/// sstore(0x01, 0x02)
/// ```
pub fn render_yul(state: &[StorageEntry]) -> String {
    let mut lines = Vec::with_capacity(state.len() + 1);
    lines.push(format!("// {} entries found", state.len()));
    for entry in state {
        lines.push(format!("sstore({}, {})", entry.slot, entry.value));
    }
    lines.join("\n")
}
