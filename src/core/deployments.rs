use crate::domain::model::DeploymentRecord;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ToolkitError};
use crate::utils::logger::AppLogger;
use std::collections::BTreeMap;

/// 每個 (app, version, network) 一個 JSON 檔
#[derive(Debug, Clone)]
pub struct DeploymentStore<S: Storage> {
    storage: S,
}

impl<S: Storage> DeploymentStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn save(
        &self,
        app: &str,
        version: &str,
        network: &str,
        addresses: BTreeMap<String, String>,
    ) -> Result<DeploymentRecord> {
        let record = DeploymentRecord::new(app, version, network, addresses);
        let file_name = record.file_name();
        let json = serde_json::to_string_pretty(&record)?;

        self.storage.write_file(&file_name, json.as_bytes()).await?;
        AppLogger::new(app).info(&format!("Deployment saved to: {}", self.storage.describe(&file_name)));

        Ok(record)
    }

    pub async fn load(&self, app: &str, version: &str, network: &str) -> Result<DeploymentRecord> {
        let file_name = DeploymentRecord::file_name_for(app, version, network);

        if !self.storage.exists(&file_name).await {
            return Err(ToolkitError::DeploymentNotFound {
                path: self.storage.describe(&file_name),
            });
        }

        let data = self.storage.read_file(&file_name).await?;
        let record: DeploymentRecord = serde_json::from_slice(&data)?;
        tracing::debug!("📂 Loaded {} ({} addresses)", file_name, record.addresses.len());
        Ok(record)
    }

    pub async fn load_addresses(
        &self,
        app: &str,
        version: &str,
        network: &str,
    ) -> Result<BTreeMap<String, String>> {
        Ok(self.load(app, version, network).await?.addresses)
    }
}
