use crate::utils::error::{Result, ToolkitError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Serialize)]
pub struct StandardJsonInput {
    pub language: String,
    pub sources: BTreeMap<String, SourceFile>,
    pub settings: Settings,
}

#[derive(Debug, Serialize)]
pub struct SourceFile {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Default, Deserialize)]
struct StandardJsonOutput {
    #[serde(default)]
    errors: Vec<CompilerMessage>,
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerMessage {
    #[serde(default)]
    formatted_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl CompilerMessage {
    fn text(&self) -> String {
        self.formatted_message
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "unknown compiler error".to_string())
    }
}

/// `solc --standard-json` 的 Yul 輸入，只要求 `evm.bytecode.object`
pub fn build_input(source_name: &str, content: &str) -> StandardJsonInput {
    let selection = BTreeMap::from([(
        "*".to_string(),
        BTreeMap::from([("*".to_string(), vec!["evm.bytecode.object".to_string()])]),
    )]);

    StandardJsonInput {
        language: "Yul".to_string(),
        sources: BTreeMap::from([(
            source_name.to_string(),
            SourceFile {
                content: content.to_string(),
            },
        )]),
        settings: Settings {
            output_selection: selection,
        },
    }
}

/// 任何 errors 項目 (包含 warning) 都視為編譯失敗
pub fn parse_output(source_name: &str, output: &str) -> Result<String> {
    let output: StandardJsonOutput = serde_json::from_str(output)?;

    if !output.errors.is_empty() {
        return Err(ToolkitError::CompilationError {
            errors: output.errors.iter().map(CompilerMessage::text).collect(),
        });
    }

    let contract = output
        .contracts
        .get(source_name)
        .and_then(|contracts| contracts.values().next())
        .ok_or_else(|| ToolkitError::ProcessingError {
            message: format!("solc produced no contract for `{}`", source_name),
        })?;

    contract
        .pointer("/evm/bytecode/object")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolkitError::ProcessingError {
            message: format!("solc output for `{}` has no bytecode object", source_name),
        })
}

#[derive(Debug, Clone)]
pub struct YulCompiler {
    solc_path: String,
}

impl YulCompiler {
    pub fn new(solc_path: impl Into<String>) -> Self {
        Self {
            solc_path: solc_path.into(),
        }
    }

    pub fn solc_path(&self) -> &str {
        &self.solc_path
    }

    pub async fn compile_file(&self, path: &str) -> Result<String> {
        let content = tokio::fs::read_to_string(Path::new(path)).await?;
        self.compile_source(path, &content).await
    }

    pub async fn compile_source(&self, source_name: &str, content: &str) -> Result<String> {
        let input = serde_json::to_vec(&build_input(source_name, content))?;

        tracing::debug!("🔨 {} --standard-json ({})", self.solc_path, source_name);
        let mut child = Command::new(&self.solc_path)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&input).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() && output.stdout.is_empty() {
            return Err(ToolkitError::ProcessingError {
                message: format!(
                    "{} exited with {}: {}",
                    self.solc_path,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        parse_output(source_name, &String::from_utf8_lossy(&output.stdout))
    }
}
