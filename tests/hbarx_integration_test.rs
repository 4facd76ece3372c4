use anyhow::Result;
use ethers::utils::hex;
use hedera_toolkit::config::toml_config::HbarxConfig;
use hedera_toolkit::domain::model::format_address;
use hedera_toolkit::utils::evm::function_selector;
use hedera_toolkit::{BalanceReport, HbarxClient, MirrorNodeClient, RelayClient, ToolkitConfig};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::time::Duration;

// Hardhat 預設帳戶 #0，當作 USER_PK
const USER_PK: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcaee7f4dd1c72fba";
const USER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

fn selector(signature: &str) -> String {
    hex::encode(function_selector(signature))
}

fn rpc_result(result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": 1, "result": result})
}

fn mock_user_account(mirror: &MockServer) {
    mirror.mock(|when, then| {
        when.method(GET).path("/api/v1/accounts/0.0.1012");
        then.status(200).json_body(json!({
            "account": "0.0.1012",
            "evm_address": USER,
            "balance": {
                "balance": 10_000_000_000u64,
                "tokens": [{"token_id": "0.0.834116", "balance": 1_234_000_000u64}]
            }
        }));
    });
}

fn mock_chain_id(rpc: &MockServer) {
    rpc.mock(|when, then| {
        when.method(POST).body_contains("eth_chainId");
        then.status(200).json_body(rpc_result(json!("0x12a")));
    });
}

async fn client(rpc: &MockServer) -> Result<HbarxClient<RelayClient>> {
    let relay = RelayClient::connect(&rpc.base_url(), USER_PK.parse()?)
        .await?
        .with_receipt_polling(Duration::from_millis(10), 100);
    Ok(HbarxClient::new(relay, &HbarxConfig::default())?)
}

#[tokio::test]
async fn test_status_reads_balances_and_rate() -> Result<()> {
    let mirror_server = MockServer::start();
    let rpc_server = MockServer::start();
    mock_user_account(&mirror_server);
    mock_chain_id(&rpc_server);

    let rate = rpc_server.mock(|when, then| {
        when.method(POST)
            .body_contains("eth_call")
            .body_contains(&format!("0x{}", selector("getExchangeRate()")));
        then.status(200)
            .json_body(rpc_result(json!(format!("0x{:064x}", 105_000_000u64))));
    });
    let unbonding = rpc_server.mock(|when, then| {
        when.method(POST)
            .body_contains("eth_call")
            .body_contains(&format!("0x{}", selector("unbondingTime()")));
        then.status(200)
            .json_body(rpc_result(json!(format!("0x{:064x}", 86_400u64))));
    });

    let mirror = MirrorNodeClient::new(mirror_server.base_url());
    let client = client(&rpc_server).await?;

    // mirror node 上的帳戶與 USER_PK 是同一個
    let account_address = mirror.resolve_evm_address("0.0.1012").await?;
    assert_eq!(account_address, client.sender());
    assert_eq!(format_address(&client.sender()), USER);

    assert_eq!(client.exchange_rate().await?, 1.05);
    assert_eq!(client.unbonding_time().await?, 86_400);
    rate.assert();
    unbonding.assert();

    let account = mirror.fetch_account("0.0.1012").await?;
    let report = BalanceReport::from_account(&account, &HbarxConfig::default().token_id);
    assert_eq!(
        report.to_string(),
        "- Account balance: 100.0 HBAR\n- Current HBARX balance: 12.34"
    );
    Ok(())
}

#[tokio::test]
async fn test_stake_is_signed_and_sent_raw() -> Result<()> {
    let rpc_server = MockServer::start();
    mock_chain_id(&rpc_server);
    let hash = format!("0x{}", "ab".repeat(32));
    let block = format!("0x{}", "cd".repeat(32));

    let send_unsigned = rpc_server.mock(|when, then| {
        when.method(POST).body_contains("eth_sendTransaction");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 1,
            "error": {"code": -32601, "message": "Unsupported JSON-RPC method"}
        }));
    });
    let nonce = rpc_server.mock(|when, then| {
        when.method(POST)
            .body_contains("eth_getTransactionCount")
            .body_contains(USER);
        then.status(200).json_body(rpc_result(json!("0x7")));
    });
    rpc_server.mock(|when, then| {
        when.method(POST).body_contains("eth_gasPrice");
        then.status(200).json_body(rpc_result(json!("0xa54f4c3c00")));
    });
    let estimate = rpc_server.mock(|when, then| {
        when.method(POST).body_contains("eth_estimateGas");
        then.status(200).json_body(rpc_result(json!("0x5208")));
    });

    // 10 HBAR = 0x8ac7230489e80000 weibar, gas 2,000,000 = 0x1e8480
    let send = rpc_server.mock(|when, then| {
        when.method(POST)
            .body_contains("eth_sendRawTransaction")
            .body_contains("0000000000000000000000000000000000000424")
            .body_contains("8ac7230489e80000")
            .body_contains("1e8480")
            .body_contains(&selector("stake()"));
        then.status(200).json_body(rpc_result(json!(hash)));
    });
    rpc_server.mock(|when, then| {
        when.method(POST).body_contains("eth_getTransactionByHash");
        then.status(200).json_body(rpc_result(json!({
            "hash": hash, "nonce": "0x7", "blockHash": block, "blockNumber": "0x20",
            "transactionIndex": "0x0", "from": USER,
            "to": "0x0000000000000000000000000000000000000424",
            "value": "0x8ac7230489e80000", "gasPrice": "0xa54f4c3c00", "gas": "0x1e8480",
            "input": format!("0x{}", selector("stake()")), "v": "0x277", "r": "0x1", "s": "0x1"
        })));
    });
    rpc_server.mock(|when, then| {
        when.method(POST).body_contains("eth_getTransactionReceipt");
        then.status(200).json_body(rpc_result(json!({
            "transactionHash": hash, "transactionIndex": "0x0", "blockHash": block,
            "blockNumber": "0x20", "from": USER,
            "to": "0x0000000000000000000000000000000000000424",
            "cumulativeGasUsed": "0x30d40", "gasUsed": "0x30d40", "contractAddress": null,
            "logs": [], "logsBloom": format!("0x{}", "0".repeat(512)),
            "status": "0x1", "type": "0x0", "effectiveGasPrice": "0xa54f4c3c00"
        })));
    });

    let client = client(&rpc_server).await?;
    let receipt = client.stake(10).await?;

    send.assert();
    nonce.assert();
    // gas 已由 hbarx.gas 指定
    estimate.assert_hits(0);
    send_unsigned.assert_hits(0);

    let receipt_hash = format!("{:#x}", receipt.transaction_hash);
    assert_eq!(receipt_hash, hash);

    let config = ToolkitConfig::default();
    assert_eq!(
        config.explorer_transaction_url("local", &receipt_hash),
        Some(format!("http://localhost:8080/localnet/transaction/{}", hash))
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_user_credentials_are_reported() {
    std::env::remove_var("USER_ID");
    let err = hedera_toolkit::config::require_env("USER_ID").unwrap_err();
    assert_eq!(err.to_string(), "Missing `USER_ID` environment variable");
    assert_eq!(err.exit_code(), 2);

    std::env::remove_var("USER_PK");
    let err = hedera_toolkit::wallet_from_env("USER_PK").unwrap_err();
    assert_eq!(err.to_string(), "Missing `USER_PK` environment variable");
}
