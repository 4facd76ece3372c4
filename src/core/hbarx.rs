//! Stader HBARx 質押合約的呼叫
//!
//! 交易由 `EvmRpc` 在本地簽署後經 JSON-RPC relay 送出 (`eth_sendRawTransaction`)，
//! 唯讀查詢 (`getExchangeRate`, `unbondingTime`) 使用 `eth_call`。

use crate::config::toml_config::HbarxConfig;
use crate::domain::model::{parse_address_or_id, AccountInfo};
use crate::domain::ports::EvmRpc;
use crate::utils::error::{Result, ToolkitError};
use crate::utils::evm::{
    decode_uint, encode_call, format_units, parse_units, TINYBAR_DECIMALS, WEIBAR_DECIMALS,
};
use ethers::abi::Token;
use ethers::types::{Address, Bytes, TransactionReceipt, TransactionRequest, U256};
use std::fmt;

/// HBARx 與 HBAR 一樣使用 8 位小數
pub const HBARX_DECIMALS: u32 = 8;

pub struct HbarxClient<R: EvmRpc> {
    rpc: R,
    staking_contract: Address,
    undelegation_contract: Address,
    gas: u64,
}

impl<R: EvmRpc> HbarxClient<R> {
    pub fn new(rpc: R, config: &HbarxConfig) -> Result<Self> {
        Ok(Self {
            rpc,
            staking_contract: parse_address_or_id(&config.staking_contract)?,
            undelegation_contract: parse_address_or_id(&config.undelegation_contract)?,
            gas: config.gas,
        })
    }

    /// 簽署交易的帳戶
    pub fn sender(&self) -> Address {
        self.rpc.signer()
    }

    pub fn staking_contract(&self) -> Address {
        self.staking_contract
    }

    async fn execute(&self, to: Address, data: Bytes, value: U256) -> Result<TransactionReceipt> {
        let tx = TransactionRequest::new()
            .to(to)
            .gas(self.gas)
            .value(value)
            .data(data);
        self.rpc.send_transaction(tx.into()).await
    }

    async fn view(&self, signature: &str) -> Result<U256> {
        let tx = TransactionRequest::new()
            .from(self.sender())
            .to(self.staking_contract)
            .data(encode_call(signature, &[]));
        decode_uint(&self.rpc.call(&tx.into()).await?)
    }

    /// 以 `amount` HBAR 呼叫 payable `stake()`
    pub async fn stake(&self, amount: u64) -> Result<TransactionReceipt> {
        tracing::info!("🥩 Staking with {} HBAR", amount);
        let receipt = self
            .execute(
                self.staking_contract,
                encode_call("stake()", &[]),
                parse_units(amount, WEIBAR_DECIMALS),
            )
            .await?;
        tracing::info!("✅ You have successfully staked {} HBAR", amount);
        Ok(receipt)
    }

    pub async fn unstake(&self, amount: u64) -> Result<TransactionReceipt> {
        tracing::info!("🔓 Unstaking {} HBARX", amount);
        let data = encode_call(
            "unStake(uint256)",
            &[Token::Uint(parse_units(amount, HBARX_DECIMALS))],
        );
        let receipt = self.execute(self.staking_contract, data, U256::zero()).await?;
        tracing::info!("✅ You have successfully unstaked {} HBARX", amount);
        Ok(receipt)
    }

    /// `index` 從 0 起算，對應第幾次 unstake；須等待 unbonding 時間結束
    pub async fn withdraw(&self, index: u64) -> Result<TransactionReceipt> {
        tracing::info!("💸 Withdrawing index {}", index);
        let data = encode_call("withdraw(uint256)", &[Token::Uint(U256::from(index))]);
        let receipt = self.execute(self.undelegation_contract, data, U256::zero()).await?;
        tracing::info!("✅ You have successfully withdrawn");
        Ok(receipt)
    }

    pub async fn exchange_rate(&self) -> Result<f64> {
        let raw = self.view("getExchangeRate()").await?;
        let rate = format_units(raw, HBARX_DECIMALS);
        rate.parse::<f64>().map_err(|e| ToolkitError::ProcessingError {
            message: format!("Exchange rate {} is not a number: {}", rate, e),
        })
    }

    /// 秒數
    pub async fn unbonding_time(&self) -> Result<u64> {
        let raw = self.view("unbondingTime()").await?;
        if raw > U256::from(u64::MAX) {
            return Err(ToolkitError::ProcessingError {
                message: format!("Unbonding time {} out of range", raw),
            });
        }
        Ok(raw.as_u64())
    }
}

/// 帳戶的 HBAR 與 HBARx 餘額 (最小單位)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceReport {
    pub tinybars: u64,
    pub hbarx: u64,
}

impl BalanceReport {
    pub fn from_account(account: &AccountInfo, hbarx_token_id: &str) -> Self {
        Self {
            tinybars: account.balance.balance,
            hbarx: account.balance.token_balance(hbarx_token_id).unwrap_or(0),
        }
    }
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- Account balance: {} HBAR",
            format_units(U256::from(self.tinybars), TINYBAR_DECIMALS)
        )?;
        write!(
            f,
            "- Current HBARX balance: {}",
            format_units(U256::from(self.hbarx), HBARX_DECIMALS)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{format_address, AccountBalance, TokenBalance};
    use async_trait::async_trait;
    use ethers::types::transaction::eip2718::TypedTransaction;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockRpc {
        sent: Mutex<Vec<TypedTransaction>>,
        call_result: u64,
    }

    #[async_trait]
    impl EvmRpc for MockRpc {
        fn signer(&self) -> Address {
            Address::from_low_u64_be(0x3f2)
        }

        async fn chain_id(&self) -> Result<u64> {
            Ok(298)
        }

        async fn balance(&self, _address: Address) -> Result<U256> {
            Ok(U256::zero())
        }

        async fn send_transaction(&self, tx: TypedTransaction) -> Result<TransactionReceipt> {
            self.sent.lock().unwrap().push(tx);
            Ok(TransactionReceipt::default())
        }

        async fn call(&self, _tx: &TypedTransaction) -> Result<Bytes> {
            Ok(ethers::abi::encode(&[Token::Uint(U256::from(self.call_result))]).into())
        }
    }

    fn client(call_result: u64) -> HbarxClient<MockRpc> {
        let rpc = MockRpc {
            call_result,
            ..Default::default()
        };
        HbarxClient::new(rpc, &HbarxConfig::default()).unwrap()
    }

    fn target(tx: &TypedTransaction) -> String {
        format_address(tx.to_addr().unwrap())
    }

    #[tokio::test]
    async fn test_stake_sends_weibar_value() {
        let client = client(0);
        client.stake(10).await.unwrap();

        let sent = client.rpc.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(target(&sent[0]), "0x0000000000000000000000000000000000000424");
        // 10 * 10^18
        assert_eq!(sent[0].value(), Some(&U256::from(10_000_000_000_000_000_000u128)));
        assert_eq!(sent[0].gas(), Some(&U256::from(2_000_000u64)));
        assert_eq!(sent[0].data(), Some(&encode_call("stake()", &[])));
    }

    #[tokio::test]
    async fn test_unstake_and_withdraw_arguments() {
        let client = client(0);
        client.unstake(10).await.unwrap();
        client.withdraw(2).await.unwrap();

        let sent = client.rpc.sent.lock().unwrap();
        let unstake = sent[0].data().unwrap();
        assert_eq!(&unstake[4..], ethers::abi::encode(&[Token::Uint(U256::from(1_000_000_000u64))]).as_slice());
        assert_eq!(sent[0].value(), Some(&U256::zero()));

        assert_eq!(target(&sent[1]), "0x00000000000000000000000000000000000fae03");
        assert_eq!(sent[1].data().unwrap()[35], 2);
    }

    #[tokio::test]
    async fn test_views() {
        assert_eq!(client(125_000_000).exchange_rate().await.unwrap(), 1.25);
        assert_eq!(client(86_400).unbonding_time().await.unwrap(), 86_400);
    }

    #[test]
    fn test_balance_report() {
        let account = AccountInfo {
            account: "0.0.1002".to_string(),
            evm_address: None,
            balance: AccountBalance {
                balance: 150_000_000,
                tokens: vec![TokenBalance {
                    token_id: "0.0.834116".to_string(),
                    balance: 250_000_000,
                }],
            },
        };
        let report = BalanceReport::from_account(&account, "0.0.834116");
        assert_eq!(
            report.to_string(),
            "- Account balance: 1.5 HBAR\n- Current HBARX balance: 2.5"
        );

        let report = BalanceReport::from_account(&account, "0.0.1");
        assert_eq!(report.hbarx, 0);
    }
}
