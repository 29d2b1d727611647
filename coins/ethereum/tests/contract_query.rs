//! Balance, allowance, supply and NFT approval reads against a mock provider.

mod common;

use alloy::primitives::U256;
use alloy::sol_types::SolCall;
use common::*;
use xbridge_error::ProviderError;
use xbridge_ethereum::abi::{IERC20, IERC721};
use xbridge_ethereum::prelude::*;
use xbridge_ethereum::{format_units, parse_units};
use xbridge_testing::MockProvider;
use xbridge_traits::{methods, NATIVE_TOKEN_HASH};

#[tokio::test]
async fn test_native_balance_uses_get_balance() {
    let provider = MockProvider::new();
    provider.set_balance(address(OWNER), U256::from(1_500_000_000_000_000_000u128));
    let h = harness(provider);

    let balance = h.wallet.balance(ETH, OWNER, NATIVE_TOKEN_HASH).await.unwrap();
    assert_eq!(balance, "1.5");
    assert_eq!(h.provider.request_count(methods::ETH_GET_BALANCE), 1);
    assert_eq!(h.provider.request_count(methods::ETH_CALL), 0);
}

#[tokio::test]
async fn test_native_balance_zero() {
    let h = harness(MockProvider::new());
    let balance = h.wallet.balance(ETH, OWNER, NATIVE_TOKEN_HASH).await.unwrap();
    assert_eq!(balance, "0");
}

#[tokio::test]
async fn test_token_balance_uses_registered_decimals() {
    let provider = MockProvider::new();
    provider.set_uint_result(IERC20::balanceOfCall::SELECTOR, U256::from(2_500_000u64));
    let h = harness(provider);

    let balance = h.wallet.balance(ETH, OWNER, USDT).await.unwrap();
    assert_eq!(balance, "2.5");
    assert_eq!(h.provider.request_count(methods::ETH_CALL), 1);

    let (_, params) = h.provider.requests().pop().unwrap();
    assert_eq!(params[1], "latest");
    let to = params[0]["to"].as_str().unwrap();
    assert_eq!(address(to), address(USDT));
}

#[tokio::test]
async fn test_token_balance_accepts_prefixed_hash() {
    let provider = MockProvider::new();
    provider.set_uint_result(IERC20::balanceOfCall::SELECTOR, U256::from(1u64));
    let h = harness(provider);

    let balance = h
        .wallet
        .balance(ETH, OWNER, &format!("0x{}", USDT.to_uppercase()))
        .await
        .unwrap();
    assert_eq!(balance, "0.000001");
}

#[tokio::test]
async fn test_large_balance_is_exact() {
    let provider = MockProvider::new();
    provider.set_uint_result(IERC20::balanceOfCall::SELECTOR, U256::MAX);
    let h = harness(provider);

    let balance = h.wallet.balance(ETH, OWNER, USDT).await.unwrap();
    let expected = format_units(U256::MAX, 6);
    assert_eq!(balance, expected);
    assert_eq!(parse_units(&balance, 6).unwrap(), U256::MAX);
}

#[tokio::test]
async fn test_native_allowance_and_supply_not_applicable() {
    let h = harness(MockProvider::new());

    let allowance = h
        .wallet
        .allowance(ETH, OWNER, NATIVE_TOKEN_HASH, LOCK_PROXY)
        .await
        .unwrap();
    assert_eq!(allowance, TokenQuantity::NotApplicable);
    assert!(!allowance.is_applicable());

    let supply = h.wallet.total_supply(ETH, NATIVE_TOKEN_HASH).await.unwrap();
    assert_eq!(supply, TokenQuantity::NotApplicable);
    assert!(h.provider.requests().is_empty());
}

#[tokio::test]
async fn test_token_allowance() {
    let provider = MockProvider::new();
    provider.set_uint_result(IERC20::allowanceCall::SELECTOR, U256::from(100_000_000u64));
    let h = harness(provider);

    let allowance = h
        .wallet
        .allowance(ETH, OWNER, USDT, LOCK_PROXY)
        .await
        .unwrap();
    assert_eq!(allowance.amount(), Some("100"));

    let (_, params) = h.provider.requests().pop().unwrap();
    let data = params[0]["data"].as_str().unwrap();
    let call =
        IERC20::allowanceCall::abi_decode(&hex::decode(&data[2..]).unwrap()).unwrap();
    assert_eq!(call.owner, address(OWNER));
    assert_eq!(call.spender, address(LOCK_PROXY));
}

#[tokio::test]
async fn test_total_supply() {
    let provider = MockProvider::new();
    provider.set_uint_result(
        IERC20::totalSupplyCall::SELECTOR,
        U256::from(39_823_122_456_000_000u64),
    );
    let h = harness(provider);

    let supply = h.wallet.total_supply(ETH, USDT).await.unwrap();
    assert_eq!(supply, TokenQuantity::Amount("39823122456".into()));
}

#[tokio::test]
async fn test_unknown_token_makes_no_call() {
    let h = harness(MockProvider::new());

    let err = h
        .wallet
        .balance(ETH, OWNER, "1111111111111111111111111111111111111111")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);

    let err = h.wallet.total_supply(BSC, USDT).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(h.provider.requests().is_empty());
}

#[tokio::test]
async fn test_invalid_owner_is_rejected() {
    let h = harness(MockProvider::new());
    let err = h.wallet.balance(ETH, "0x1234", USDT).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert_eq!(h.provider.request_count(methods::ETH_CALL), 0);
}

#[tokio::test]
async fn test_reverted_call_is_classified() {
    // no result scripted for balanceOf, so the mock reverts
    let h = harness(MockProvider::new());
    let err = h.wallet.balance(ETH, OWNER, USDT).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(err.message().contains("execution reverted"));
}

#[tokio::test]
async fn test_provider_failure_keeps_kind() {
    let provider = MockProvider::new();
    provider.fail_method(
        methods::ETH_GET_BALANCE,
        ProviderError::with_code(4001, "User rejected the request."),
    );
    let h = harness(provider);
    let err = h
        .wallet
        .balance(ETH, OWNER, NATIVE_TOKEN_HASH)
        .await
        .unwrap_err();
    assert!(err.is_user_rejected());
}

#[tokio::test]
async fn test_malformed_return_data() {
    let provider = MockProvider::new();
    provider.set_call_result(IERC20::balanceOfCall::SELECTOR, vec![0x01, 0x02]);
    let h = harness(provider);
    assert!(h.wallet.balance(ETH, OWNER, USDT).await.is_err());
}

#[tokio::test]
async fn test_balance_without_provider() {
    let (wallet, _sink) = not_installed();
    let err = wallet.balance(ETH, OWNER, USDT).await.unwrap_err();
    assert!(err.message().contains("not installed"));
}

mod nft {
    use super::*;

    #[tokio::test]
    async fn test_approved_when_operator_is_lock_contract() {
        let provider = MockProvider::new();
        provider.set_address_result(
            IERC721::getApprovedCall::SELECTOR,
            address(NFT_LOCK_PROXY),
        );
        let h = harness(provider);

        assert!(h.wallet.nft_approved(ETH, NFT, "42").await.unwrap());

        let (_, params) = h.provider.requests().pop().unwrap();
        let data = params[0]["data"].as_str().unwrap();
        let call =
            IERC721::getApprovedCall::abi_decode(&hex::decode(&data[2..]).unwrap()).unwrap();
        assert_eq!(call.tokenId, U256::from(42u64));
        assert_eq!(address(params[0]["to"].as_str().unwrap()), address(NFT));
    }

    #[tokio::test]
    async fn test_not_approved_for_other_operator() {
        let provider = MockProvider::new();
        provider.set_address_result(IERC721::getApprovedCall::SELECTOR, address(RECIPIENT));
        let h = harness(provider);
        assert!(!h.wallet.nft_approved(ETH, NFT, "42").await.unwrap());
    }

    #[tokio::test]
    async fn test_not_approved_when_unset() {
        let provider = MockProvider::new();
        provider.set_address_result(IERC721::getApprovedCall::SELECTOR, Address::ZERO);
        let h = harness(provider);
        assert!(!h.wallet.nft_approved(ETH, NFT, "1").await.unwrap());
    }

    #[tokio::test]
    async fn test_chain_without_nft_bridge() {
        let h = harness(MockProvider::new());
        let err = h.wallet.nft_approved(HECO, NFT, "1").await.unwrap_err();
        assert!(err.message().contains("no NFT lock contract"));
        assert!(h.provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_token_id() {
        let h = harness(MockProvider::new());
        assert!(h.wallet.nft_approved(ETH, NFT, "1.5x").await.is_err());
        assert_eq!(h.provider.request_count(methods::ETH_CALL), 0);
    }
}
