//! Contract bindings for the token and bridge contracts the adapter calls.

use std::fmt;

use alloy::sol;
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};

sol! {
    /// Fungible token contract.
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Non-fungible token contract.
    interface IERC721 {
        function approve(address to, uint256 tokenId) external;
        function getApproved(uint256 tokenId) external view returns (address);
    }

    /// Bridge custody contract for fungible tokens.
    interface ILockProxy {
        function lock(
            address fromAssetHash,
            uint64 toChainId,
            bytes toAddress,
            uint256 amount,
            uint256 fee,
            uint256 id
        ) external payable returns (bool);
    }

    /// Bridge custody contract for NFTs.
    interface INftLockProxy {
        function lock(
            address fromAsset,
            uint64 toChainId,
            bytes toAddress,
            uint256 toTokenId,
            address feeToken,
            uint256 fee,
            uint256 id
        ) external payable returns (bool);
    }
}

/// The contract interfaces the adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    /// ERC-20 token
    Erc20,
    /// ERC-721 token
    Erc721,
    /// Fungible bridge lock contract
    LockProxy,
    /// NFT bridge lock contract
    NftLockProxy,
}

impl ContractKind {
    /// All kinds, in a stable order.
    pub const ALL: [ContractKind; 4] = [
        ContractKind::Erc20,
        ContractKind::Erc721,
        ContractKind::LockProxy,
        ContractKind::NftLockProxy,
    ];

    /// Solidity signatures of the methods the adapter invokes on this kind.
    pub fn method_signatures(&self) -> &'static [&'static str] {
        match self {
            ContractKind::Erc20 => &[
                IERC20::balanceOfCall::SIGNATURE,
                IERC20::allowanceCall::SIGNATURE,
                IERC20::totalSupplyCall::SIGNATURE,
                IERC20::approveCall::SIGNATURE,
            ],
            ContractKind::Erc721 => &[
                IERC721::approveCall::SIGNATURE,
                IERC721::getApprovedCall::SIGNATURE,
            ],
            ContractKind::LockProxy => &[ILockProxy::lockCall::SIGNATURE],
            ContractKind::NftLockProxy => &[INftLockProxy::lockCall::SIGNATURE],
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContractKind::Erc20 => write!(f, "ERC20"),
            ContractKind::Erc721 => write!(f, "ERC721"),
            ContractKind::LockProxy => write!(f, "LockProxy"),
            ContractKind::NftLockProxy => write!(f, "NftLockProxy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, Bytes, U256};

    #[test]
    fn test_erc20_selectors() {
        assert_eq!(IERC20::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(IERC20::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(IERC20::totalSupplyCall::SELECTOR, [0x18, 0x16, 0x0d, 0xdd]);
        assert_eq!(IERC721::getApprovedCall::SELECTOR, [0x08, 0x18, 0x12, 0xfc]);
    }

    #[test]
    fn test_method_signatures() {
        assert_eq!(
            ContractKind::Erc20.method_signatures()[0],
            "balanceOf(address)"
        );
        assert_eq!(
            ContractKind::LockProxy.method_signatures(),
            &["lock(address,uint64,bytes,uint256,uint256,uint256)"]
        );
        assert_eq!(
            ContractKind::NftLockProxy.method_signatures(),
            &["lock(address,uint64,bytes,uint256,address,uint256,uint256)"]
        );
        for kind in ContractKind::ALL {
            assert!(!kind.method_signatures().is_empty(), "{kind}");
        }
    }

    #[test]
    fn test_lock_call_layout() {
        let call = ILockProxy::lockCall {
            fromAssetHash: Address::ZERO,
            toChainId: 6,
            toAddress: Bytes::from(vec![0xab; 20]),
            amount: U256::from(15u64),
            fee: U256::from(1u64),
            id: U256::ZERO,
        };
        let data = call.abi_encode();
        assert_eq!(&data[..4], ILockProxy::lockCall::SELECTOR.as_slice());
        // six head words, then the length word and one padded data word for the bytes
        assert_eq!(data.len(), 4 + 32 * 8);
    }
}
