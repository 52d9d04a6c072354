//! Replacement transaction construction.
//!
//! A replacement reuses the observed nonce and gas limit, raises the gas
//! price by 11% of the observed price (integer truncated) and sends the
//! observed value, minus the extra fee, to the receiver.

use alloy::consensus::{Transaction, TxLegacy};
use alloy::primitives::{Address, TxKind, U256};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Fee bump applied per hundred units of observed gas price.
///
/// Sits above the usual 10% minimum replacement bump enforced by nodes.
pub const BUMP_PERCENT: u128 = 11;

/// Extra gas price offered over `gas_price`.
pub fn fee_bump(gas_price: u128) -> u128 {
    gas_price / 100 * BUMP_PERCENT
}

/// Value carried by the replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementValue {
    /// Non-negative value to transfer.
    Funded(U256),
    /// The fee reservation exceeds the observed value by this amount.
    Shortfall(U256),
}

/// Unsigned replacement for an observed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementPlan {
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub to: Address,
    pub value: ReplacementValue,
}

impl ReplacementPlan {
    /// Plan the replacement of `observed`, redirecting it to `receiver`.
    ///
    /// Dynamic-fee transactions are priced by their fee cap.
    pub fn for_observed<T: Transaction>(observed: &T, receiver: Address) -> Self {
        let observed_price = observed
            .gas_price()
            .unwrap_or_else(|| observed.max_fee_per_gas());
        let bump = fee_bump(observed_price);
        let additional_fees = U256::from(bump) * U256::from(observed.gas_limit());

        let value = match observed.value().checked_sub(additional_fees) {
            Some(value) => ReplacementValue::Funded(value),
            None => ReplacementValue::Shortfall(additional_fees - observed.value()),
        };

        Self {
            nonce: observed.nonce(),
            gas_limit: observed.gas_limit(),
            gas_price: observed_price.saturating_add(bump),
            to: receiver,
            value,
        }
    }

    /// Legacy transaction body, ready for signing.
    pub fn to_legacy(&self) -> BlockchainResult<TxLegacy> {
        let value = match self.value {
            ReplacementValue::Funded(value) => value,
            ReplacementValue::Shortfall(shortfall) => {
                return Err(BlockchainError::NegativeValue { shortfall })
            }
        };

        Ok(TxLegacy {
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value,
            ..Default::default()
        })
    }
}
