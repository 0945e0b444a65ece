//! Sample unproven transactions
//!
//! Draws the random inputs of a demo transaction (token type, value,
//! recipient segment) and assembles it through a [`Ledger`], the external
//! ledger library. The ledger owns the transaction format: coin nonces,
//! recipient keys and the serialized bytes all come from it, and the worker
//! forwards those bytes to the proving backend untouched.

use anyhow::{Context, Result};
use rand::Rng;

/// Network every sample transaction targets
pub const NETWORK_ID: &str = "local-test";

/// Exclusive upper bound of each factor of a sample value (2^53)
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_992;

/// Builders of the external ledger library used to synthesize a transaction
pub trait Ledger {
    /// Shielded coin description
    type CoinInfo;
    /// Shielded output to a recipient
    type Output;
    /// Offer made of outputs
    type Offer;
    /// Transaction lacking proofs
    type Transaction;

    /// Random recipient coin public key.
    fn sample_coin_public_key(&self) -> Result<String>;
    /// Random recipient encryption public key.
    fn sample_encryption_public_key(&self) -> Result<String>;
    /// Coin of `value` units of `token_type` with a fresh nonce.
    fn create_shielded_coin_info(&self, token_type: &str, value: u128) -> Result<Self::CoinInfo>;
    /// Output of `coin` in `segment`, 0 being the guaranteed segment.
    fn output(
        &self,
        coin: Self::CoinInfo,
        segment: u16,
        target_coin_public_key: &str,
        target_encryption_public_key: &str,
    ) -> Result<Self::Output>;
    /// Offer consisting of a single output moving `value` of `token_type`.
    fn offer_from_output(
        &self,
        output: Self::Output,
        token_type: &str,
        value: u128,
    ) -> Result<Self::Offer>;
    /// Assembles a transaction from its offers.
    fn transaction_from_parts(
        &self,
        network_id: &str,
        guaranteed: Self::Offer,
        fallible: Option<Self::Offer>,
    ) -> Result<Self::Transaction>;
    /// Ledger encoding of `transaction`, sent to the worker as `serializedTx`.
    fn serialize(&self, transaction: &Self::Transaction) -> Result<Vec<u8>>;
}

/// Shielded token type, 32 bytes rendered as 64 hex digits
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShieldedTokenType {
    /// Hex encoded token type
    pub raw: String,
}

/// Random token type.
pub fn sample_shielded_token_type<R: Rng + ?Sized>(rng: &mut R) -> ShieldedTokenType {
    let mut raw = [0u8; 32];
    rng.fill(&mut raw);
    ShieldedTokenType {
        raw: hex::encode(raw),
    }
}

/// Product of two random integers below 2^53.
pub fn sample_value<R: Rng + ?Sized>(rng: &mut R) -> u128 {
    let a = rng.gen_range(0..MAX_SAFE_INTEGER);
    let b = rng.gen_range(0..MAX_SAFE_INTEGER);
    u128::from(a).saturating_mul(u128::from(b))
}

/// Demo transactions built over a [`Ledger`]
pub struct TestVectors<L> {
    ledger: L,
}

impl<L: Ledger> TestVectors<L> {
    /// Wraps the ledger library.
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Single-output offer in `segment` with random token, value and recipient.
    pub fn unproven_offer_from_output<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        segment: u16,
    ) -> Result<L::Offer> {
        let token_type = sample_shielded_token_type(rng);
        let value = sample_value(rng);
        let coin = self
            .ledger
            .create_shielded_coin_info(&token_type.raw, value)
            .context("failed to create shielded coin info")?;
        let target_coin_public_key = self.ledger.sample_coin_public_key()?;
        let target_encryption_public_key = self.ledger.sample_encryption_public_key()?;
        let output = self
            .ledger
            .output(
                coin,
                segment,
                &target_coin_public_key,
                &target_encryption_public_key,
            )
            .with_context(|| format!("failed to build output in segment {segment}"))?;
        self.ledger
            .offer_from_output(output, &token_type.raw, value)
            .context("failed to build offer")
    }

    /// Transaction with a guaranteed offer only.
    pub fn unproven_transaction_guaranteed_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<L::Transaction> {
        let guaranteed = self.unproven_offer_from_output(rng, 0)?;
        self.ledger
            .transaction_from_parts(NETWORK_ID, guaranteed, None)
            .context("failed to assemble transaction")
    }

    /// Transaction with a guaranteed offer (segment 0) and a fallible one (segment 1).
    pub fn unproven_transaction_guaranteed_and_fallible_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<L::Transaction> {
        let guaranteed = self.unproven_offer_from_output(rng, 0)?;
        let fallible = self.unproven_offer_from_output(rng, 1)?;
        self.ledger
            .transaction_from_parts(NETWORK_ID, guaranteed, Some(fallible))
            .context("failed to assemble transaction")
    }

    /// [`Self::unproven_transaction_guaranteed_with`] over the thread-local generator.
    pub fn unproven_transaction_guaranteed(&self) -> Result<L::Transaction> {
        self.unproven_transaction_guaranteed_with(&mut rand::thread_rng())
    }

    /// [`Self::unproven_transaction_guaranteed_and_fallible_with`] over the
    /// thread-local generator.
    pub fn unproven_transaction_guaranteed_and_fallible(&self) -> Result<L::Transaction> {
        self.unproven_transaction_guaranteed_and_fallible_with(&mut rand::thread_rng())
    }

    /// Ledger encoding of `transaction`.
    pub fn serialize(&self, transaction: &L::Transaction) -> Result<Vec<u8>> {
        self.ledger
            .serialize(transaction)
            .context("failed to serialize unproven transaction")
    }
}
