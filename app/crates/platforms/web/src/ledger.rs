//! Ledger library bindings
//!
//! The page bundle installs the ledger library on the window before calling
//! [`crate::run`]:
//!
//! ```js
//! import * as ledger from "@midnight-ntwrk/ledger-v6";
//! window.ledger = ledger;
//! ```
//!
//! Every builder below is a plain call into that module, so the bytes sent
//! to the worker are the ledger's own transaction encoding.

use anyhow::{Context, Result, anyhow};
use js_sys::{Array, BigInt, Uint8Array};
use test_vectors::Ledger;
use wasm_bindgen::{JsCast, JsValue};

use crate::js::{call_method, installed_module, property};

/// Global property holding the ledger library
pub const LEDGER_MODULE_GLOBAL: &str = "ledger";

/// [`Ledger`] over the JS ledger module
#[derive(Clone, Debug)]
pub struct JsLedger {
    module: JsValue,
}

impl JsLedger {
    /// Reads [`LEDGER_MODULE_GLOBAL`] from `scope`.
    pub fn from_global(scope: &JsValue) -> Result<Self, JsValue> {
        installed_module(scope, LEDGER_MODULE_GLOBAL).map(|module| Self { module })
    }

    fn call(&self, name: &str, args: &Array) -> Result<JsValue> {
        call_method(&self.module, name, args).with_context(|| format!("ledger.{name} failed"))
    }

    fn call_static(&self, class: &str, name: &str, args: &Array) -> Result<JsValue> {
        let class_object = property(&self.module, class)?;
        call_method(&class_object, name, args)
            .with_context(|| format!("ledger.{class}.{name} failed"))
    }

    fn string(&self, name: &str) -> Result<String> {
        self.call(name, &Array::new())?
            .as_string()
            .ok_or_else(|| anyhow!("ledger.{name} did not return a string"))
    }
}

impl Ledger for JsLedger {
    type CoinInfo = JsValue;
    type Output = JsValue;
    type Offer = JsValue;
    type Transaction = JsValue;

    fn sample_coin_public_key(&self) -> Result<String> {
        self.string("sampleCoinPublicKey")
    }

    fn sample_encryption_public_key(&self) -> Result<String> {
        self.string("sampleEncryptionPublicKey")
    }

    fn create_shielded_coin_info(&self, token_type: &str, value: u128) -> Result<JsValue> {
        self.call(
            "createShieldedCoinInfo",
            &Array::of2(&JsValue::from_str(token_type), &BigInt::from(value)),
        )
    }

    fn output(
        &self,
        coin: JsValue,
        segment: u16,
        target_coin_public_key: &str,
        target_encryption_public_key: &str,
    ) -> Result<JsValue> {
        self.call_static(
            "ZswapOutput",
            "new",
            &Array::of4(
                &coin,
                &JsValue::from(segment),
                &JsValue::from_str(target_coin_public_key),
                &JsValue::from_str(target_encryption_public_key),
            ),
        )
    }

    fn offer_from_output(&self, output: JsValue, token_type: &str, value: u128) -> Result<JsValue> {
        self.call_static(
            "ZswapOffer",
            "fromOutput",
            &Array::of3(&output, &JsValue::from_str(token_type), &BigInt::from(value)),
        )
    }

    fn transaction_from_parts(
        &self,
        network_id: &str,
        guaranteed: JsValue,
        fallible: Option<JsValue>,
    ) -> Result<JsValue> {
        let args = Array::of2(&JsValue::from_str(network_id), &guaranteed);
        if let Some(fallible) = fallible {
            args.push(&fallible);
        }
        self.call_static("Transaction", "fromParts", &args)
    }

    fn serialize(&self, transaction: &JsValue) -> Result<Vec<u8>> {
        let bytes = call_method(transaction, "serialize", &Array::new())
            .context("transaction.serialize failed")?
            .dyn_into::<Uint8Array>()
            .map_err(|_| anyhow!("transaction.serialize did not return a Uint8Array"))?;
        Ok(bytes.to_vec())
    }
}
