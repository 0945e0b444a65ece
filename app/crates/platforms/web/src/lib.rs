//! Browser bindings
//!
//! The main thread calls [`run`], which mounts the widgets, spawns the prover
//! worker and drives it with a [`controller::Controller`]. Demo transactions
//! come from the ledger library installed as [`ledger::LEDGER_MODULE_GLOBAL`].
//! The worker bundle (`prover-worker` binary) calls [`worker::serve`].

pub mod dom;
pub mod js;
pub mod ledger;
pub mod link;
pub mod logging;
pub mod time;
pub mod worker;

use std::{cell::RefCell, rc::Rc};

use controller::{Controller, ControllerConfig};
use futures::{StreamExt, channel::mpsc};
use test_vectors::TestVectors;
use wasm_bindgen::{JsCast, prelude::*};

use crate::{
    dom::DomView,
    ledger::JsLedger,
    link::spawn_worker,
    time::{GlooTimer, PerformanceClock},
};

/// Mounts the demo page and initializes the prover worker.
///
/// `worker_script` is the URL of the worker bundle; `config` optionally
/// overrides [`ControllerConfig`] (`{ tickIntervalMs }`).
#[wasm_bindgen]
pub async fn run(worker_script: String, config: JsValue) -> Result<(), JsValue> {
    logging::init_logging();

    let config: ControllerConfig = if config.is_undefined() || config.is_null() {
        ControllerConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let base_url = window.location().href()?;
    let vectors = TestVectors::new(JsLedger::from_global(&window)?);

    let view = Rc::new(RefCell::new(DomView::mount(&document)?));
    let (link, bridge) = spawn_worker(&worker_script)?;
    let mut controller = Controller::new(
        link,
        Rc::clone(&view),
        Rc::new(PerformanceClock::new()?),
        Rc::new(GlooTimer),
        config,
    );

    controller
        .initialize(&base_url)
        .await
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let (clicks_tx, mut clicks) = mpsc::unbounded::<()>();
    let on_click = Closure::<dyn FnMut()>::new(move || {
        if clicks_tx.unbounded_send(()).is_err() {
            log::debug!("proof loop stopped, click ignored");
        }
    });
    view.borrow()
        .button()
        .set_onclick(Some(on_click.as_ref().unchecked_ref()));

    wasm_bindgen_futures::spawn_local(async move {
        let _keep_alive = (bridge, on_click);
        while clicks.next().await.is_some() {
            let serialized_tx = match demo_transaction(&vectors) {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::error!("failed to build test transaction: {err:#}");
                    continue;
                }
            };
            if let Err(err) = controller.run_proof(serialized_tx).await {
                log::warn!("proof request refused: {err}");
            }
        }
    });

    Ok(())
}

/// Ledger-serialized transaction with a guaranteed and a fallible offer.
pub fn demo_transaction(vectors: &TestVectors<JsLedger>) -> anyhow::Result<Vec<u8>> {
    let transaction = vectors.unproven_transaction_guaranteed_and_fallible()?;
    vectors.serialize(&transaction)
}
