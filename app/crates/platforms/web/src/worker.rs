//! Worker side of the boundary
//!
//! The proving library does not expose the calling convention used here on
//! its own. The worker bundle must install an adapter object on the global
//! scope before calling [`serve`], e.g. over the library's `WasmProver`,
//! `Rng` and `CostModel` classes:
//!
//! ```js
//! self.proverModule = {
//!   initThreadPool,
//!   async prove(seed, tx, costModel, sources) { /* ... */ },
//! };
//! ```
//!
//! `prove(seed, tx, costModel, sources)` must resolve to the proven
//! transaction bytes. `costModel` is `undefined` for the initial model.
//! `sources` exposes `getParams(k)` and `resolveKey(location)`, both
//! returning promises backed by the verified parameter provider and key
//! resolver. The same `sources` object is passed to every call and stays
//! callable for the lifetime of the worker, so the adapter may keep it.

use std::{cell::OnceCell, rc::Rc};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::{StreamExt, channel::mpsc};
use js_sys::{Array, Object, Promise, Reflect, Uint8Array};
use prover::{
    CostModel, HttpFetcher, KeyLocation, KeyResolver, ParamsProvider, ProvingBackend,
    ProvingContext, ThreadPool, WorkerConfig, WorkerHost,
};
use types::{ProverMessage, ProverResponse};
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{DedicatedWorkerGlobalScope, MessageEvent};

use crate::{
    js::{call_method, installed_module, js_error, to_js_error},
    logging::init_logging,
    time::PerformanceClock,
};

/// Global property holding the prover adapter
pub const PROVER_MODULE_GLOBAL: &str = "proverModule";

/// Handle to the JS prover adapter; starts the thread pool
#[derive(Clone, Debug)]
pub struct JsProverModule {
    module: JsValue,
}

impl JsProverModule {
    /// Reads [`PROVER_MODULE_GLOBAL`] from `scope`.
    pub fn from_global(scope: &JsValue) -> Result<Self, JsValue> {
        installed_module(scope, PROVER_MODULE_GLOBAL).map(|module| Self { module })
    }

    async fn call(&self, name: &str, args: &Array) -> Result<JsValue> {
        let returned = call_method(&self.module, name, args)?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(js_error)
    }
}

#[async_trait(?Send)]
impl ThreadPool for JsProverModule {
    async fn start(&self, threads: usize) -> Result<()> {
        self.call("initThreadPool", &Array::of1(&JsValue::from(threads)))
            .await?;
        Ok(())
    }
}

/// [`ProvingBackend`] over the adapter's `prove`
pub struct JsBackend {
    module: JsProverModule,
    sources: OnceCell<KeySources>,
}

impl JsBackend {
    /// Proves through `module`.
    pub fn new(module: JsProverModule) -> Self {
        Self {
            module,
            sources: OnceCell::new(),
        }
    }

    /// Sources handed to the adapter, built on first use.
    ///
    /// Parameters arrive once per worker, so the first context's provider
    /// and resolver serve every later call.
    fn sources(&self, ctx: &ProvingContext<'_>) -> Result<&KeySources> {
        if let Some(sources) = self.sources.get() {
            return Ok(sources);
        }
        let sources = KeySources::new(ctx.params.clone(), ctx.resolver.clone())?;
        Ok(self.sources.get_or_init(|| sources))
    }
}

#[async_trait(?Send)]
impl ProvingBackend for JsBackend {
    async fn prove(
        &self,
        mut ctx: ProvingContext<'_>,
        unproven_tx: &[u8],
        cost_model: &CostModel,
    ) -> Result<Vec<u8>> {
        let sources = self.sources(&ctx)?;
        let seed = Uint8Array::from(&ctx.rng.seed()[..]);
        let cost_model = match cost_model {
            CostModel::Initial => JsValue::UNDEFINED,
            CostModel::Serialized(bytes) => Uint8Array::from(bytes.as_slice()).into(),
        };

        let proven = self
            .module
            .call(
                "prove",
                &Array::of4(
                    &seed,
                    &Uint8Array::from(unproven_tx),
                    &cost_model,
                    &sources.object,
                ),
            )
            .await?
            .dyn_into::<Uint8Array>()
            .map_err(|_| anyhow!("prove did not resolve to a Uint8Array"))?;
        Ok(proven.to_vec())
    }
}

/// `sources` argument of `prove`; the callbacks live as long as this value,
/// which [`JsBackend`] keeps for the lifetime of the worker
struct KeySources {
    object: Object,
    _get_params: Closure<dyn FnMut(u8) -> Promise>,
    _resolve_key: Closure<dyn FnMut(String) -> Promise>,
}

impl KeySources {
    fn new(params: ParamsProvider, resolver: KeyResolver) -> Result<Self> {
        let get_params = Closure::<dyn FnMut(u8) -> Promise>::new(move |k: u8| {
            let params = params.clone();
            future_to_promise(async move {
                let params = params.get_params(k).await.map_err(to_js_error)?;
                Ok(Uint8Array::from(params.as_bytes()).into())
            })
        });

        let resolve_key = Closure::<dyn FnMut(String) -> Promise>::new(move |location: String| {
            let resolver = resolver.clone();
            future_to_promise(async move {
                let material = resolver
                    .resolve_key(&KeyLocation(location))
                    .await
                    .map_err(to_js_error)?;
                let object = Object::new();
                for (name, bytes) in [
                    ("proverKey", &material.prover_key),
                    ("verifierKey", &material.verifier_key),
                    ("irSource", &material.ir_source),
                ] {
                    Reflect::set(
                        &object,
                        &JsValue::from_str(name),
                        &Uint8Array::from(bytes.as_slice()),
                    )?;
                }
                Ok(object.into())
            })
        });

        let object = Object::new();
        Reflect::set(&object, &JsValue::from_str("getParams"), get_params.as_ref())
            .map_err(js_error)?;
        Reflect::set(&object, &JsValue::from_str("resolveKey"), resolve_key.as_ref())
            .map_err(js_error)?;

        Ok(Self {
            object,
            _get_params: get_params,
            _resolve_key: resolve_key,
        })
    }
}

/// Installs the message handler and starts the worker host.
pub fn serve() -> Result<(), JsValue> {
    init_logging();

    let scope = js_sys::global().dyn_into::<DedicatedWorkerGlobalScope>()?;
    let module = JsProverModule::from_global(&scope)?;
    let concurrency = scope.navigator().hardware_concurrency();
    let threads = if concurrency.is_finite() && concurrency >= 1.0 {
        concurrency as usize
    } else {
        1
    };

    let (requests, inbound) = mpsc::unbounded::<ProverMessage>();
    let (outbound, mut responses) = mpsc::unbounded::<ProverResponse>();
    let host = WorkerHost::new(
        JsBackend::new(module.clone()),
        module,
        Rc::new(HttpFetcher::new()),
        Rc::new(PerformanceClock::new()?),
        outbound.clone(),
    )
    .with_config(WorkerConfig::with_thread_count(threads));

    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        let delivered = match serde_wasm_bindgen::from_value::<ProverMessage>(event.data()) {
            Ok(message) => {
                log::debug!("onmessage received: {message:?}");
                requests.unbounded_send(message).is_ok()
            }
            Err(err) => outbound
                .unbounded_send(ProverResponse::error(format!("malformed request: {err}")))
                .is_ok(),
        };
        if !delivered {
            log::warn!("prover host stopped, message dropped");
        }
    });
    scope.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    wasm_bindgen_futures::spawn_local(host.run(inbound));
    wasm_bindgen_futures::spawn_local(async move {
        while let Some(response) = responses.next().await {
            let posted = serde_wasm_bindgen::to_value(&response)
                .map_err(JsValue::from)
                .and_then(|value| scope.post_message(&value));
            if let Err(err) = posted {
                log::error!("failed to post {response:?}: {err:?}");
            }
        }
    });

    Ok(())
}
