//! Worker host
//!
//! Owns the prover session and answers [`ProverMessage`]s arriving on one
//! channel with [`ProverResponse`]s on another. The handshake is strict:
//!
//! 1. start the thread pool, then `wasm-ready`
//! 2. `params` builds the session, then `params-ready`
//! 3. each `prove` yields exactly one `success` or `error`
//!
//! Requests that arrive out of order are refused with an `error` rather than
//! queued: a `prove` before `params-ready`, a `prove` while another one is
//! in flight, and a second `params`.

use std::{mem, rc::Rc};

use futures::{
    StreamExt,
    channel::mpsc::{UnboundedReceiver, UnboundedSender},
    future::{self, Either, LocalBoxFuture},
};
use types::{Clock, ProtocolError, ProverMessage, ProverResponse, elapsed_ms, hex::to_hex};
use url::Url;

use crate::{
    cost_model::CostModel,
    fetch::Fetch,
    params::ParamsProvider,
    pool::{ThreadPool, WorkerConfig},
    prover::{Prover, ProvingBackend},
    resolver::KeyResolver,
    rng::ProverRng,
};

/// State created by `params` and kept for the lifetime of the worker
struct Session<B> {
    prover: Rc<Prover<B>>,
    rng: ProverRng,
}

enum HostState<B> {
    /// Pool failed to start; every request is refused
    Unavailable(String),
    /// Pool is up, waiting for a base URL
    AwaitingParams(B),
    Ready(Session<B>),
}

type InFlight = LocalBoxFuture<'static, ProverResponse>;

/// Serves one controller over a pair of channels
pub struct WorkerHost<B> {
    pool: Box<dyn ThreadPool>,
    fetcher: Rc<dyn Fetch>,
    clock: Rc<dyn Clock>,
    config: WorkerConfig,
    outbound: UnboundedSender<ProverResponse>,
    state: HostState<B>,
}

impl<B: ProvingBackend + 'static> WorkerHost<B> {
    /// Creates a host that will prove with `backend` once parameters arrive.
    pub fn new(
        backend: B,
        pool: impl ThreadPool + 'static,
        fetcher: Rc<dyn Fetch>,
        clock: Rc<dyn Clock>,
        outbound: UnboundedSender<ProverResponse>,
    ) -> Self {
        Self {
            pool: Box::new(pool),
            fetcher,
            clock,
            config: WorkerConfig::default(),
            outbound,
            state: HostState::AwaitingParams(backend),
        }
    }

    /// Overrides the worker configuration.
    pub fn with_config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs until the controller closes its channel and any in-flight proof
    /// has been answered.
    pub async fn run(mut self, mut inbound: UnboundedReceiver<ProverMessage>) {
        self.start().await;

        let mut in_flight: Option<InFlight> = None;
        loop {
            let Some(proof) = in_flight.take() else {
                match inbound.next().await {
                    Some(message) => in_flight = self.handle(message),
                    None => break,
                }
                continue;
            };

            match future::select(proof, inbound.next()).await {
                Either::Left((response, _)) => post(&self.outbound, response),
                Either::Right((Some(message), proof)) => {
                    self.handle_while_busy(message);
                    in_flight = Some(proof);
                }
                Either::Right((None, proof)) => {
                    let response = proof.await;
                    post(&self.outbound, response);
                    break;
                }
            }
        }
        log::debug!("controller closed the channel, prover worker stops");
    }

    async fn start(&mut self) {
        let threads = self.config.threads();
        match self.pool.start(threads).await {
            Ok(()) => {
                log::info!("worker pool initialized with {threads} threads");
                post(
                    &self.outbound,
                    ProverResponse::log(format!("worker pool initialized with {threads} threads")),
                );
                post(&self.outbound, ProverResponse::WasmReady);
            }
            Err(err) => {
                let reason = format!("{err:#}");
                log::error!("failed to start worker pool: {reason}");
                post(
                    &self.outbound,
                    ProverResponse::error(ProtocolError::RuntimeUnavailable(reason.clone()).to_string()),
                );
                self.state = HostState::Unavailable(reason);
            }
        }
    }

    fn handle(&mut self, message: ProverMessage) -> Option<InFlight> {
        match message {
            ProverMessage::Params { base_url } => {
                self.init_params(base_url);
                None
            }
            ProverMessage::Prove { serialized_tx } => self.start_proof(serialized_tx),
        }
    }

    fn handle_while_busy(&mut self, message: ProverMessage) {
        match message {
            ProverMessage::Params { base_url } => self.init_params(base_url),
            ProverMessage::Prove { .. } => {
                log::warn!("rejecting prove request, another proof is in flight");
                reject(&self.outbound, ProtocolError::Busy);
            }
        }
    }

    fn init_params(&mut self, base_url: String) {
        let placeholder = HostState::Unavailable(String::from("initialization in progress"));
        self.state = match mem::replace(&mut self.state, placeholder) {
            HostState::AwaitingParams(backend) => self.build_session(base_url, backend),
            HostState::Ready(session) => {
                reject(&self.outbound, ProtocolError::AlreadyInitialized);
                HostState::Ready(session)
            }
            HostState::Unavailable(reason) => {
                reject(
                    &self.outbound,
                    ProtocolError::RuntimeUnavailable(reason.clone()),
                );
                HostState::Unavailable(reason)
            }
        };
    }

    fn build_session(&self, base_url: String, backend: B) -> HostState<B> {
        log::info!("initializing params with baseUrl: {base_url}");
        post(
            &self.outbound,
            ProverResponse::log(format!("initializing params with baseUrl: {base_url}")),
        );

        let url = match Url::parse(&base_url) {
            Ok(url) => url,
            Err(err) => {
                post(
                    &self.outbound,
                    ProverResponse::error(format!("invalid base url {base_url}: {err}")),
                );
                return HostState::AwaitingParams(backend);
            }
        };

        let rng = match ProverRng::from_entropy() {
            Ok(rng) => rng,
            Err(err) => {
                post(
                    &self.outbound,
                    ProverResponse::error(format!("failed to seed random source: {err}")),
                );
                return HostState::AwaitingParams(backend);
            }
        };

        let resolver = KeyResolver::new(url.as_str(), Rc::clone(&self.fetcher));
        let params = ParamsProvider::new(url.as_str(), Rc::clone(&self.fetcher));
        let prover = Rc::new(Prover::new(resolver, params, backend));

        post(&self.outbound, ProverResponse::ParamsReady);
        HostState::Ready(Session { prover, rng })
    }

    fn start_proof(&mut self, serialized_tx: Vec<u8>) -> Option<InFlight> {
        let session = match &mut self.state {
            HostState::Ready(session) => session,
            HostState::AwaitingParams(_) => {
                log::warn!("rejecting prove request before params");
                reject(&self.outbound, ProtocolError::NotInitialized);
                return None;
            }
            HostState::Unavailable(reason) => {
                reject(
                    &self.outbound,
                    ProtocolError::RuntimeUnavailable(reason.clone()),
                );
                return None;
            }
        };

        let prover = Rc::clone(&session.prover);
        let rng = session.rng.fork();
        let clock = Rc::clone(&self.clock);
        let outbound = self.outbound.clone();

        post(
            &outbound,
            ProverResponse::log(format!(
                "proving transaction of {} bytes",
                serialized_tx.len()
            )),
        );

        Some(Box::pin(async move {
            let start = clock.now();
            let result = prover
                .prove(rng, &serialized_tx, &CostModel::initial())
                .await;
            let duration_ms = elapsed_ms(start, clock.now());

            match result {
                Ok(data) => {
                    log::info!("proven raw tx: {}", to_hex(&data));
                    post(
                        &outbound,
                        ProverResponse::log(format!("proof generated in {duration_ms}ms")),
                    );
                    ProverResponse::Success { data, duration_ms }
                }
                Err(err) => {
                    log::warn!("proving failed after {duration_ms}ms: {err:#}");
                    ProverResponse::error(err.to_string())
                }
            }
        }))
    }
}

fn reject(outbound: &UnboundedSender<ProverResponse>, err: ProtocolError) {
    post(outbound, ProverResponse::error(err.to_string()));
}

fn post(outbound: &UnboundedSender<ProverResponse>, response: ProverResponse) {
    if outbound.unbounded_send(response).is_err() {
        log::debug!("controller is gone, dropping response");
    }
}
