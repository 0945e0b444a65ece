//! Controller state machine
//!
//! `Starting` → [`Controller::initialize`] → `Ready` ⇄ `Proving`.
//! A failed handshake moves to `Failed`, which refuses every proof.

use core::{cell::RefCell, time::Duration};
use std::rc::Rc;

use futures::{
    Stream, StreamExt,
    channel::mpsc::UnboundedSender,
    future::{self, LocalBoxFuture},
    stream::LocalBoxStream,
};
use thiserror::Error;
use types::{Clock, ProverMessage, ProverResponse, Timer, WorkerEvent, hex::to_hex};

use crate::{
    config::ControllerConfig,
    ticker::{format_elapsed, tick_elapsed},
    view::{PROVING_LABEL, START_LABEL, StatusTone, UNAVAILABLE_LABEL, View},
};

/// Controller failure that prevents a proof from being attempted
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The handshake has not completed
    #[error("prover worker is not ready")]
    NotReady,
    /// A proof is already outstanding
    #[error("a proof is already in progress")]
    Busy,
    /// The worker reported an error during the handshake
    #[error("{0}")]
    Setup(String),
    /// The worker went away
    #[error("worker channel closed")]
    Disconnected,
}

/// Terminal outcome of one proof request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofOutcome {
    /// `success` from the worker
    Proved {
        /// Proven transaction bytes
        data: Vec<u8>,
        /// Worker-measured proving time
        duration_ms: u64,
    },
    /// `error` from the worker
    Failed(String),
    /// The worker boundary failed
    WorkerFailed(String),
}

/// Where the controller is in the worker lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Handshake not finished
    Starting,
    /// Accepting proof requests
    Ready,
    /// One proof outstanding
    Proving,
    /// Handshake failed
    Failed,
}

/// Both directions of the worker boundary, as seen from the main thread
pub struct WorkerLink {
    requests: UnboundedSender<ProverMessage>,
    events: LocalBoxStream<'static, WorkerEvent>,
}

impl WorkerLink {
    /// Wraps a request sender and a stream of worker events.
    pub fn new(
        requests: UnboundedSender<ProverMessage>,
        events: impl Stream<Item = WorkerEvent> + 'static,
    ) -> Self {
        Self {
            requests,
            events: events.boxed_local(),
        }
    }

    fn send(&self, message: ProverMessage) -> Result<(), ControllerError> {
        self.requests
            .unbounded_send(message)
            .map_err(|_| ControllerError::Disconnected)
    }
}

/// Drives the worker and renders its progress
pub struct Controller<V> {
    link: WorkerLink,
    view: Rc<RefCell<V>>,
    clock: Rc<dyn Clock>,
    timer: Rc<dyn Timer>,
    config: ControllerConfig,
    phase: Phase,
}

impl<V: View> Controller<V> {
    /// Creates a controller in the `Starting` phase.
    pub fn new(
        link: WorkerLink,
        view: Rc<RefCell<V>>,
        clock: Rc<dyn Clock>,
        timer: Rc<dyn Timer>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            link,
            view,
            clock,
            timer,
            config,
            phase: Phase::Starting,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Shared handle to the view
    pub fn view(&self) -> &Rc<RefCell<V>> {
        &self.view
    }

    /// Waits for `wasm-ready`, sends `params` and waits for `params-ready`,
    /// then enables the proof button.
    pub async fn initialize(&mut self, base_url: &str) -> Result<(), ControllerError> {
        if self.phase != Phase::Starting {
            return Err(ControllerError::NotReady);
        }
        log::info!("baseUrl: {base_url}");

        if let Err(err) = self.handshake(base_url).await {
            self.phase = Phase::Failed;
            let mut view = self.view.borrow_mut();
            view.set_button(false, UNAVAILABLE_LABEL);
            view.set_status(&format!("Worker setup failed: {err}"), StatusTone::Failure);
            return Err(err);
        }

        log::info!("Worker initialized and ready for proving");
        self.phase = Phase::Ready;
        self.view.borrow_mut().set_button(true, START_LABEL);
        Ok(())
    }

    async fn handshake(&mut self, base_url: &str) -> Result<(), ControllerError> {
        self.await_setup(|response| matches!(response, ProverResponse::WasmReady))
            .await?;
        self.link.send(ProverMessage::Params {
            base_url: base_url.to_string(),
        })?;
        self.await_setup(|response| matches!(response, ProverResponse::ParamsReady))
            .await
    }

    /// Consumes events until `wanted` matches, forwarding logs.
    async fn await_setup(
        &mut self,
        wanted: impl Fn(&ProverResponse) -> bool,
    ) -> Result<(), ControllerError> {
        loop {
            match self.link.events.next().await {
                Some(WorkerEvent::Response(response)) if wanted(&response) => return Ok(()),
                Some(WorkerEvent::Response(ProverResponse::Log { message })) => {
                    log::info!("{message}");
                }
                Some(WorkerEvent::Response(ProverResponse::Error { message })) => {
                    return Err(ControllerError::Setup(message));
                }
                Some(WorkerEvent::Failure(message)) => return Err(ControllerError::Setup(message)),
                Some(WorkerEvent::Response(other)) => {
                    log::warn!("ignoring unexpected response during setup: {other:?}");
                }
                None => return Err(ControllerError::Disconnected),
            }
        }
    }

    /// Sends one transaction for proving and renders its outcome.
    ///
    /// Refused unless the controller is `Ready`; the worker is never sent a
    /// second request while one is outstanding.
    pub async fn run_proof(&mut self, serialized_tx: Vec<u8>) -> Result<ProofOutcome, ControllerError> {
        match self.phase {
            Phase::Ready => {}
            Phase::Proving => return Err(ControllerError::Busy),
            Phase::Starting | Phase::Failed => return Err(ControllerError::NotReady),
        }
        self.phase = Phase::Proving;

        {
            let mut view = self.view.borrow_mut();
            view.set_button(false, PROVING_LABEL);
            view.set_time(&format_elapsed(Duration::ZERO));
            view.set_status("Proving in progress...", StatusTone::Pending);
            view.set_result("");
        }

        let start = self.clock.now();
        let outcome = match self.link.send(ProverMessage::Prove { serialized_tx }) {
            Ok(()) => self.await_outcome_with_ticker(start).await,
            Err(err) => ProofOutcome::WorkerFailed(err.to_string()),
        };

        self.render(&outcome);
        self.phase = Phase::Ready;
        Ok(outcome)
    }

    async fn await_outcome_with_ticker(&mut self, start: Duration) -> ProofOutcome {
        let (ticker, cancel) = future::abortable(tick_elapsed(
            self.view.as_ref(),
            self.clock.as_ref(),
            self.timer.as_ref(),
            start,
            self.config.tick_interval(),
        ));

        let events = &mut self.link.events;
        let terminal: LocalBoxFuture<'_, ProofOutcome> = Box::pin(async move {
            let outcome = await_terminal(events).await;
            cancel.abort();
            outcome
        });

        let (outcome, _aborted) = future::join(terminal, ticker).await;
        outcome
    }

    fn render(&self, outcome: &ProofOutcome) {
        let mut view = self.view.borrow_mut();
        view.set_button(true, START_LABEL);
        match outcome {
            ProofOutcome::Proved { data, duration_ms } => {
                view.set_status(
                    &format!("Proof completed successfully! ({duration_ms}ms)"),
                    StatusTone::Success,
                );
                view.set_result(&to_hex(data));
            }
            ProofOutcome::Failed(message) => {
                view.set_status(&format!("Proof failed: {message}"), StatusTone::Failure);
            }
            ProofOutcome::WorkerFailed(message) => {
                view.set_status(&format!("Worker error: {message}"), StatusTone::Failure);
            }
        }
    }
}

/// Consumes events until the terminal one, forwarding logs.
async fn await_terminal(events: &mut LocalBoxStream<'static, WorkerEvent>) -> ProofOutcome {
    loop {
        match events.next().await {
            Some(WorkerEvent::Response(ProverResponse::Log { message })) => log::info!("{message}"),
            Some(WorkerEvent::Response(ProverResponse::Success { data, duration_ms })) => {
                return ProofOutcome::Proved { data, duration_ms };
            }
            Some(WorkerEvent::Response(ProverResponse::Error { message })) => {
                return ProofOutcome::Failed(message);
            }
            Some(WorkerEvent::Failure(message)) => return ProofOutcome::WorkerFailed(message),
            Some(WorkerEvent::Response(other)) => {
                log::warn!("ignoring unexpected response while proving: {other:?}");
            }
            None => return ProofOutcome::WorkerFailed(ControllerError::Disconnected.to_string()),
        }
    }
}
