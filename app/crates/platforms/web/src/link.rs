//! Main-thread side of the worker boundary
//!
//! Messages cross `postMessage` as structured objects (`{ type: ... }`,
//! byte fields as `Uint8Array`).

use controller::WorkerLink;
use futures::{StreamExt, channel::mpsc};
use types::{ProverMessage, ProverResponse, WorkerEvent};
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{ErrorEvent, MessageEvent, Worker, WorkerOptions, WorkerType};

/// Keeps the worker and its event handlers alive; terminates it on drop
pub struct WorkerBridge {
    worker: Worker,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(ErrorEvent)>,
}

impl Drop for WorkerBridge {
    fn drop(&mut self) {
        self.worker.set_onmessage(None);
        self.worker.set_onerror(None);
        self.worker.terminate();
    }
}

/// Starts the module worker at `script_url` and connects it to a
/// [`WorkerLink`].
pub fn spawn_worker(script_url: &str) -> Result<(WorkerLink, WorkerBridge), JsValue> {
    let options = WorkerOptions::new();
    options.set_type(WorkerType::Module);
    let worker = Worker::new_with_options(script_url, &options)?;

    let (events_tx, events) = mpsc::unbounded::<WorkerEvent>();

    let on_message = Closure::<dyn FnMut(MessageEvent)>::new({
        let events_tx = events_tx.clone();
        move |event: MessageEvent| {
            let event = match serde_wasm_bindgen::from_value::<ProverResponse>(event.data()) {
                Ok(response) => WorkerEvent::Response(response),
                Err(err) => WorkerEvent::Failure(format!("malformed worker message: {err}")),
            };
            forward(&events_tx, event);
        }
    });
    worker.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

    let on_error = Closure::<dyn FnMut(ErrorEvent)>::new({
        let events_tx = events_tx.clone();
        move |event: ErrorEvent| {
            event.prevent_default();
            forward(&events_tx, WorkerEvent::Failure(event.message()));
        }
    });
    worker.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    let (requests, mut outgoing) = mpsc::unbounded::<ProverMessage>();
    wasm_bindgen_futures::spawn_local({
        let worker = worker.clone();
        async move {
            while let Some(message) = outgoing.next().await {
                let posted = serde_wasm_bindgen::to_value(&message)
                    .map_err(|err| err.to_string())
                    .and_then(|value| {
                        worker
                            .post_message(&value)
                            .map_err(|err| format!("{err:?}"))
                    });
                if let Err(err) = posted {
                    log::error!("failed to post {message:?}: {err}");
                    forward(&events_tx, WorkerEvent::Failure(err));
                }
            }
        }
    });

    let bridge = WorkerBridge {
        worker,
        _on_message: on_message,
        _on_error: on_error,
    };
    Ok((WorkerLink::new(requests, events), bridge))
}

fn forward(events: &mpsc::UnboundedSender<WorkerEvent>, event: WorkerEvent) {
    if events.unbounded_send(event).is_err() {
        log::debug!("controller gone, dropping worker event");
    }
}
