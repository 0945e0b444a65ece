//! Messages exchanged between the main thread and the prover worker
//!
//! Both enums are internally tagged by a `type` field so that, across the
//! browser boundary, they are plain objects such as
//! `{ type: "params", baseUrl: "https://..." }`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request sent from the controller to the worker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProverMessage {
    /// Build the prover from parameters hosted under `base_url`
    #[serde(rename_all = "camelCase")]
    Params {
        /// Base URL the parameter provider and key resolver fetch from
        base_url: String,
    },
    /// Prove one serialized unproven transaction
    #[serde(rename_all = "camelCase")]
    Prove {
        /// Opaque serialized transaction
        #[serde(with = "serde_bytes")]
        serialized_tx: Vec<u8>,
    },
}

/// Response sent from the worker to the controller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProverResponse {
    /// Runtime and thread pool are up
    WasmReady,
    /// Prover is built and accepts `prove` requests
    ParamsReady,
    /// Human readable progress line, never terminal
    Log {
        /// Log line
        message: String,
    },
    /// Proof finished
    #[serde(rename_all = "camelCase")]
    Success {
        /// Proven transaction bytes
        #[serde(with = "serde_bytes")]
        data: Vec<u8>,
        /// Wall-clock proving time, rounded to whole milliseconds
        duration_ms: u64,
    },
    /// Request failed
    Error {
        /// Failure description
        message: String,
    },
}

impl ProverResponse {
    /// Builds a log response.
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
        }
    }

    /// Builds an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether this response ends a `prove` request.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }
}

/// What the controller observes from its worker
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkerEvent {
    /// A response posted by the worker
    Response(ProverResponse),
    /// The worker boundary itself failed, e.g. an uncaught exception
    Failure(String),
}

impl From<ProverResponse> for WorkerEvent {
    fn from(response: ProverResponse) -> Self {
        Self::Response(response)
    }
}

/// Requests the worker refuses in its current state
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A `prove` arrived before `params-ready`
    #[error("prover is not initialized: send params first")]
    NotInitialized,
    /// A `prove` arrived while another one is in flight
    #[error("prover is busy with another request")]
    Busy,
    /// A second `params` arrived after the prover was built
    #[error("prover parameters are already initialized")]
    AlreadyInitialized,
    /// The runtime failed to start, nothing can be served
    #[error("prover runtime is unavailable: {0}")]
    RuntimeUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_message_uses_protocol_field_names() {
        let msg = ProverMessage::Params {
            base_url: "https://example.test/".into(),
        };
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(
            value,
            json!({ "type": "params", "baseUrl": "https://example.test/" })
        );
    }

    #[test]
    fn prove_message_parses_from_protocol_object() {
        let value = json!({ "type": "prove", "serializedTx": [0, 1, 2] });
        let msg: ProverMessage = serde_json::from_value(value).expect("deserialize");
        assert_eq!(
            msg,
            ProverMessage::Prove {
                serialized_tx: vec![0, 1, 2]
            }
        );
    }

    #[test]
    fn responses_use_kebab_case_tags() {
        let ready = serde_json::to_value(ProverResponse::WasmReady).expect("serialize");
        assert_eq!(ready, json!({ "type": "wasm-ready" }));

        let params = serde_json::to_value(ProverResponse::ParamsReady).expect("serialize");
        assert_eq!(params, json!({ "type": "params-ready" }));

        let success = serde_json::to_value(ProverResponse::Success {
            data: vec![1, 2, 3],
            duration_ms: 10,
        })
        .expect("serialize");
        assert_eq!(
            success,
            json!({ "type": "success", "data": [1, 2, 3], "durationMs": 10 })
        );
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let value = json!({ "type": "shutdown" });
        assert!(serde_json::from_value::<ProverMessage>(value).is_err());
    }

    #[test]
    fn only_success_and_error_are_terminal() {
        assert!(!ProverResponse::WasmReady.is_terminal());
        assert!(!ProverResponse::ParamsReady.is_terminal());
        assert!(!ProverResponse::log("step").is_terminal());
        assert!(ProverResponse::error("bad input").is_terminal());
        assert!(
            ProverResponse::Success {
                data: vec![],
                duration_ms: 0
            }
            .is_terminal()
        );
    }

    #[test]
    fn protocol_errors_render_for_the_status_line() {
        assert_eq!(
            ProtocolError::Busy.to_string(),
            "prover is busy with another request"
        );
        assert_eq!(
            ProtocolError::RuntimeUnavailable("no threads".into()).to_string(),
            "prover runtime is unavailable: no threads"
        );
    }
}
