//! UI surface driven by the controller

/// Label of the proof button while it accepts clicks
pub const START_LABEL: &str = "Start Proof";
/// Label of the proof button while a proof runs
pub const PROVING_LABEL: &str = "Proving...";
/// Label of the proof button before the worker is ready
pub const INITIALIZING_LABEL: &str = "Initializing...";
/// Label of the proof button after setup failed
pub const UNAVAILABLE_LABEL: &str = "Prover unavailable";

/// Colour class of the status line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusTone {
    /// Nothing happening
    #[default]
    Idle,
    /// Proof in progress
    Pending,
    /// Last proof succeeded
    Success,
    /// Last proof or setup failed
    Failure,
}

impl StatusTone {
    /// CSS colour used by the DOM view
    pub fn color(self) -> &'static str {
        match self {
            Self::Idle => "gray",
            Self::Pending => "blue",
            Self::Success => "green",
            Self::Failure => "red",
        }
    }
}

/// Sink for UI updates
pub trait View {
    /// Updates the proof button.
    fn set_button(&mut self, enabled: bool, label: &str);
    /// Updates the elapsed-time label.
    fn set_time(&mut self, text: &str);
    /// Updates the status label.
    fn set_status(&mut self, text: &str, tone: StatusTone);
    /// Updates the hex result label.
    fn set_result(&mut self, text: &str);
}

/// Plain snapshot of the widgets
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiState {
    /// Whether the proof button accepts clicks
    pub button_enabled: bool,
    /// Proof button label
    pub button_label: String,
    /// Elapsed-time label
    pub time: String,
    /// Status label
    pub status: String,
    /// Status colour
    pub tone: StatusTone,
    /// Hex result label
    pub result: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            button_enabled: false,
            button_label: INITIALIZING_LABEL.to_string(),
            time: "Elapsed time: 0m 0s".to_string(),
            status: "Ready to start proof".to_string(),
            tone: StatusTone::Idle,
            result: String::new(),
        }
    }
}

impl View for UiState {
    fn set_button(&mut self, enabled: bool, label: &str) {
        self.button_enabled = enabled;
        self.button_label = label.to_string();
    }

    fn set_time(&mut self, text: &str) {
        self.time = text.to_string();
    }

    fn set_status(&mut self, text: &str, tone: StatusTone) {
        self.status = text.to_string();
        self.tone = tone;
    }

    fn set_result(&mut self, text: &str) {
        self.result = text.to_string();
    }
}
