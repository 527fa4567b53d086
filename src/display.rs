pub const STATUS_WAITING: &str = "— waiting for text —";
pub const STATUS_LOADING: &str = "⏳ translating...";
pub const STATUS_DISABLED: &str = "ℹ️ translation disabled";
pub const STATUS_TRANSLATED: &str = "✅ translated";
pub const STATUS_FAILED: &str = "❌ failed";

pub const PLACEHOLDER_EMPTY: &str = "type to see the translation...";
pub const PLACEHOLDER_LOADING: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Empty,
    Loading,
    Disabled,
    Result,
    Error,
}

#[derive(Debug, Clone, Copy)]
pub struct PreviewFrame<'a> {
    pub state: PreviewState,
    pub text: &'a str,
    pub status: &'a str,
}

pub trait DisplaySurface: Send {
    fn render(&mut self, frame: PreviewFrame<'_>);
}

pub struct DisplayState {
    state: PreviewState,
    visible_text: String,
    status_label: String,
    propagated_value: String,
    surface: Box<dyn DisplaySurface>,
}

impl DisplayState {
    pub fn new(surface: Box<dyn DisplaySurface>) -> Self {
        let mut display = Self {
            state: PreviewState::Empty,
            visible_text: PLACEHOLDER_EMPTY.to_string(),
            status_label: STATUS_WAITING.to_string(),
            propagated_value: String::new(),
            surface,
        };
        display.render();
        display
    }

    pub fn set_empty(&mut self) {
        self.state = PreviewState::Empty;
        self.visible_text = PLACEHOLDER_EMPTY.to_string();
        self.status_label = STATUS_WAITING.to_string();
        self.propagated_value.clear();
        self.render();
    }

    // The previous propagated value stays live while a request is in flight.
    pub fn set_loading(&mut self) {
        self.state = PreviewState::Loading;
        self.visible_text = PLACEHOLDER_LOADING.to_string();
        self.status_label = STATUS_LOADING.to_string();
        self.render();
    }

    pub fn set_disabled(&mut self, raw_text: &str) {
        self.state = PreviewState::Disabled;
        self.visible_text = raw_text.to_string();
        self.status_label = STATUS_DISABLED.to_string();
        self.propagated_value = raw_text.to_string();
        self.render();
    }

    pub fn set_result(&mut self, translated: &str, status: &str) {
        self.state = PreviewState::Result;
        self.visible_text = translated.to_string();
        self.status_label = if status.trim().is_empty() {
            STATUS_TRANSLATED.to_string()
        } else {
            status.to_string()
        };
        self.propagated_value = translated.to_string();
        self.render();
    }

    pub fn set_error(&mut self, message: &str) {
        self.state = PreviewState::Error;
        self.visible_text = message.to_string();
        self.status_label = STATUS_FAILED.to_string();
        self.propagated_value.clear();
        self.render();
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn displayed_text(&self) -> &str {
        &self.visible_text
    }

    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    pub fn propagated_value(&self) -> &str {
        &self.propagated_value
    }

    fn render(&mut self) {
        let frame = PreviewFrame {
            state: self.state,
            text: &self.visible_text,
            status: &self.status_label,
        };
        self.surface.render(frame);
    }
}
