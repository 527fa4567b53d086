pub mod display;
pub mod host;
pub mod logging;
pub mod preview;
pub mod settings;
pub mod translator;
pub mod transport;

#[cfg(test)]
mod test_util;

pub use display::{DisplayState, DisplaySurface, PreviewFrame, PreviewState};
pub use host::{ChangeListener, HostNode, Widget};
pub use preview::{install, NodePreviews, PreviewBinding, DEFAULT_JOIN};
pub use settings::{load_settings, Settings, DEFAULT_ENDPOINT};
pub use translator::{
    is_passthrough, DebouncedTranslator, TextReader, TranslatorWiring, PASSTHROUGH_PREFIX,
    SETTLE_WINDOW,
};
pub use transport::{HttpTransport, TranslationResult, Transport, TransportFuture, FAILURE_GLYPH};
