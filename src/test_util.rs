use anyhow::Result;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::display::{DisplaySurface, PreviewFrame, PreviewState};
use crate::host::{ChangeListener, HostNode, Widget};
use crate::transport::{Transport, TransportFuture, TranslationResult};

pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX.lock().expect("home lock");
    let dir = tempfile::tempdir().expect("tempdir");
    let old_home = std::env::var("HOME").ok();
    unsafe {
        std::env::set_var("HOME", dir.path());
    }
    let result = func(dir.path());
    unsafe {
        if let Some(old) = old_home {
            std::env::set_var("HOME", old);
        } else {
            std::env::remove_var("HOME");
        }
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FrameSnapshot {
    pub(crate) state: PreviewState,
    pub(crate) text: String,
    pub(crate) status: String,
}

pub(crate) type FrameLog = Arc<Mutex<Vec<FrameSnapshot>>>;

pub(crate) struct RecordingSurface {
    frames: FrameLog,
}

impl RecordingSurface {
    pub(crate) fn new() -> (Box<dyn DisplaySurface>, FrameLog) {
        let frames: FrameLog = Arc::new(Mutex::new(Vec::new()));
        let surface = RecordingSurface {
            frames: frames.clone(),
        };
        (Box::new(surface), frames)
    }
}

impl DisplaySurface for RecordingSurface {
    fn render(&mut self, frame: PreviewFrame<'_>) {
        self.frames.lock().push(FrameSnapshot {
            state: frame.state,
            text: frame.text.to_string(),
            status: frame.status.to_string(),
        });
    }
}

struct ScriptedReply {
    delay: Duration,
    result: TranslationResult,
}

#[derive(Clone)]
pub(crate) struct MockTransport {
    calls: Arc<Mutex<Vec<(String, String)>>>,
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    fallback: Arc<dyn Fn(&str, &str) -> TranslationResult + Send + Sync>,
}

impl MockTransport {
    pub(crate) fn echoing() -> Self {
        Self::with_fallback(Arc::new(|text, _engine| TranslationResult {
            success: true,
            translated_text: format!("en:{}", text),
            status_label: "ok".to_string(),
        }))
    }

    pub(crate) fn failing(detail: &str) -> Self {
        let detail = detail.to_string();
        Self::with_fallback(Arc::new(move |_text, _engine| {
            TranslationResult::failure(detail.clone())
        }))
    }

    fn with_fallback(
        fallback: Arc<dyn Fn(&str, &str) -> TranslationResult + Send + Sync>,
    ) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
        }
    }

    pub(crate) fn push_reply(&self, delay: Duration, result: TranslationResult) {
        self.script.lock().push_back(ScriptedReply { delay, result });
    }

    pub(crate) fn push_failure(&self, detail: &str) {
        self.push_reply(Duration::ZERO, TranslationResult::failure(detail));
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Transport for MockTransport {
    fn translate(&self, text: &str, engine: &str) -> TransportFuture {
        self.calls
            .lock()
            .push((text.to_string(), engine.to_string()));
        let reply = match self.script.lock().pop_front() {
            Some(scripted) => scripted,
            None => ScriptedReply {
                delay: Duration::ZERO,
                result: (self.fallback)(text, engine),
            },
        };
        Box::pin(async move {
            if reply.delay > Duration::ZERO {
                sleep(reply.delay).await;
            }
            reply.result
        })
    }
}

pub(crate) struct FakeWidget {
    value: Mutex<String>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl FakeWidget {
    pub(crate) fn with_value(value: &str) -> Arc<Self> {
        Arc::new(Self {
            value: Mutex::new(value.to_string()),
            listeners: Mutex::new(Vec::new()),
        })
    }

    // A user edit notifies listeners; a programmatic set_value must not.
    pub(crate) fn edit(&self, value: &str) {
        *self.value.lock() = value.to_string();
        for listener in self.listeners.lock().iter() {
            listener();
        }
    }

    pub(crate) fn value(&self) -> String {
        self.value.lock().clone()
    }
}

impl Widget for FakeWidget {
    fn get_value(&self) -> String {
        self.value.lock().clone()
    }

    fn set_value(&self, value: String) {
        *self.value.lock() = value;
    }

    fn on_change(&self, listener: ChangeListener) {
        self.listeners.lock().push(listener);
    }
}

pub(crate) struct FakeNode {
    widgets: Mutex<HashMap<String, Arc<FakeWidget>>>,
    frames: Mutex<HashMap<String, FrameLog>>,
    redraws: AtomicUsize,
}

impl FakeNode {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            widgets: Mutex::new(HashMap::new()),
            frames: Mutex::new(HashMap::new()),
            redraws: AtomicUsize::new(0),
        })
    }

    pub(crate) fn add_widget(&self, name: &str, widget: Arc<FakeWidget>) {
        self.widgets.lock().insert(name.to_string(), widget);
    }

    pub(crate) fn widget_named(&self, name: &str) -> Arc<FakeWidget> {
        self.widgets.lock().get(name).expect("widget").clone()
    }

    pub(crate) fn frames(&self, surface_name: &str) -> Vec<FrameSnapshot> {
        self.frames
            .lock()
            .get(surface_name)
            .map(|log| log.lock().clone())
            .unwrap_or_default()
    }

    pub(crate) fn redraw_count(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }
}

impl HostNode for FakeNode {
    fn widget(&self, name: &str) -> Option<Arc<dyn Widget>> {
        self.widgets
            .lock()
            .get(name)
            .map(|widget| widget.clone() as Arc<dyn Widget>)
    }

    fn mount_surface(&self, name: &str) -> Result<Box<dyn DisplaySurface>> {
        let (surface, log) = RecordingSurface::new();
        self.frames.lock().insert(name.to_string(), log);
        Ok(surface)
    }

    fn request_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }
}
