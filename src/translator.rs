use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::display::{DisplayState, PreviewState};
use crate::host::{ChangeListener, HostNode, Widget};
use crate::transport::Transport;

pub const SETTLE_WINDOW: Duration = Duration::from_millis(800);
pub const PASSTHROUGH_PREFIX: &str = "disable";

const KEY_SEPARATOR: &str = "||";

pub type TextReader = Arc<dyn Fn() -> String + Send + Sync>;

pub fn is_passthrough(engine: &str) -> bool {
    engine.starts_with(PASSTHROUGH_PREFIX)
}

pub(crate) fn request_key(text: &str, engine: &str) -> String {
    format!("{}{}{}", text, KEY_SEPARATOR, engine)
}

pub struct TranslatorWiring {
    pub display: DisplayState,
    pub source: TextReader,
    pub engine: TextReader,
    pub mirror: Option<Arc<dyn Widget>>,
    pub node: Arc<dyn HostNode>,
    pub settle: Duration,
}

pub struct DebouncedTranslator<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> fmt::Debug for DebouncedTranslator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedTranslator").finish_non_exhaustive()
    }
}

struct Inner<T: Transport> {
    transport: T,
    display: Mutex<DisplayState>,
    source: TextReader,
    engine: TextReader,
    mirror: Option<Arc<dyn Widget>>,
    node: Arc<dyn HostNode>,
    settle: Duration,
    runtime: Handle,
    pending: Mutex<Option<JoinHandle<()>>>,
    last_key: Mutex<String>,
    generation: AtomicU64,
}

impl<T: Transport + 'static> DebouncedTranslator<T> {
    // The handle captured here lets schedule() arm timers from host threads
    // outside the runtime.
    pub fn new(transport: T, wiring: TranslatorWiring) -> Result<Self> {
        let runtime =
            Handle::try_current().context("translator construction requires a tokio runtime")?;
        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                display: Mutex::new(wiring.display),
                source: wiring.source,
                engine: wiring.engine,
                mirror: wiring.mirror,
                node: wiring.node,
                settle: wiring.settle,
                runtime,
                pending: Mutex::new(None),
                last_key: Mutex::new(String::new()),
                generation: AtomicU64::new(0),
            }),
        })
    }

    pub fn schedule(&self) {
        self.inner.clone().schedule();
    }

    pub async fn run_now(&self) {
        self.inner.clone().run().await;
    }

    pub fn state(&self) -> PreviewState {
        self.inner.display.lock().state()
    }

    pub fn displayed_text(&self) -> String {
        self.inner.display.lock().displayed_text().to_string()
    }

    pub fn status_label(&self) -> String {
        self.inner.display.lock().status_label().to_string()
    }

    pub fn propagated_value(&self) -> String {
        self.inner.display.lock().propagated_value().to_string()
    }

    pub(crate) fn prime(&self) {
        let inner = self.inner.clone();
        self.inner.runtime.spawn(async move {
            inner.run().await;
        });
    }

    pub(crate) fn change_listener(&self) -> ChangeListener {
        let weak = Arc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.schedule();
            }
        })
    }
}

impl<T: Transport> Drop for DebouncedTranslator<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.inner.pending.lock().take() {
            pending.abort();
        }
    }
}

impl<T: Transport + 'static> Inner<T> {
    fn schedule(self: Arc<Self>) {
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let weak = Arc::downgrade(&self);
        let settle = self.settle;
        *pending = Some(self.runtime.spawn(async move {
            sleep(settle).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            // Detached: once the timer has fired, a re-arm or teardown must
            // not abort the dispatched run.
            let runtime = inner.runtime.clone();
            runtime.spawn(async move {
                inner.run().await;
            });
        }));
    }

    async fn run(self: Arc<Self>) {
        let raw = (self.source)();
        let text = raw.trim();
        let engine = (self.engine)();

        if text.is_empty() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.last_key.lock().clear();
            self.display.lock().set_empty();
            return;
        }

        if is_passthrough(&engine) {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let mut display = self.display.lock();
            display.set_disabled(text);
            if let Some(mirror) = &self.mirror {
                mirror.set_value(text.to_string());
            }
            return;
        }

        let key = request_key(text, &engine);
        {
            let mut last_key = self.last_key.lock();
            if *last_key == key {
                debug!("translation already satisfied or in flight; skipping");
                return;
            }
            *last_key = key;
        }

        // The response only applies while its generation is still current.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.display.lock().set_loading();

        let result = self.transport.translate(text, &engine).await;

        // The staleness check and the application form one critical section;
        // the mirror moves in step with the display.
        {
            let mut display = self.display.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!("discarding stale translation response");
                return;
            }
            if result.success && !result.translated_text.is_empty() {
                display.set_result(&result.translated_text, &result.status_label);
                if let Some(mirror) = &self.mirror {
                    mirror.set_value(result.translated_text);
                }
            } else {
                display.set_error(&result.status_label);
                if let Some(mirror) = &self.mirror {
                    mirror.set_value(String::new());
                }
            }
        }
        self.node.request_redraw();
    }
}
