use anyhow::{anyhow, bail, Context, Result};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::display::DisplayState;
use crate::host::{HostNode, Widget};
use crate::settings::Settings;
use crate::translator::{DebouncedTranslator, TextReader, TranslatorWiring};
use crate::transport::Transport;

pub const DEFAULT_JOIN: &str = ", ";

#[derive(Debug, Clone)]
pub struct PreviewBinding {
    source_fields: Vec<String>,
    join: String,
    engine_field: String,
    mirror_field: Option<String>,
    surface_name: String,
}

impl PreviewBinding {
    pub fn new(
        source: impl Into<String>,
        engine: impl Into<String>,
        surface: impl Into<String>,
    ) -> Self {
        Self {
            source_fields: vec![source.into()],
            join: DEFAULT_JOIN.to_string(),
            engine_field: engine.into(),
            mirror_field: None,
            surface_name: surface.into(),
        }
    }

    pub fn with_source(mut self, name: impl Into<String>) -> Self {
        self.source_fields.push(name.into());
        self
    }

    pub fn with_join(mut self, join: impl Into<String>) -> Self {
        self.join = join.into();
        self
    }

    pub fn with_mirror(mut self, name: impl Into<String>) -> Self {
        self.mirror_field = Some(name.into());
        self
    }
}

pub struct NodePreviews<T: Transport> {
    previews: Vec<(String, DebouncedTranslator<T>)>,
}

impl<T: Transport> fmt::Debug for NodePreviews<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodePreviews").finish_non_exhaustive()
    }
}

impl<T: Transport> NodePreviews<T> {
    pub fn preview(&self, surface_name: &str) -> Option<&DebouncedTranslator<T>> {
        self.previews
            .iter()
            .find(|(name, _)| name == surface_name)
            .map(|(_, translator)| translator)
    }

    pub fn len(&self) -> usize {
        self.previews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previews.is_empty()
    }
}

pub fn install<T: Transport + Clone + 'static>(
    node: Arc<dyn HostNode>,
    transport: T,
    settings: &Settings,
    bindings: Vec<PreviewBinding>,
) -> Result<NodePreviews<T>> {
    let mut previews = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let translator = install_binding(&node, transport.clone(), settings, &binding)
            .with_context(|| format!("failed to install preview '{}'", binding.surface_name))?;
        previews.push((binding.surface_name, translator));
    }
    Ok(NodePreviews { previews })
}

fn install_binding<T: Transport + 'static>(
    node: &Arc<dyn HostNode>,
    transport: T,
    settings: &Settings,
    binding: &PreviewBinding,
) -> Result<DebouncedTranslator<T>> {
    if binding.source_fields.is_empty() {
        bail!("binding has no source fields");
    }
    let mut sources = Vec::with_capacity(binding.source_fields.len());
    for name in &binding.source_fields {
        sources.push(resolve_widget(node, name)?);
    }
    let engine_widget = resolve_widget(node, &binding.engine_field)?;
    let mirror = match binding.mirror_field.as_deref() {
        Some(name) => Some(resolve_widget(node, name)?),
        None => None,
    };
    let surface = node.mount_surface(&binding.surface_name)?;

    let translator = DebouncedTranslator::new(
        transport,
        TranslatorWiring {
            display: DisplayState::new(surface),
            source: combined_reader(sources.clone(), binding.join.clone()),
            engine: widget_reader(&engine_widget),
            mirror,
            node: node.clone(),
            settle: settings.settle(),
        },
    )?;
    for widget in sources.iter().chain(std::iter::once(&engine_widget)) {
        widget.on_change(translator.change_listener());
    }
    debug!("installed translation preview '{}'", binding.surface_name);
    translator.prime();
    Ok(translator)
}

fn resolve_widget(node: &Arc<dyn HostNode>, name: &str) -> Result<Arc<dyn Widget>> {
    node.widget(name)
        .ok_or_else(|| anyhow!("node has no widget named '{}'", name))
}

fn widget_reader(widget: &Arc<dyn Widget>) -> TextReader {
    let widget = widget.clone();
    Arc::new(move || widget.get_value())
}

fn combined_reader(sources: Vec<Arc<dyn Widget>>, join: String) -> TextReader {
    Arc::new(move || {
        let parts: Vec<String> = sources
            .iter()
            .map(|widget| widget.get_value().trim().to_string())
            .filter(|part| !part.is_empty())
            .collect();
        parts.join(&join)
    })
}
