use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::DesignerConfig;
use crate::error::{EdlError, Result, StructuralError};
use crate::geometry::half_up;
use crate::launch::{LaunchOptions, LaunchOutcome, Launcher};
use crate::logging::{DESIGNER_TARGET, LogLevel, event_with_fields, json_kv, json_str};
use crate::metrics::MetricSnapshot;
use crate::render::{EdlRenderer, Render, render_blocks};
use crate::screen::Screen;
use crate::tree::{NodeId, WidgetTree};
use crate::widget::{Widget, WidgetKind};

/// Where `Designer::set_layout` puts the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutPlacement {
    /// Top margin, centered horizontally on the screen.
    #[default]
    Centered,
    /// Top-left corner of the layout at the given point.
    Origin(i32, i32),
    /// Shrink or grow the screen to the layout plus margins.
    Resize,
}

/// Result of [`Designer::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// The file already holds this exact document.
    Unchanged,
}

/// Owns a screen and the widgets drawn on it.
#[derive(Debug)]
pub struct Designer {
    tree: WidgetTree,
    screen: Screen,
    widgets: Vec<NodeId>,
    renderer: EdlRenderer,
    launcher: Launcher,
    config: DesignerConfig,
    written: HashMap<PathBuf, blake3::Hash>,
    started: Instant,
}

impl Default for Designer {
    fn default() -> Self {
        Self::new(DesignerConfig::default())
    }
}

impl Designer {
    pub fn new(config: DesignerConfig) -> Self {
        let tree = WidgetTree::new()
            .with_logger(config.logger.clone())
            .with_metrics(config.metrics_handle());
        let launcher = Launcher::new(config.launcher.clone()).with_logger(config.logger.clone());
        Self {
            tree,
            screen: Screen::from_settings(&config.screen),
            widgets: Vec::new(),
            renderer: EdlRenderer::new(),
            launcher,
            config,
            written: HashMap::new(),
            started: Instant::now(),
        }
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn renderer_mut(&mut self) -> &mut EdlRenderer {
        &mut self.renderer
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    /// Top-level nodes in drawing order.
    pub fn widgets(&self) -> &[NodeId] {
        &self.widgets
    }

    /// Add a free-floating node to the screen.
    pub fn add_widget(&mut self, id: NodeId) -> Result<()> {
        let name = self.tree.node(id)?.name().to_string();
        if self.tree.parent(id).is_some() || self.widgets.contains(&id) {
            return Err(StructuralError::AlreadyAttached(name).into());
        }
        self.widgets.push(id);
        Ok(())
    }

    /// Make `layout` the only top-level node and position it on the screen.
    ///
    /// Replaces every node added before. A layout that ends up past the
    /// screen edge is kept; the overflow is logged.
    pub fn set_layout(&mut self, layout: NodeId, placement: LayoutPlacement) -> Result<()> {
        let name = self.tree.layout(layout)?.name().to_string();
        if self.tree.parent(layout).is_some() {
            return Err(StructuralError::AlreadyAttached(name).into());
        }
        let rect = self.tree.rect(layout)?;
        let margin = self.screen.margin;

        match placement {
            LayoutPlacement::Resize => {
                self.screen.rect.w = rect.w + 2 * margin;
                self.screen.rect.h = rect.h + 2 * margin;
                self.tree.set_position(layout, margin, margin)?;
            }
            LayoutPlacement::Origin(x, y) => self.tree.set_position(layout, x, y)?,
            LayoutPlacement::Centered => {
                let x = self.screen.rect.center().0 - half_up(rect.w);
                self.tree.set_position(layout, x, margin)?;
            }
        }

        let bounds = self.tree.bounds(layout)?;
        let canvas = self.screen.rect;
        if bounds.x < canvas.x
            || bounds.y < canvas.y
            || bounds.right() > canvas.right()
            || bounds.bottom() > canvas.bottom()
        {
            self.log(
                LogLevel::Warn,
                "layout_overflows_screen",
                vec![
                    json_str("layout", name),
                    json_kv("left", bounds.x),
                    json_kv("top", bounds.y),
                    json_kv("right", bounds.right()),
                    json_kv("bottom", bounds.bottom()),
                    json_kv("screen_w", self.screen.w()),
                    json_kv("screen_h", self.screen.h()),
                ],
            );
        }
        self.widgets = vec![layout];
        Ok(())
    }

    /// Wrap the node at `id` in a stack behind `button`.
    ///
    /// See [`WidgetTree::buttonize`]. A top-level entry for `id` is replaced
    /// by the new stack.
    pub fn buttonize(&mut self, id: NodeId, button: Widget, invisible: bool) -> Result<NodeId> {
        let stack = self.tree.buttonize(id, button, invisible)?;
        for entry in &mut self.widgets {
            if *entry == id {
                *entry = stack;
            }
        }
        Ok(stack)
    }

    /// Every widget on the screen, layouts flattened in order.
    pub fn all_widgets(&self) -> Vec<NodeId> {
        self.roots()
            .into_iter()
            .flat_map(|id| self.tree.leaf_widgets(id))
            .collect()
    }

    /// Top-level entries resolved to their outermost layout.
    ///
    /// A node added here and later wrapped through the tree is emitted with
    /// its wrapper, once.
    fn roots(&self) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = Vec::with_capacity(self.widgets.len());
        for id in &self.widgets {
            let root = self.tree.root(*id);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    /// Widgets matching `kind` and `name`; `None` matches anything.
    pub fn find_children(&self, kind: Option<WidgetKind>, name: Option<&str>) -> Vec<NodeId> {
        self.all_widgets()
            .into_iter()
            .filter(|id| {
                self.tree.widget(*id).is_ok_and(|widget| {
                    kind.is_none_or(|kind| widget.kind() == kind)
                        && name.is_none_or(|name| widget.name() == name)
                })
            })
            .collect()
    }

    /// EDL text of one node and its descendants.
    pub fn render(&self, id: NodeId) -> Result<String> {
        let blocks = render_blocks(&self.renderer, &self.tree, id)?;
        self.record_blocks(blocks.len());
        Ok(blocks.join("\n\n"))
    }

    /// The complete file: screen header followed by every widget.
    pub fn render_document(&self) -> Result<String> {
        let mut blocks = vec![self.renderer.render_screen(&self.screen)?];
        for id in self.roots() {
            blocks.extend(render_blocks(&self.renderer, &self.tree, id)?);
        }
        self.record_blocks(blocks.len() - 1);
        let mut document = blocks.join("\n\n");
        document.push('\n');
        Ok(document)
    }

    pub fn dump<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.render_document()?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Write the document to `path`.
    ///
    /// Skips the write when the file still holds the document this designer
    /// last wrote there.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<SaveOutcome> {
        let path = path.as_ref();
        if path.extension().and_then(|ext| ext.to_str()) != Some("edl") {
            self.log(
                LogLevel::Warn,
                "unexpected_extension",
                vec![json_str("path", path.to_string_lossy())],
            );
        }
        let document = self.render_document()?;
        let digest = blake3::hash(document.as_bytes());
        let unchanged = self.written.get(path) == Some(&digest)
            && fs::read(path).is_ok_and(|bytes| blake3::hash(&bytes) == digest);

        let outcome = if unchanged {
            SaveOutcome::Unchanged
        } else {
            fs::write(path, document.as_bytes())?;
            self.written.insert(path.to_path_buf(), digest);
            SaveOutcome::Written
        };
        if let Some(metrics) = &self.config.metrics {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_write(outcome == SaveOutcome::Unchanged);
            }
        }
        self.log(
            LogLevel::Info,
            "document_saved",
            vec![
                json_str("path", path.to_string_lossy()),
                json_kv("skipped", outcome == SaveOutcome::Unchanged),
                json_str("digest", digest.to_hex().as_str()),
            ],
        );
        Ok(outcome)
    }

    /// Show the current document in the EDM viewer.
    ///
    /// The document goes to a temporary `.edl` file. It is removed after
    /// the viewer exits, or left behind for a detached viewer.
    pub fn exec(&self, options: &LaunchOptions) -> Result<LaunchOutcome> {
        let mut file = tempfile::Builder::new()
            .prefix("edl-layout-")
            .suffix(".edl")
            .tempfile()?;
        self.dump(&mut file)?;
        let outcome = self.launcher.launch(file.path(), options)?;
        if matches!(outcome, LaunchOutcome::Running(_)) {
            file.into_temp_path()
                .keep()
                .map_err(|err| EdlError::Io(err.error))?;
        }
        Ok(outcome)
    }

    /// Log a metrics snapshot. Returns it, or `None` with metrics disabled.
    pub fn emit_metrics(&self) -> Option<MetricSnapshot> {
        let snapshot = self
            .config
            .metrics
            .as_ref()
            .and_then(|metrics| metrics.lock().ok().map(|guard| guard.snapshot(self.started.elapsed())))?;
        if let Some(logger) = &self.config.logger {
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
        Some(snapshot)
    }

    fn record_blocks(&self, count: usize) {
        if let Some(metrics) = &self.config.metrics {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_blocks(count);
            }
        }
    }

    fn log(&self, level: LogLevel, message: &str, fields: Vec<(String, serde_json::Value)>) {
        if let Some(logger) = &self.config.logger {
            let _ = logger.log_event(event_with_fields(level, DESIGNER_TARGET, message, fields));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::logging::{Logger, MemorySink};
    use std::sync::Arc;

    fn plain(designer: &mut Designer, w: i32, h: i32) -> NodeId {
        designer
            .tree_mut()
            .insert_widget(Widget::new(WidgetKind::Plain).with_size(w, h).unwrap())
    }

    #[test]
    fn add_widget_rejects_attached_nodes() {
        let mut designer = Designer::default();
        let widget = plain(&mut designer, 10, 10);
        let stack = designer.tree_mut().insert_layout(Layout::stacked());
        designer.tree_mut().add_widget(stack, widget).unwrap();
        assert!(designer.add_widget(widget).is_err());
        designer.add_widget(stack).unwrap();
        assert!(designer.add_widget(stack).is_err());
        assert_eq!(designer.widgets(), &[stack]);
    }

    #[test]
    fn set_layout_resize_fits_screen() {
        let mut designer = Designer::default();
        let a = plain(&mut designer, 100, 200);
        let b = plain(&mut designer, 200, 100);
        let vbox = designer.tree_mut().insert_layout(Layout::vertical());
        designer.tree_mut().add_widgets(vbox, &[a, b]).unwrap();

        designer.set_layout(vbox, LayoutPlacement::Resize).unwrap();
        assert_eq!((designer.screen().w(), designer.screen().h()), (210, 315));
        assert_eq!(designer.tree().rect(a).unwrap().x, 5);
        assert_eq!(designer.tree().rect(b).unwrap().y, 210);
    }

    #[test]
    fn set_layout_centers_by_default() {
        let mut designer = Designer::default();
        let a = plain(&mut designer, 100, 100);
        let hbox = designer.tree_mut().insert_layout(Layout::horizontal());
        designer.tree_mut().add_widget(hbox, a).unwrap();
        designer.set_layout(hbox, LayoutPlacement::Centered).unwrap();
        assert_eq!(designer.tree().rect(a).unwrap(), crate::geometry::Rect::new(325, 5, 100, 100));
    }

    #[test]
    fn set_layout_checks_before_mutating() {
        let mut designer = Designer::default();
        let free = plain(&mut designer, 10, 10);
        designer.add_widget(free).unwrap();
        let empty = designer.tree_mut().insert_layout(Layout::vertical());
        assert!(matches!(
            designer.set_layout(empty, LayoutPlacement::Resize),
            Err(EdlError::EmptyLayout(_))
        ));
        assert!(matches!(
            designer.set_layout(free, LayoutPlacement::Resize),
            Err(EdlError::Structural(StructuralError::ExpectedLayout(_)))
        ));
        assert_eq!((designer.screen().w(), designer.screen().h()), (750, 1100));
        assert_eq!(designer.widgets(), &[free]);
    }

    #[test]
    fn stack_reaching_past_the_left_edge_is_logged() {
        let sink = Arc::new(MemorySink::new());
        let config = DesignerConfig::default().with_logger(Logger::from_shared(sink.clone()));
        let mut designer = Designer::new(config);
        let anchor = plain(&mut designer, 50, 100);
        let wide = plain(&mut designer, 100, 50);
        let stack = designer.tree_mut().insert_layout(Layout::stacked());
        designer.tree_mut().add_widgets(stack, &[anchor, wide]).unwrap();

        designer.set_layout(stack, LayoutPlacement::Resize).unwrap();
        assert_eq!((designer.screen().w(), designer.screen().h()), (110, 110));
        assert_eq!(designer.tree().rect(wide).unwrap().x, -20);
        let warnings = sink.at_level(LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "layout_overflows_screen");
        assert_eq!(warnings[0].fields["left"], serde_json::json!(-20));
    }

    #[test]
    fn layout_inside_the_screen_is_not_logged() {
        let sink = Arc::new(MemorySink::new());
        let config = DesignerConfig::default().with_logger(Logger::from_shared(sink.clone()));
        let mut designer = Designer::new(config);
        let a = plain(&mut designer, 100, 100);
        let vbox = designer.tree_mut().insert_layout(Layout::vertical());
        designer.tree_mut().add_widget(vbox, a).unwrap();
        designer.set_layout(vbox, LayoutPlacement::Resize).unwrap();
        assert!(sink.at_level(LogLevel::Warn).is_empty());
    }

    #[test]
    fn wrapping_a_top_level_node_keeps_the_wrapper_in_the_document() {
        let mut designer = Designer::default();
        let a = plain(&mut designer, 40, 20);
        designer.add_widget(a).unwrap();
        let stack = designer
            .tree_mut()
            .buttonize(a, Widget::new(WidgetKind::MessageButton), true)
            .unwrap();

        assert_eq!(designer.all_widgets().len(), 2);
        let document = designer.render_document().unwrap();
        assert_eq!(document.matches("object activeMessageButtonClass").count(), 1);
        assert_eq!(document.matches("object Widget").count(), 1);
        assert_eq!(designer.render(stack).unwrap().matches("endObjectProperties").count(), 2);
    }

    #[test]
    fn designer_buttonize_replaces_the_top_level_entry() {
        let mut designer = Designer::default();
        let a = plain(&mut designer, 40, 20);
        let b = plain(&mut designer, 10, 10);
        designer.add_widget(a).unwrap();
        designer.add_widget(b).unwrap();
        let stack = designer
            .buttonize(a, Widget::new(WidgetKind::MenuButton), true)
            .unwrap();

        assert_eq!(designer.widgets(), &[stack, b]);
        let document = designer.render_document().unwrap();
        assert_eq!(document.matches("beginObjectProperties").count(), 3);
    }

    #[test]
    fn document_starts_with_screen_header() {
        let mut designer = Designer::default();
        let a = plain(&mut designer, 10, 10);
        designer.add_widget(a).unwrap();
        let document = designer.render_document().unwrap();
        assert!(document.starts_with("4 0 1\nbeginScreenProperties\n"));
        assert!(document.contains("endScreenProperties\n\n# (Widget)\nobject Widget\n"));
        assert!(document.ends_with("endObjectProperties\n"));
    }

    #[test]
    fn find_children_by_kind_and_name() {
        let mut designer = Designer::default();
        let rect = designer
            .tree_mut()
            .insert_widget(Widget::new(WidgetKind::Rectangle).with_name("frame"));
        let text = designer
            .tree_mut()
            .insert_widget(Widget::new(WidgetKind::StaticText));
        let stack = designer.tree_mut().insert_layout(Layout::stacked());
        designer.tree_mut().add_widgets(stack, &[rect, text]).unwrap();
        designer.set_layout(stack, LayoutPlacement::Origin(0, 0)).unwrap();

        assert_eq!(designer.find_children(Some(WidgetKind::Rectangle), None), vec![rect]);
        assert_eq!(designer.find_children(None, Some("frame")), vec![rect]);
        assert_eq!(designer.find_children(None, None), vec![rect, text]);
        assert!(designer.find_children(Some(WidgetKind::Circle), None).is_empty());
    }
}
