use std::sync::{Arc, Mutex};

use indextree::{Arena, NodeId};

use crate::attrs::AttrValue;
use crate::choices::{AlignmentChoice, ColorChoice};
use crate::error::{EdlError, Result, StructuralError};
use crate::geometry::Rect;
use crate::layout::Layout;
use crate::logging::{LAYOUT_TARGET, LogLevel, Logger, event_with_fields, json_kv, json_str};
use crate::metrics::LayoutMetrics;
use crate::widget::{Widget, WidgetKind};

/// Anything that can live in a [`WidgetTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Widget(Widget),
    Layout(Layout),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Self::Widget(widget) => widget.name(),
            Self::Layout(layout) => layout.name(),
        }
    }

    pub fn as_widget(&self) -> Option<&Widget> {
        match self {
            Self::Widget(widget) => Some(widget),
            Self::Layout(_) => None,
        }
    }

    pub fn as_layout(&self) -> Option<&Layout> {
        match self {
            Self::Layout(layout) => Some(layout),
            Self::Widget(_) => None,
        }
    }

    pub fn is_layout(&self) -> bool {
        matches!(self, Self::Layout(_))
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        match self {
            Self::Widget(widget) => widget.rect.translate(dx, dy),
            Self::Layout(layout) => {
                layout.origin.0 += dx;
                layout.origin.1 += dy;
            }
        }
    }
}

impl From<Widget> for Node {
    fn from(widget: Widget) -> Self {
        Self::Widget(widget)
    }
}

impl From<Layout> for Node {
    fn from(layout: Layout) -> Self {
        Self::Layout(layout)
    }
}

/// Arena of widgets and layouts.
///
/// Layouts own the order of their children; a child's parent is looked up
/// in the arena, never stored on the child. Every mutation that can move a
/// node re-arranges the affected layout and then each of its ancestors, so
/// positions are consistent whenever a call returns. Validation runs before
/// anything is touched: a failed call leaves the tree as it was.
#[derive(Debug, Default)]
pub struct WidgetTree {
    arena: Arena<Node>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<LayoutMetrics>>>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Mutex<LayoutMetrics>>>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn insert_widget(&mut self, widget: Widget) -> NodeId {
        self.arena.new_node(Node::Widget(widget))
    }

    pub fn insert_layout(&mut self, layout: Layout) -> NodeId {
        self.arena.new_node(Node::Layout(layout))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(|node| !node.is_removed())
    }

    pub fn len(&self) -> usize {
        self.arena.count()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.arena
            .get(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get())
            .ok_or_else(|| StructuralError::UnknownNode(format!("{id:?}")).into())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get_mut())
            .ok_or_else(|| StructuralError::UnknownNode(format!("{id:?}")).into())
    }

    pub fn widget(&self, id: NodeId) -> Result<&Widget> {
        match self.node(id)? {
            Node::Widget(widget) => Ok(widget),
            Node::Layout(layout) => {
                Err(StructuralError::ExpectedWidget(layout.name().to_string()).into())
            }
        }
    }

    pub fn layout(&self, id: NodeId) -> Result<&Layout> {
        match self.node(id)? {
            Node::Layout(layout) => Ok(layout),
            Node::Widget(widget) => {
                Err(StructuralError::ExpectedLayout(widget.name().to_string()).into())
            }
        }
    }

    fn widget_mut(&mut self, id: NodeId) -> Result<&mut Widget> {
        match self.node_mut(id)? {
            Node::Widget(widget) => Ok(widget),
            Node::Layout(layout) => {
                Err(StructuralError::ExpectedWidget(layout.name().to_string()).into())
            }
        }
    }

    fn layout_mut(&mut self, id: NodeId) -> Result<&mut Layout> {
        match self.node_mut(id)? {
            Node::Layout(layout) => Ok(layout),
            Node::Widget(widget) => {
                Err(StructuralError::ExpectedLayout(widget.name().to_string()).into())
            }
        }
    }

    fn name_of(&self, id: NodeId) -> String {
        self.node(id)
            .map(|node| node.name().to_string())
            .unwrap_or_else(|_| format!("{id:?}"))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.parent())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        id.children(&self.arena).collect()
    }

    /// Widgets below `id` in depth-first order; a widget yields itself.
    pub fn leaf_widgets(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        id.descendants(&self.arena)
            .filter(|node| !self.arena[*node].get().is_layout())
            .collect()
    }

    /// Current rectangle. Layouts report their origin and the bounding box
    /// size of their children.
    pub fn rect(&self, id: NodeId) -> Result<Rect> {
        match self.node(id)? {
            Node::Widget(widget) => Ok(widget.rect()),
            Node::Layout(layout) => {
                let rects = id
                    .children(&self.arena)
                    .map(|child| self.rect(child))
                    .collect::<Result<Vec<_>>>()?;
                layout.rect_over(&rects)
            }
        }
    }

    /// Where the leaf widgets under `id` actually are.
    ///
    /// Unlike [`rect`](Self::rect), which reports a layout at its origin,
    /// this covers children that reach left of or above the anchor.
    pub fn bounds(&self, id: NodeId) -> Result<Rect> {
        let name = self.node(id)?.name().to_string();
        let rects = self
            .leaf_widgets(id)
            .into_iter()
            .map(|leaf| self.rect(leaf))
            .collect::<Result<Vec<_>>>()?;
        Rect::bounding(rects).ok_or(EdlError::EmptyLayout(name))
    }

    /// Outermost layout holding `id`, or `id` itself when it is free.
    pub fn root(&self, id: NodeId) -> NodeId {
        if !self.contains(id) {
            return id;
        }
        id.ancestors(&self.arena).last().unwrap_or(id)
    }

    pub(crate) fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    /// Append a leaf widget to `layout`.
    pub fn add_widget(&mut self, layout: NodeId, widget: NodeId) -> Result<()> {
        self.widget(widget)?;
        let len = self.children(layout).len();
        self.insert_child(layout, len, widget)
    }

    /// Append a nested layout to `layout`.
    pub fn add_layout(&mut self, layout: NodeId, child: NodeId) -> Result<()> {
        self.layout(child)?;
        let len = self.children(layout).len();
        self.insert_child(layout, len, child)
    }

    /// Append several widgets in order. All of them are checked first.
    pub fn add_widgets(&mut self, layout: NodeId, widgets: &[NodeId]) -> Result<()> {
        self.layout(layout)?;
        for (position, &widget) in widgets.iter().enumerate() {
            let name = self.widget(widget)?.name();
            if self.parent(widget).is_some() || widgets[..position].contains(&widget) {
                return Err(StructuralError::AlreadyAttached(name.to_string()).into());
            }
        }
        for &widget in widgets {
            self.add_widget(layout, widget)?;
        }
        Ok(())
    }

    /// Insert `child` at `index` among the children of `layout`.
    pub fn insert_child(&mut self, layout: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.layout(layout)?;
        let child_node = self.node(child)?;
        if layout.ancestors(&self.arena).any(|ancestor| ancestor == child) {
            return Err(StructuralError::Cycle {
                parent: self.name_of(layout),
                child: self.name_of(child),
            }
            .into());
        }
        if self.parent(child).is_some() {
            return Err(StructuralError::AlreadyAttached(child_node.name().to_string()).into());
        }
        if child_node.is_layout() {
            // Empty layouts have no size to arrange by.
            self.rect(child)?;
        }
        let siblings = self.children(layout);
        if index > siblings.len() {
            return Err(StructuralError::IndexOutOfBounds {
                index,
                len: siblings.len(),
            }
            .into());
        }

        let attached = match siblings.get(index) {
            Some(&sibling) => sibling.checked_insert_before(child, &mut self.arena),
            None => layout.checked_append(child, &mut self.arena),
        };
        attached.map_err(|_| StructuralError::Cycle {
            parent: self.name_of(layout),
            child: self.name_of(child),
        })?;
        self.propagate(layout)
    }

    /// Re-run the arrangement of `layout` and its ancestors.
    ///
    /// Safe to call at any time; an already consistent tree is left
    /// unchanged.
    pub fn rearrange(&mut self, layout: NodeId) -> Result<()> {
        self.layout(layout)?;
        self.propagate(layout)
    }

    fn require_free(&self, id: NodeId) -> Result<()> {
        self.node(id)?;
        if let Some(parent) = self.parent(id) {
            return Err(EdlError::policy(format!(
                "`{}` is positioned by its layout `{}`",
                self.name_of(id),
                self.name_of(parent)
            )));
        }
        Ok(())
    }

    /// Move a top-level node. Layouts carry their whole subtree along.
    ///
    /// A node inside a layout is positioned by that layout alone: moving it
    /// here (or through `set_x`, `set_y`, `place_*` and `recenter`) fails with
    /// `PolicyViolation`. Move the outermost layout instead.
    pub fn set_position(&mut self, id: NodeId, x: i32, y: i32) -> Result<()> {
        self.require_free(id)?;
        match self.node_mut(id)? {
            Node::Widget(widget) => {
                widget.rect.x = x;
                widget.rect.y = y;
                Ok(())
            }
            Node::Layout(layout) => {
                layout.origin = (x, y);
                self.propagate(id)
            }
        }
    }

    pub fn set_x(&mut self, id: NodeId, x: i32) -> Result<()> {
        let y = self.position(id)?.1;
        self.set_position(id, x, y)
    }

    pub fn set_y(&mut self, id: NodeId, y: i32) -> Result<()> {
        let x = self.position(id)?.0;
        self.set_position(id, x, y)
    }

    fn position(&self, id: NodeId) -> Result<(i32, i32)> {
        match self.node(id)? {
            Node::Widget(widget) => Ok((widget.x(), widget.y())),
            Node::Layout(layout) => Ok(layout.origin()),
        }
    }

    /// Move so the bottom edge lands on `y`; returns the new `y`.
    pub fn place_bottom(&mut self, id: NodeId, y: i32) -> Result<i32> {
        let mut rect = self.rect(id)?;
        let y = rect.place_bottom(y);
        self.set_position(id, rect.x, y)?;
        Ok(y)
    }

    /// Move so the right edge lands on `x`; returns the new `x`.
    pub fn place_right(&mut self, id: NodeId, x: i32) -> Result<i32> {
        let mut rect = self.rect(id)?;
        let x = rect.place_right(x);
        self.set_position(id, x, rect.y)?;
        Ok(x)
    }

    pub fn recenter(&mut self, id: NodeId, x: Option<i32>, y: Option<i32>) -> Result<(i32, i32)> {
        let mut rect = self.rect(id)?;
        let (x, y) = rect.recenter(x, y);
        self.set_position(id, x, y)?;
        Ok((x, y))
    }

    /// Resize a leaf widget; its layouts re-arrange around the new size.
    pub fn set_size(&mut self, id: NodeId, w: i32, h: i32) -> Result<()> {
        if self.node(id)?.is_layout() {
            return Err(EdlError::policy(format!(
                "layout `{}` is sized by its children",
                self.name_of(id)
            )));
        }
        if w < 0 || h < 0 {
            return Err(EdlError::validation("size", format!("{w}x{h} is negative")));
        }
        let widget = self.widget_mut(id)?;
        widget.rect.w = w;
        widget.rect.h = h;
        self.propagate_from_parent(id)
    }

    pub fn set_spacing(&mut self, layout: NodeId, spacing: i32) -> Result<()> {
        self.layout_mut(layout)?.set_spacing(spacing)?;
        self.propagate(layout)
    }

    pub fn set_alignment(&mut self, layout: NodeId, alignment: AlignmentChoice) -> Result<()> {
        self.layout_mut(layout)?.set_alignment(alignment)?;
        self.propagate(layout)
    }

    pub fn set_stack_alignment(&mut self, layout: NodeId, choices: &[AlignmentChoice]) -> Result<()> {
        self.layout_mut(layout)?.set_stack_alignment(choices)?;
        self.propagate(layout)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<AttrValue>) -> Result<()> {
        self.widget_mut(id)?.set_attr(name, value)
    }

    /// Edit a widget in place.
    ///
    /// Size changes made by `edit` (fitting text, adding displays) are
    /// propagated to the enclosing layouts afterwards. An error from `edit`
    /// is returned as is.
    pub fn with_widget_mut<R, F>(&mut self, id: NodeId, edit: F) -> Result<R>
    where
        F: FnOnce(&mut Widget) -> Result<R>,
    {
        let widget = self.widget_mut(id)?;
        let before = widget.rect();
        let out = edit(widget)?;
        if self.widget(id)?.rect() != before {
            self.propagate_from_parent(id)?;
        }
        Ok(out)
    }

    /// Deep copy of the subtree at `id`, detached from any layout.
    pub fn duplicate(&mut self, id: NodeId) -> Result<NodeId> {
        let node = self.node(id)?.clone();
        let copy = self.arena.new_node(node);
        let children = self.children(id);
        for child in children {
            let child_copy = self.duplicate(child)?;
            copy.checked_append(child_copy, &mut self.arena)
                .map_err(|_| StructuralError::UnknownNode(format!("{child_copy:?}")))?;
        }
        Ok(copy)
    }

    /// Put `button` behind the node at `id`, sized to match it.
    ///
    /// The node is wrapped in a new stacked layout that takes its place in
    /// any parent; a stacked layout receives the button as its first child
    /// instead. Menu buttons are never hidden: asking for an invisible one
    /// blends it into the default grey background. Returns the stack.
    pub fn buttonize(&mut self, id: NodeId, mut button: Widget, invisible: bool) -> Result<NodeId> {
        if !button.kind().is_button() {
            return Err(EdlError::validation(
                "button",
                format!("{} is not a button", button.kind()),
            ));
        }
        let rect = self.rect(id)?;
        if invisible {
            if button.kind() == WidgetKind::MenuButton {
                button.blend(ColorChoice::Grey)?;
            } else {
                button.set_attr("invisible", true)?;
            }
        }
        button.rect = rect;

        let already_stacked = self
            .node(id)?
            .as_layout()
            .is_some_and(Layout::is_stacked);
        let button = self.insert_widget(button);
        if already_stacked {
            self.insert_child(id, 0, button)?;
            return Ok(id);
        }

        let stack = self.insert_layout(Layout::stacked().with_origin(rect.x, rect.y));
        if self.parent(id).is_some() {
            id.checked_insert_before(stack, &mut self.arena)
                .map_err(|_| StructuralError::AlreadyAttached(self.name_of(stack)))?;
            id.detach(&mut self.arena);
        }
        for child in [button, id] {
            stack
                .checked_append(child, &mut self.arena)
                .map_err(|_| StructuralError::AlreadyAttached(self.name_of(child)))?;
        }
        self.propagate(stack)?;
        Ok(stack)
    }

    fn propagate_from_parent(&mut self, id: NodeId) -> Result<()> {
        match self.parent(id) {
            Some(parent) => self.propagate(parent),
            None => Ok(()),
        }
    }

    /// Arrange `id` and then every ancestor up to the root.
    fn propagate(&mut self, id: NodeId) -> Result<()> {
        let chain: Vec<NodeId> = id.ancestors(&self.arena).collect();
        for &layout in &chain {
            self.arrange(layout)?;
        }
        if let Some(metrics) = &self.metrics {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_propagation(chain.len().saturating_sub(1));
            }
        }
        Ok(())
    }

    fn arrange(&mut self, id: NodeId) -> Result<()> {
        let children: Vec<NodeId> = id.children(&self.arena).collect();
        if children.is_empty() {
            return Ok(());
        }
        let current = children
            .iter()
            .map(|child| self.rect(*child))
            .collect::<Result<Vec<_>>>()?;
        let layout = self.layout(id)?;
        let arrangement = layout.arrange(&current);

        if let Some(alignment) = arrangement.unsupported {
            self.log_unsupported(layout, alignment);
        }
        for ((child, old), new) in children.iter().zip(&current).zip(&arrangement.rects) {
            self.translate(*child, new.x - old.x, new.y - old.y);
        }

        if let Some(metrics) = &self.metrics {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_arrangement();
            }
        }
        Ok(())
    }

    fn translate(&mut self, id: NodeId, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        let subtree: Vec<NodeId> = id.descendants(&self.arena).collect();
        for node in subtree {
            self.arena[node].get_mut().translate(dx, dy);
        }
    }

    fn log_unsupported(&self, layout: &Layout, alignment: AlignmentChoice) {
        if let Some(logger) = &self.logger {
            let _ = logger.log_event(event_with_fields(
                LogLevel::Warn,
                LAYOUT_TARGET,
                "unsupported_alignment",
                [
                    json_str("layout", layout.name()),
                    json_str("policy", layout.policy().label()),
                    json_kv("alignment", alignment.keyword()),
                ],
            ));
        }
    }
}
