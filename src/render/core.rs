use indexmap::IndexMap;

use crate::choices::{AlignmentChoice, ColorChoice};
use crate::error::{EdlError, Result};
use crate::logging::{LogLevel, RENDER_TARGET, event_with_fields, json_kv, json_str};
use crate::screen::Screen;
use crate::tree::{Node, NodeId, WidgetTree};
use crate::widget::Widget;

use super::block::{EdlBlock, quote};

/// Turns widgets and screens into EDL text.
pub trait Render {
    fn render_widget(&self, widget: &Widget) -> Result<String>;

    fn render_screen(&self, screen: &Screen) -> Result<String>;
}

/// Produces the properties block of one widget.
pub type Template = fn(&Widget) -> String;

/// Renderer backed by a registry of named templates.
#[derive(Debug, Clone)]
pub struct EdlRenderer {
    templates: IndexMap<String, Template>,
}

impl Default for EdlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl EdlRenderer {
    /// Renderer with the built-in templates registered.
    pub fn new() -> Self {
        let mut renderer = Self::empty();
        renderer
            .register("widget", widget_template)
            .register("shape", shape_template)
            .register("text", text_template)
            .register("message", message_template)
            .register("menu", menu_template)
            .register("embedded", embedded_template);
        renderer
    }

    pub fn empty() -> Self {
        Self {
            templates: IndexMap::new(),
        }
    }

    /// Add or replace a template.
    pub fn register(&mut self, name: impl Into<String>, template: Template) -> &mut Self {
        self.templates.insert(name.into(), template);
        self
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.templates.keys().map(String::as_str)
    }
}

impl Render for EdlRenderer {
    fn render_widget(&self, widget: &Widget) -> Result<String> {
        let template = self
            .templates
            .get(widget.template())
            .ok_or_else(|| EdlError::MissingTemplate {
                widget: widget.name().to_string(),
                template: widget.template().to_string(),
            })?;
        Ok(template(widget))
    }

    fn render_screen(&self, screen: &Screen) -> Result<String> {
        let version = screen.version();
        let font = quote(&screen.font.tag());
        let mut block = EdlBlock::bare("endScreenProperties");
        block
            .line(format!("{} {} {}", version.major, version.minor, version.release))
            .line("beginScreenProperties")
            .prop("major", version.major)
            .prop("minor", version.minor)
            .prop("release", version.release)
            .prop("x", screen.rect.x)
            .prop("y", screen.rect.y)
            .prop("w", screen.rect.w)
            .prop("h", screen.rect.h)
            .prop("font", &font)
            .prop("ctlFont", &font)
            .prop("btnFont", &font)
            .color("fgColor", screen.foreground)
            .color("bgColor", screen.background)
            .color("textColor", screen.foreground)
            .color("ctlFgColor1", screen.foreground)
            .color("ctlFgColor2", ColorChoice::White)
            .color("ctlBgColor1", ColorChoice::White)
            .color("ctlBgColor2", screen.foreground)
            .color("topShadowColor", ColorChoice::White)
            .color("botShadowColor", screen.foreground);
        if let Some(title) = &screen.title {
            block.quoted("title", title);
        }
        block
            .flag("showGrid", screen.show_grid)
            .flag("snapToGrid", screen.snap_to_grid)
            .prop("gridSize", screen.grid_size);
        Ok(block.finish())
    }
}

/// Render `id` and, for layouts, every descendant in child order.
///
/// Blocks are separated by one blank line; nodes that render to nothing
/// leave no gap.
pub fn render_node<R>(renderer: &R, tree: &WidgetTree, id: NodeId) -> Result<String>
where
    R: Render + ?Sized,
{
    Ok(render_blocks(renderer, tree, id)?.join("\n\n"))
}

pub(crate) fn render_blocks<R>(renderer: &R, tree: &WidgetTree, id: NodeId) -> Result<Vec<String>>
where
    R: Render + ?Sized,
{
    let name = tree.node(id)?.name();
    let mut blocks = Vec::new();
    for leaf in tree.leaf_widgets(id) {
        if let Node::Widget(widget) = tree.node(leaf)? {
            let block = renderer.render_widget(widget).inspect_err(|err| {
                log_render(
                    tree,
                    LogLevel::Error,
                    "render_failed",
                    [
                        json_str("node", name),
                        json_str("widget", widget.name()),
                        json_str("error", err.to_string()),
                    ],
                );
            })?;
            if !block.trim().is_empty() {
                blocks.push(block);
            }
        }
    }
    log_render(
        tree,
        LogLevel::Debug,
        "node_rendered",
        [json_str("node", name), json_kv("blocks", blocks.len())],
    );
    Ok(blocks)
}

fn log_render<const N: usize>(
    tree: &WidgetTree,
    level: LogLevel,
    message: &str,
    fields: [(String, serde_json::Value); N],
) {
    if let Some(logger) = tree.logger() {
        let _ = logger.log_event(event_with_fields(level, RENDER_TARGET, message, fields));
    }
}

/// Visibility and alarm lines shared by every template.
fn decorate(block: &mut EdlBlock, widget: &Widget) {
    if let Some(pv) = widget.text_attr("alarm_pv") {
        block.quoted("alarmPv", pv);
    }
    if let Some(vis) = widget.visibility().filter(|vis| vis.valid()) {
        if let Some(pv) = &vis.pv {
            block.quoted("visPv", pv);
        }
        block.flag("visInvert", vis.inverted);
        if let Some(min) = vis.min {
            block.quoted("visMin", &min.to_string());
        }
        if let Some(max) = vis.max {
            block.quoted("visMax", &max.to_string());
        }
    }
}

fn font_tag(widget: &Widget) -> String {
    quote(&widget.font().copied().unwrap_or_default().tag())
}

fn widget_template(widget: &Widget) -> String {
    let mut block = EdlBlock::object(widget);
    decorate(&mut block, widget);
    block.finish()
}

fn shape_template(widget: &Widget) -> String {
    let mut block = EdlBlock::object(widget);
    let fill = widget.fill();
    let line = widget.line_color();
    block.color(
        "lineColor",
        line.or(fill).unwrap_or(ColorChoice::Black),
    );
    if let Some(fill) = fill {
        block.line("fill").color("fillColor", fill);
    }
    block.prop(
        "lineWidth",
        if line.is_some() { widget.line_width() } else { 0 },
    );
    let alarm = widget.attr("alarm").and_then(|value| value.as_bool()) == Some(true);
    block.flag("fillAlarm", alarm && fill.is_some());
    decorate(&mut block, widget);
    block.finish()
}

fn text_template(widget: &Widget) -> String {
    let mut block = EdlBlock::object(widget);
    let alignment = widget.alignment().unwrap_or(AlignmentChoice::Left);
    block
        .prop("font", font_tag(widget))
        .quoted("fontAlign", alignment.keyword())
        .color(
            "fgColor",
            widget.font_color().unwrap_or(ColorChoice::Black),
        );
    match widget.fill() {
        Some(fill) => {
            block.color("bgColor", fill);
        }
        None => {
            block.color("bgColor", ColorChoice::White).line("useDisplayBg");
        }
    }
    let text = widget.text_attr("text").unwrap_or_default();
    block.list("value", text.lines().map(quote));
    let width = widget.line_width();
    if width > 0 {
        block.line("border").prop("lineWidth", width);
    }
    decorate(&mut block, widget);
    block.finish()
}

fn button_colors(block: &mut EdlBlock, widget: &Widget) {
    let fill = widget.fill().unwrap_or(ColorChoice::Grey);
    let line = widget.line_color().unwrap_or(fill);
    block
        .color("fgColor", widget.font_color().unwrap_or(ColorChoice::Black))
        .color("bgColor", fill)
        .color("topShadowColor", line)
        .color("botShadowColor", line);
}

fn message_template(widget: &Widget) -> String {
    let mut block = EdlBlock::object(widget);
    let fill = widget.fill().unwrap_or(ColorChoice::Grey);
    let line = widget.line_color().unwrap_or(fill);
    let label = widget.text_attr("label").unwrap_or_default();
    block
        .color("fgColor", widget.font_color().unwrap_or(ColorChoice::Black))
        .color("onColor", fill)
        .color("offColor", fill)
        .color("topShadowColor", line)
        .color("botShadowColor", line);
    if let Some(pv) = widget.text_attr("control_pv") {
        block.quoted("controlPv", pv);
    }
    block
        .quoted("pressValue", widget.text_attr("value").unwrap_or_default())
        .quoted("onLabel", label)
        .quoted("offLabel", label)
        .line("3d")
        .flag(
            "invisible",
            widget.attr("invisible").and_then(|value| value.as_bool()) == Some(true),
        )
        .prop("font", font_tag(widget));
    decorate(&mut block, widget);
    block.finish()
}

fn menu_template(widget: &Widget) -> String {
    let mut block = EdlBlock::object(widget);
    button_colors(&mut block, widget);
    block.color(
        "inconsistentColor",
        widget.fill().unwrap_or(ColorChoice::Grey),
    );
    if let Some(pv) = widget.text_attr("control_pv") {
        block.quoted("controlPv", pv);
    }
    block.prop("font", font_tag(widget));
    decorate(&mut block, widget);
    block.finish()
}

fn embedded_template(widget: &Widget) -> String {
    let mut block = EdlBlock::object(widget);
    block
        .color("fgColor", ColorChoice::Black)
        .color("bgColor", ColorChoice::White)
        .color("topShadowColor", ColorChoice::White)
        .color("botShadowColor", ColorChoice::Black)
        .quoted("displaySource", "menu")
        .quoted("filePv", widget.text_attr("control_pv").unwrap_or_default())
        .prop("sizeOfs", 99);

    let displays = widget.displays();
    block.prop("numDsps", displays.len());
    if !displays.is_empty() {
        block
            .list(
                "displayFileName",
                displays.iter().enumerate().map(|(index, display)| {
                    format!("{index} {}", quote(&display.path.to_string_lossy()))
                }),
            )
            .list(
                "menuLabel",
                displays
                    .iter()
                    .enumerate()
                    .map(|(index, display)| format!("{index} {}", quote(&display.name))),
            )
            .list(
                "symbols",
                displays.iter().enumerate().map(|(index, display)| {
                    format!("{index} {}", quote(display.macros.as_deref().unwrap_or_default()))
                }),
            );
    }
    decorate(&mut block, widget);
    block.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{Display, WidgetKind};

    const TEXT_EDL: &str = "# (activeXTextClass)
object activeXTextClass
beginObjectProperties
major 4
minor 1
release 1
x 0
y 0
w 56
h 21
font \"helvetica-medium-r-12.0\"
fontAlign \"right\"
fgColor index 14
bgColor index 0
useDisplayBg
value {
  \"LABEL\"
}
border
lineWidth 3
endObjectProperties";

    const EMBEDDED_EDL: &str = "# (activePipClass)
object activePipClass
beginObjectProperties
major 4
minor 1
release 0
x 0
y 0
w 1000
h 1200
fgColor index 14
bgColor index 0
topShadowColor index 0
botShadowColor index 14
displaySource \"menu\"
filePv \"LOC\\emb-window=i:0\"
sizeOfs 99
numDsps 1
displayFileName {
  0 \"tests/test.edl\"
}
menuLabel {
  0 \"test\"
}
symbols {
  0 \"\"
}
endObjectProperties";

    const WINDOW_EDL: &str = "4 0 1
beginScreenProperties
major 4
minor 0
release 1
x 0
y 0
w 780
h 1125
font \"helvetica-medium-r-18.0\"
ctlFont \"helvetica-medium-r-18.0\"
btnFont \"helvetica-medium-r-18.0\"
fgColor index 14
bgColor index 4
textColor index 14
ctlFgColor1 index 14
ctlFgColor2 index 0
ctlBgColor1 index 0
ctlBgColor2 index 14
topShadowColor index 0
botShadowColor index 14
title \"Test\"
showGrid
snapToGrid
gridSize 4
endScreenProperties";

    #[test]
    fn static_text_block() {
        let text = Widget::new(WidgetKind::StaticText)
            .with_size(56, 21)
            .unwrap()
            .with_attr("text", "LABEL")
            .unwrap()
            .with_attr("alignment", "right")
            .unwrap()
            .with_attr("line_width", 3)
            .unwrap();
        assert_eq!(EdlRenderer::new().render_widget(&text).unwrap(), TEXT_EDL);
    }

    #[test]
    fn embedded_window_block() {
        let mut emb = Widget::new(WidgetKind::EmbeddedWindow)
            .with_size(1000, 1200)
            .unwrap()
            .with_attr("autoscale", false)
            .unwrap();
        emb.add_display(Display::from_edl("tests/test.edl").unwrap())
            .unwrap();
        assert_eq!(EdlRenderer::new().render_widget(&emb).unwrap(), EMBEDDED_EDL);
    }

    #[test]
    fn screen_header() {
        let mut screen = Screen::default().with_title("Test");
        screen.rect.w = 780;
        screen.rect.h = 1125;
        assert_eq!(EdlRenderer::new().render_screen(&screen).unwrap(), WINDOW_EDL);
    }

    #[test]
    fn missing_template_names_widget_and_template() {
        let widget = Widget::new(WidgetKind::Circle)
            .with_name("dot")
            .with_template("sparkle");
        let err = EdlRenderer::new().render_widget(&widget).unwrap_err();
        assert!(matches!(
            err,
            EdlError::MissingTemplate { ref widget, ref template } if widget == "dot" && template == "sparkle"
        ));
    }

    #[test]
    fn rendering_logs_to_the_render_target() {
        use crate::layout::Layout;
        use crate::logging::{LogLevel, Logger, MemorySink};
        use std::sync::Arc;

        let sink = Arc::new(MemorySink::new());
        let mut tree = WidgetTree::new().with_logger(Some(Logger::from_shared(sink.clone())));
        let ok = tree.insert_widget(Widget::new(WidgetKind::Rectangle));
        let broken = tree.insert_widget(
            Widget::new(WidgetKind::Circle)
                .with_name("dot")
                .with_template("sparkle"),
        );
        let stack = tree.insert_layout(Layout::stacked().with_name("pair"));
        tree.add_widgets(stack, &[ok, broken]).unwrap();

        render_node(&EdlRenderer::new(), &tree, ok).unwrap();
        let rendered = sink.at_level(LogLevel::Debug);
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].target, "edl::render");
        assert_eq!(rendered[0].fields["blocks"], serde_json::json!(1));

        assert!(render_node(&EdlRenderer::new(), &tree, stack).is_err());
        let failures = sink.at_level(LogLevel::Error);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].fields["node"], serde_json::json!("pair"));
        assert_eq!(failures[0].fields["widget"], serde_json::json!("dot"));
    }

    #[test]
    fn shape_block_with_fill_and_visibility() {
        let rect = Widget::new(WidgetKind::Rectangle)
            .with_geometry(5, 6, 10, 20)
            .unwrap()
            .with_attr("fill", ColorChoice::Red)
            .unwrap()
            .with_attr(
                "visibility",
                crate::visibility::Visibility::new("TST:VIS")
                    .with_range(Some(0.0), Some(1.0))
                    .inverted(true),
            )
            .unwrap();
        let text = EdlRenderer::new().render_widget(&rect).unwrap();
        assert!(text.contains("lineColor index 14\nfill\nfillColor index 21\nlineWidth 1"));
        assert!(text.contains("visPv \"TST:VIS\"\nvisInvert\nvisMin \"0\"\nvisMax \"1\""));
        assert!(text.ends_with("endObjectProperties"));
    }

    #[test]
    fn message_button_block() {
        let button = Widget::new(WidgetKind::MessageButton)
            .with_size(100, 100)
            .unwrap()
            .with_attr("value", 0)
            .unwrap()
            .with_attr("control_pv", "LOC\\intPv=i:0")
            .unwrap()
            .with_attr("label", "here")
            .unwrap();
        let text = EdlRenderer::new().render_widget(&button).unwrap();
        assert!(text.starts_with("# (activeMessageButtonClass)\nobject activeMessageButtonClass"));
        assert!(text.contains("major 4\nminor 1\nrelease 0"));
        assert!(text.contains("onColor index 4\noffColor index 4\ntopShadowColor index 4"));
        assert!(text.contains("controlPv \"LOC\\intPv=i:0\"\npressValue \"0\""));
        assert!(text.contains("onLabel \"here\""));
    }

    #[test]
    fn menu_button_block() {
        let mut menu = Widget::new(WidgetKind::MenuButton)
            .with_name("Menu Button")
            .with_geometry(24, 148, 200, 105)
            .unwrap()
            .with_attr("control_pv", "PV:FAKE")
            .unwrap();
        menu.set_attr("line_color", ColorChoice::Black).unwrap();
        let text = EdlRenderer::new().render_widget(&menu).unwrap();
        assert!(text.starts_with("# (Menu Button)\nobject activeMenuButtonClass"));
        assert!(text.contains("x 24\ny 148\nw 200\nh 105"));
        assert!(text.contains("topShadowColor index 14\nbotShadowColor index 14"));
        assert!(text.contains("controlPv \"PV:FAKE\""));
    }

    #[test]
    fn custom_template_can_be_registered() {
        fn blank(_: &Widget) -> String {
            String::new()
        }
        let mut renderer = EdlRenderer::new();
        renderer.register("blank", blank);
        let widget = Widget::new(WidgetKind::Plain).with_template("blank");
        assert_eq!(renderer.render_widget(&widget).unwrap(), "");
        assert!(renderer.has_template("shape"));
    }
}
