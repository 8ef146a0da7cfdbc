use crate::attrs::{AttrType, AttrValue, Attributes};
use crate::choices::{AlignmentChoice, ColorChoice};
use crate::error::{EdlError, Result};
use crate::font::Font;
use crate::geometry::Rect;
use crate::visibility::Visibility;
use crate::width::text_extent;

use super::WidgetKind;

/// A leaf element of a display.
///
/// Widgets own their rectangle and attributes but know nothing about the
/// layout they sit in; once inserted into a tree, positions are written by
/// the tree only.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    name: String,
    kind: WidgetKind,
    pub(crate) rect: Rect,
    template: Option<String>,
    attributes: Attributes,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            name: kind.class_tag().to_string(),
            kind,
            rect: Rect::default(),
            template: None,
            attributes: kind.schema().defaults(),
        }
    }

    /// Build a widget from loose `(key, value)` pairs.
    ///
    /// `name`, `x`, `y`, `w` and `h` address the widget itself; every other
    /// key must be declared by the kind's schema.
    pub fn from_attrs<'a, I>(kind: WidgetKind, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, AttrValue)>,
    {
        let mut widget = Self::new(kind);
        for (key, value) in pairs {
            match key {
                "name" => {
                    let value = AttrType::Str.coerce("name", value)?;
                    widget.name = value.as_str().unwrap_or_default().to_string();
                }
                "x" => widget.rect.x = coordinate("x", value)?,
                "y" => widget.rect.y = coordinate("y", value)?,
                "w" => widget.rect.w = extent("w", value)?,
                "h" => widget.rect.h = extent("h", value)?,
                _ => widget.set_attr(key, value)?,
            }
        }
        if kind == WidgetKind::EmbeddedWindow && widget.autoscale() && widget.display_count() > 0 {
            widget.fit_to_displays()?;
        }
        Ok(widget)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_geometry(self, x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        self.with_position(x, y).with_size(w, h)
    }

    /// Negative extents are rejected, never clamped.
    pub fn with_size(mut self, w: i32, h: i32) -> Result<Self> {
        self.rect.w = non_negative("w", w)?;
        self.rect.h = non_negative("h", h)?;
        Ok(self)
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.rect.x = x;
        self.rect.y = y;
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Result<Self> {
        self.set_attr(name, value)?;
        Ok(self)
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn x(&self) -> i32 {
        self.rect.x
    }

    pub fn y(&self) -> i32 {
        self.rect.y
    }

    pub fn w(&self) -> i32 {
        self.rect.w
    }

    pub fn h(&self) -> i32 {
        self.rect.h
    }

    /// Render template: the override if one was set, else the kind's.
    pub fn template(&self) -> &str {
        self.template.as_deref().unwrap_or(self.kind.template())
    }

    pub fn set_template(&mut self, template: Option<String>) {
        self.template = template;
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Validate and store one attribute. Nothing changes if validation fails.
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) -> Result<()> {
        let (name, value) = self.kind.schema().check(name, value.into())?;
        self.attributes.insert(name, value);
        Ok(())
    }

    pub(crate) fn require_kind(&self, kind: WidgetKind, field: &str) -> Result<()> {
        if self.kind != kind {
            return Err(EdlError::validation(
                field,
                format!("{} widgets do not support it, only {kind} does", self.kind),
            ));
        }
        Ok(())
    }

    fn color(&self, name: &str) -> Option<ColorChoice> {
        self.attr(name).and_then(AttrValue::as_color)
    }

    pub fn fill(&self) -> Option<ColorChoice> {
        self.color("fill")
    }

    /// Border color. Buttons without an explicit line color follow the fill.
    pub fn line_color(&self) -> Option<ColorChoice> {
        match self.color("line_color") {
            Some(color) => Some(color),
            None if self.kind.is_button() => self.fill(),
            None => None,
        }
    }

    pub fn font_color(&self) -> Option<ColorChoice> {
        self.color("font_color")
    }

    pub fn line_width(&self) -> i64 {
        self.attr("line_width")
            .and_then(AttrValue::as_int)
            .unwrap_or(0)
    }

    pub fn font(&self) -> Option<&Font> {
        self.attr("font").and_then(AttrValue::as_font)
    }

    pub fn alignment(&self) -> Option<AlignmentChoice> {
        self.attr("alignment").and_then(AttrValue::as_alignment)
    }

    pub fn text_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(AttrValue::as_str)
    }

    pub fn visibility(&self) -> Option<&Visibility> {
        self.attr("visibility").and_then(AttrValue::as_visibility)
    }

    /// Whether the widget hides itself depending on a PV.
    pub fn vanishing(&self) -> bool {
        self.visibility().is_some_and(Visibility::valid)
    }

    /// Paint border, fill and label in one color so the button disappears
    /// into a background of that color.
    pub fn blend(&mut self, color: ColorChoice) -> Result<()> {
        if !self.kind.is_button() {
            return Err(EdlError::validation(
                "blend",
                format!("{} is not a button", self.kind),
            ));
        }
        for name in ["line_color", "fill", "font_color"] {
            self.set_attr(name, color)?;
        }
        Ok(())
    }

    /// Size a static text label to hold its text at the current font size.
    pub fn fit_to_text(&mut self) -> Result<(i32, i32)> {
        self.require_kind(WidgetKind::StaticText, "text")?;
        let size = i32::from(self.font().map_or(12, Font::size));
        let border = i32::try_from(self.line_width()).unwrap_or(0).max(0);
        let (columns, lines) = text_extent(self.text_attr("text").unwrap_or_default());
        let columns = i32::try_from(columns).unwrap_or(i32::MAX);
        let lines = i32::try_from(lines).unwrap_or(i32::MAX);

        let advance = (size * 3 + 4) / 5;
        self.rect.w = columns.saturating_mul(advance) + 2 * border + 4;
        self.rect.h = lines.saturating_mul(size * 3 / 2) + 2 * border;
        Ok((self.rect.w, self.rect.h))
    }
}

fn coordinate(field: &str, value: AttrValue) -> Result<i32> {
    let value = AttrType::Int.coerce(field, value)?;
    let raw = value.as_int().unwrap_or_default();
    i32::try_from(raw).map_err(|_| EdlError::validation(field, format!("{raw} is out of range")))
}

fn extent(field: &str, value: AttrValue) -> Result<i32> {
    non_negative(field, coordinate(field, value)?)
}

fn non_negative(field: &str, value: i32) -> Result<i32> {
    if value < 0 {
        return Err(EdlError::validation(field, "must not be negative"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_class_tag() {
        let widget = Widget::new(WidgetKind::Rectangle);
        assert_eq!(widget.name(), "activeRectangleClass");
        assert_eq!(widget.template(), "shape");
        assert_eq!(widget.rect(), Rect::default());
    }

    #[test]
    fn from_attrs_sets_geometry_and_attributes() {
        let widget = Widget::from_attrs(
            WidgetKind::Rectangle,
            [
                ("name", AttrValue::from("box")),
                ("x", AttrValue::Int(10)),
                ("w", AttrValue::Int(75)),
                ("h", AttrValue::Int(200)),
                ("fill", AttrValue::Int(21)),
            ],
        )
        .unwrap();
        assert_eq!(widget.name(), "box");
        assert_eq!(widget.rect(), Rect::new(10, 0, 75, 200));
        assert_eq!(widget.fill(), Some(ColorChoice::Red));
        assert_eq!(widget.rect().center(), (48, 100));
    }

    #[test]
    fn from_attrs_rejects_unknown_keys() {
        let err = Widget::from_attrs(WidgetKind::Rectangle, [("colour", AttrValue::Int(4))]).unwrap_err();
        assert!(matches!(err, EdlError::UnknownAttribute { .. }));
    }

    #[test]
    fn from_attrs_rejects_negative_size() {
        let err = Widget::from_attrs(WidgetKind::Circle, [("w", AttrValue::Int(-4))]).unwrap_err();
        assert!(matches!(err, EdlError::Validation { ref field, .. } if field == "w"));
    }

    #[test]
    fn size_builders_reject_negative_extents() {
        let err = Widget::new(WidgetKind::Plain).with_size(10, -1).unwrap_err();
        assert!(matches!(err, EdlError::Validation { ref field, .. } if field == "h"));
        let err = Widget::new(WidgetKind::Plain)
            .with_geometry(0, 0, -3, 5)
            .unwrap_err();
        assert!(matches!(err, EdlError::Validation { ref field, .. } if field == "w"));

        let widget = Widget::new(WidgetKind::Plain)
            .with_geometry(-7, 2, 0, 5)
            .unwrap();
        assert_eq!(widget.rect(), Rect::new(-7, 2, 0, 5));
    }

    #[test]
    fn failed_set_leaves_attribute_untouched() {
        let mut widget = Widget::new(WidgetKind::Rectangle);
        assert!(widget.set_attr("fill", "mauve").is_err());
        assert_eq!(widget.fill(), None);
        assert_eq!(widget.line_color(), Some(ColorChoice::Black));
    }

    #[test]
    fn button_line_color_follows_fill() {
        let mut button = Widget::new(WidgetKind::MessageButton);
        assert_eq!(button.fill(), Some(ColorChoice::Grey));
        assert_eq!(button.line_color(), Some(ColorChoice::Grey));

        button.set_attr("fill", ColorChoice::Blue).unwrap();
        assert_eq!(button.line_color(), Some(ColorChoice::Blue));

        button.set_attr("line_color", ColorChoice::Red).unwrap();
        assert_eq!(button.line_color(), Some(ColorChoice::Red));
    }

    #[test]
    fn blend_paints_everything_one_color() {
        let mut menu = Widget::new(WidgetKind::MenuButton);
        menu.blend(ColorChoice::White).unwrap();
        assert_eq!(menu.fill(), Some(ColorChoice::White));
        assert_eq!(menu.line_color(), Some(ColorChoice::White));
        assert_eq!(menu.font_color(), Some(ColorChoice::White));

        let mut rect = Widget::new(WidgetKind::Rectangle);
        assert!(rect.blend(ColorChoice::White).is_err());
    }

    #[test]
    fn vanishing_needs_pv_and_range() {
        let mut widget = Widget::new(WidgetKind::Circle);
        assert!(!widget.vanishing());
        widget
            .set_attr("visibility", Visibility::new("TST:PV").with_range(Some(0.0), Some(1.0)))
            .unwrap();
        assert!(widget.vanishing());
    }

    #[test]
    fn fit_to_text_uses_font_size() {
        let mut text = Widget::new(WidgetKind::StaticText)
            .with_attr("text", "LABEL")
            .unwrap();
        let (w, h) = text.fit_to_text().unwrap();
        assert_eq!((w, h), (5 * 8 + 4, 18));

        text.set_attr("line_width", 3).unwrap();
        assert_eq!(text.fit_to_text().unwrap(), (5 * 8 + 10, 24));
    }

    #[test]
    fn fit_to_text_only_for_static_text() {
        let mut rect = Widget::new(WidgetKind::Rectangle);
        assert!(rect.fit_to_text().is_err());
    }

    #[test]
    fn template_override() {
        let widget = Widget::new(WidgetKind::Circle).with_template("custom");
        assert_eq!(widget.template(), "custom");
    }
}
