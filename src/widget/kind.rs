use std::fmt;
use std::sync::LazyLock;

use crate::attrs::{AttrSpec, AttrType, AttrValue, Schema};
use crate::choices::{AlignmentChoice, ColorChoice};
use crate::error::{EdlError, Result};
use crate::font::Font;
use crate::pv::LocalPv;
use crate::visibility::Visibility;

/// `major minor release` triple EDM expects in every object block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdmVersion {
    pub major: u8,
    pub minor: u8,
    pub release: u8,
}

impl EdmVersion {
    pub const fn new(major: u8, minor: u8, release: u8) -> Self {
        Self {
            major,
            minor,
            release,
        }
    }
}

/// Every widget kind the designer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Bare rectangle with no EDM drawing of its own; useful as a spacer.
    Plain,
    Rectangle,
    Circle,
    StaticText,
    MessageButton,
    MenuButton,
    EmbeddedWindow,
}

impl WidgetKind {
    /// EDM object class, also the default widget name.
    pub const fn class_tag(self) -> &'static str {
        match self {
            Self::Plain => "Widget",
            Self::Rectangle => "activeRectangleClass",
            Self::Circle => "activeCircleClass",
            Self::StaticText => "activeXTextClass",
            Self::MessageButton => "activeMessageButtonClass",
            Self::MenuButton => "activeMenuButtonClass",
            Self::EmbeddedWindow => "activePipClass",
        }
    }

    pub const fn version(self) -> EdmVersion {
        match self {
            Self::Plain | Self::StaticText => EdmVersion::new(4, 1, 1),
            Self::Rectangle | Self::Circle | Self::MenuButton => EdmVersion::new(4, 0, 0),
            Self::MessageButton | Self::EmbeddedWindow => EdmVersion::new(4, 1, 0),
        }
    }

    /// Name of the render template used unless the widget overrides it.
    pub const fn template(self) -> &'static str {
        match self {
            Self::Plain => "widget",
            Self::Rectangle | Self::Circle => "shape",
            Self::StaticText => "text",
            Self::MessageButton => "message",
            Self::MenuButton => "menu",
            Self::EmbeddedWindow => "embedded",
        }
    }

    pub const fn is_button(self) -> bool {
        matches!(self, Self::MessageButton | Self::MenuButton)
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            Self::Plain => &*PLAIN,
            Self::Rectangle => &*RECTANGLE,
            Self::Circle => &*CIRCLE,
            Self::StaticText => &*STATIC_TEXT,
            Self::MessageButton => &*MESSAGE_BUTTON,
            Self::MenuButton => &*MENU_BUTTON,
            Self::EmbeddedWindow => &*EMBEDDED_WINDOW,
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema().label())
    }
}

fn widget_schema(label: &'static str) -> Schema {
    Schema::new(label)
        .with(
            AttrSpec::new("alarm_pv", AttrType::OptStr, AttrValue::Unset)
                .doc("PV to monitor alarm state"),
        )
        .with(
            AttrSpec::new("visibility", AttrType::Visibility, Visibility::default())
                .doc("Visibility PV and display range"),
        )
}

fn shape_schema(label: &'static str) -> Schema {
    widget_schema(label)
        .with(AttrSpec::new("line_width", AttrType::Int, 1).doc("Stroke of surrounding border"))
        .with(AttrSpec::new("fill", AttrType::OptColor, AttrValue::Unset))
        .with(AttrSpec::new(
            "line_color",
            AttrType::OptColor,
            ColorChoice::Black,
        ))
        .with(
            AttrSpec::new("alarm", AttrType::Bool, false)
                .doc("Fill color follows the alarm state of the alarm PV"),
        )
}

fn button_schema(label: &'static str) -> Schema {
    shape_schema(label)
        .with_default("fill", ColorChoice::Grey)
        .with_default("line_color", AttrValue::Unset)
        .with(AttrSpec::new("control_pv", AttrType::OptStr, AttrValue::Unset))
        .with(AttrSpec::new("font_color", AttrType::Color, ColorChoice::Black))
        .with(AttrSpec::new("font", AttrType::Font, Font::default()))
        .with(
            AttrSpec::new("invisible", AttrType::Bool, false)
                .doc("Clickable but hidden until moused over"),
        )
}

fn forbid_invisible(value: &AttrValue) -> Result<()> {
    if value.as_bool() == Some(true) {
        return Err(EdlError::policy(
            "menu buttons can not be made invisible, blend them into the background instead",
        ));
    }
    Ok(())
}

static PLAIN: LazyLock<Schema> = LazyLock::new(|| widget_schema("Widget"));

static RECTANGLE: LazyLock<Schema> = LazyLock::new(|| shape_schema("Rectangle"));

static CIRCLE: LazyLock<Schema> = LazyLock::new(|| shape_schema("Circle"));

static STATIC_TEXT: LazyLock<Schema> = LazyLock::new(|| {
    widget_schema("StaticText")
        .with(AttrSpec::new("text", AttrType::Str, ""))
        .with(AttrSpec::new("fill", AttrType::OptColor, AttrValue::Unset))
        .with(AttrSpec::new("line_width", AttrType::Int, 0))
        .with(
            AttrSpec::new("alignment", AttrType::Alignment, AlignmentChoice::Center)
                .doc("Alignment of text within the label"),
        )
        .with(AttrSpec::new("font_color", AttrType::Color, ColorChoice::Black))
        .with(AttrSpec::new(
            "font",
            AttrType::Font,
            Font::default().with_size(12),
        ))
});

static MESSAGE_BUTTON: LazyLock<Schema> = LazyLock::new(|| {
    button_schema("MessageButton")
        .with(AttrSpec::new("label", AttrType::Str, ""))
        .with(AttrSpec::new("value", AttrType::Str, "").doc("Value written to the control PV"))
});

static MENU_BUTTON: LazyLock<Schema> =
    LazyLock::new(|| button_schema("MenuButton").with_hook("invisible", forbid_invisible));

static EMBEDDED_WINDOW: LazyLock<Schema> = LazyLock::new(|| {
    widget_schema("EmbeddedWindow")
        .with(AttrSpec::new(
            "control_pv",
            AttrType::Str,
            LocalPv::int("emb-window", 0).to_string(),
        ))
        .with(AttrSpec::new("displays", AttrType::Displays, AttrValue::Displays(Vec::new())))
        .with(
            AttrSpec::new("autoscale", AttrType::Bool, true)
                .doc("Resize to the largest embedded display whenever one is added"),
        )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_inherit_shape_attributes_with_new_defaults() {
        let schema = WidgetKind::MessageButton.schema();
        assert_eq!(
            schema.spec("fill").map(|s| s.default.clone()),
            Some(AttrValue::Color(ColorChoice::Grey))
        );
        assert_eq!(
            schema.spec("line_color").map(|s| s.default.clone()),
            Some(AttrValue::Unset)
        );
        assert!(schema.spec("label").is_some());
        assert!(WidgetKind::MenuButton.schema().spec("label").is_none());
    }

    #[test]
    fn menu_button_rejects_invisibility() {
        let schema = WidgetKind::MenuButton.schema();
        assert!(schema.check("invisible", false.into()).is_ok());
        assert!(matches!(
            schema.check("invisible", true.into()),
            Err(EdlError::PolicyViolation(_))
        ));
        assert!(WidgetKind::MessageButton
            .schema()
            .check("invisible", true.into())
            .is_ok());
    }

    #[test]
    fn embedded_window_defaults_to_local_control_pv() {
        let schema = WidgetKind::EmbeddedWindow.schema();
        assert_eq!(
            schema.spec("control_pv").map(|s| s.default.clone()),
            Some(AttrValue::Str("LOC\\emb-window=i:0".into()))
        );
    }
}
