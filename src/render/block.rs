use std::fmt::Display;

use crate::choices::ColorChoice;
use crate::widget::Widget;

/// Line-oriented builder for one EDL properties block.
#[derive(Debug, Clone, Default)]
pub struct EdlBlock {
    lines: Vec<String>,
    closing: &'static str,
}

impl EdlBlock {
    /// `# (name)` / `object class` header plus version and geometry.
    pub fn object(widget: &Widget) -> Self {
        let version = widget.kind().version();
        let rect = widget.rect();
        let mut block = Self {
            lines: Vec::new(),
            closing: "endObjectProperties",
        };
        block
            .line(format!("# ({})", widget.name()))
            .line(format!("object {}", widget.kind().class_tag()))
            .line("beginObjectProperties")
            .prop("major", version.major)
            .prop("minor", version.minor)
            .prop("release", version.release)
            .prop("x", rect.x)
            .prop("y", rect.y)
            .prop("w", rect.w)
            .prop("h", rect.h);
        block
    }

    /// Block closed by `closing` with no header of its own.
    pub fn bare(closing: &'static str) -> Self {
        Self {
            lines: Vec::new(),
            closing,
        }
    }

    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    pub fn prop(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.line(format!("{key} {value}"))
    }

    pub fn quoted(&mut self, key: &str, value: &str) -> &mut Self {
        self.line(format!("{key} {}", quote(value)))
    }

    pub fn color(&mut self, key: &str, color: ColorChoice) -> &mut Self {
        self.line(format!("{key} index {}", color.index()))
    }

    pub fn flag(&mut self, key: &str, set: bool) -> &mut Self {
        if set {
            self.line(key);
        }
        self
    }

    /// `key {` followed by one indented entry per item and `}`.
    pub fn list<I, S>(&mut self, key: &str, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line(format!("{key} {{"));
        for item in items {
            self.line(format!("  {}", item.into()));
        }
        self.line("}")
    }

    pub fn finish(mut self) -> String {
        if !self.closing.is_empty() {
            self.lines.push(self.closing.to_string());
        }
        self.lines.join("\n")
    }
}

pub(crate) fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}
