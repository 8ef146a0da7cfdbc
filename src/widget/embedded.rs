use std::fs;
use std::path::PathBuf;

use crate::attrs::AttrValue;
use crate::error::{EdlError, Result};
use crate::probe::find_screen_size;

use super::{Widget, WidgetKind};

/// One display shown inside an embedded window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub name: String,
    pub path: PathBuf,
    pub macros: Option<String>,
}

impl Display {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, macros: Option<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            macros,
        }
    }

    /// Display named after the file stem of an `.edl` path.
    pub fn from_edl(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.extension().and_then(|ext| ext.to_str()) != Some("edl") {
            return Err(EdlError::validation(
                "displays",
                format!("{} is not an EDL file", path.display()),
            ));
        }
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, path, None))
    }
}

impl Widget {
    pub fn displays(&self) -> &[Display] {
        self.attr("displays")
            .and_then(AttrValue::as_displays)
            .unwrap_or(&[])
    }

    pub fn display_count(&self) -> usize {
        self.displays().len()
    }

    pub fn add_display(&mut self, display: Display) -> Result<()> {
        self.insert_display(self.display_count(), display)
    }

    /// Insert a display at `index`; with autoscale on the widget is refit.
    pub fn insert_display(&mut self, index: usize, display: Display) -> Result<()> {
        self.require_kind(WidgetKind::EmbeddedWindow, "displays")?;
        let mut displays = self.displays().to_vec();
        if index > displays.len() {
            return Err(EdlError::validation(
                "displays",
                format!("index {index} past the end of {} displays", displays.len()),
            ));
        }
        displays.insert(index, display);

        let size = if self.autoscale() {
            largest_screen(&displays)?
        } else {
            None
        };
        self.set_attr("displays", displays)?;
        if let Some((w, h)) = size {
            self.rect.w = w;
            self.rect.h = h;
        }
        Ok(())
    }

    pub fn autoscale(&self) -> bool {
        self.attr("autoscale")
            .and_then(AttrValue::as_bool)
            .unwrap_or(false)
    }

    /// Resize to the largest declared screen among the embedded displays.
    ///
    /// Every display file must be readable. Returns `None` when there are no
    /// displays, leaving the size untouched.
    pub fn fit_to_displays(&mut self) -> Result<Option<(i32, i32)>> {
        self.require_kind(WidgetKind::EmbeddedWindow, "displays")?;
        let size = largest_screen(self.displays())?;
        if let Some((w, h)) = size {
            self.rect.w = w;
            self.rect.h = h;
        }
        Ok(size)
    }
}

fn largest_screen(displays: &[Display]) -> Result<Option<(i32, i32)>> {
    let mut largest: Option<(i32, i32)> = None;
    for display in displays {
        let text = fs::read_to_string(&display.path)?;
        let (w, h) = find_screen_size(&text)?;
        largest = Some(match largest {
            Some((lw, lh)) => (lw.max(w), lh.max(h)),
            None => (w, h),
        });
    }
    Ok(largest)
}
