use crate::choices::ColorChoice;
use crate::config::ScreenSettings;
use crate::font::Font;
use crate::geometry::Rect;
use crate::widget::EdmVersion;

/// Version EDM expects in the screen header.
pub const SCREEN_VERSION: EdmVersion = EdmVersion::new(4, 0, 1);

/// The window every widget is drawn on.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub rect: Rect,
    /// Border kept free around a layout sized with `LayoutPlacement::Resize`.
    pub margin: i32,
    pub foreground: ColorChoice,
    pub background: ColorChoice,
    pub font: Font,
    pub title: Option<String>,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub grid_size: u32,
}

impl Default for Screen {
    fn default() -> Self {
        Self::from_settings(&ScreenSettings::default())
    }
}

impl Screen {
    pub fn from_settings(settings: &ScreenSettings) -> Self {
        Self {
            rect: Rect::new(0, 0, settings.w.max(0), settings.h.max(0)),
            margin: settings.margin.max(0),
            foreground: settings.foreground,
            background: settings.background,
            font: settings.font,
            title: settings.title.clone(),
            show_grid: settings.show_grid,
            snap_to_grid: settings.snap_to_grid,
            grid_size: settings.grid_size,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn w(&self) -> i32 {
        self.rect.w
    }

    pub fn h(&self) -> i32 {
        self.rect.h
    }

    /// Content area left after removing the margin on every side.
    pub fn inner(&self) -> Rect {
        Rect::new(
            self.rect.x + self.margin,
            self.rect.y + self.margin,
            (self.rect.w - 2 * self.margin).max(0),
            (self.rect.h - 2 * self.margin).max(0),
        )
    }

    pub fn version(&self) -> EdmVersion {
        SCREEN_VERSION
    }
}
