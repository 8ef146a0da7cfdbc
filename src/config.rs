use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::choices::ColorChoice;
use crate::error::Result;
use crate::font::Font;
use crate::logging::{Logger, METRICS_TARGET};
use crate::metrics::LayoutMetrics;

/// Persistable screen defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    pub w: i32,
    pub h: i32,
    pub margin: i32,
    pub foreground: ColorChoice,
    pub background: ColorChoice,
    pub font: Font,
    pub title: Option<String>,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub grid_size: u32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            w: 750,
            h: 1100,
            margin: 5,
            foreground: ColorChoice::Black,
            background: ColorChoice::Grey,
            font: Font::default(),
            title: None,
            show_grid: true,
            snap_to_grid: true,
            grid_size: 4,
        }
    }
}

/// How the EDM viewer is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Give up waiting for the viewer after this many milliseconds and kill
    /// it. `None` waits forever.
    pub timeout_ms: Option<u64>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            program: "edm".to_string(),
            args: vec!["-x".to_string(), "-eolc".to_string()],
            timeout_ms: None,
        }
    }
}

impl LauncherConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    screen: ScreenSettings,
    launcher: LauncherConfig,
    metrics: bool,
}

/// Everything a designer needs besides its widgets.
#[derive(Clone, Debug)]
pub struct DesignerConfig {
    pub screen: ScreenSettings,
    pub launcher: LauncherConfig,
    /// Optional structured logger shared with the tree.
    pub logger: Option<Logger>,
    /// Counters shared with the tree; `None` disables collection.
    pub metrics: Option<Arc<Mutex<LayoutMetrics>>>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            screen: ScreenSettings::default(),
            launcher: LauncherConfig::default(),
            logger: None,
            metrics: None,
            metrics_target: METRICS_TARGET.to_string(),
        }
    }
}

impl DesignerConfig {
    /// Load screen and launcher settings from JSON. Missing keys keep their
    /// defaults; `"metrics": true` enables collection.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;
        let mut config = Self {
            screen: file.screen,
            launcher: file.launcher,
            ..Self::default()
        };
        if file.metrics {
            config.enable_metrics();
        }
        Ok(config)
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(LayoutMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<LayoutMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}
