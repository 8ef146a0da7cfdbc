use serde::{Deserialize, Serialize};

/// Visibility PV and display range of a widget.
///
/// EDM shows the widget while the PV value sits in `[min, max)`; with
/// `inverted` set the range hides it instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Visibility {
    pub pv: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub inverted: bool,
}

impl Visibility {
    pub fn new(pv: impl Into<String>) -> Self {
        Self {
            pv: Some(pv.into()),
            ..Self::default()
        }
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Whether any visibility information has been entered.
    pub fn entered(&self) -> bool {
        self.pv.as_deref().is_some_and(|pv| !pv.is_empty())
            || self.min.is_some()
            || self.max.is_some()
    }

    /// A PV plus a consistent range (`min < max`, or a single bound).
    pub fn valid(&self) -> bool {
        if self.pv.as_deref().is_none_or(str::is_empty) {
            return false;
        }
        match (self.min, self.max) {
            (Some(min), Some(max)) => min < max,
            (Some(_), None) | (None, Some(_)) => true,
            (None, None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert() {
        let mut vis = Visibility::default();
        assert!(!vis.inverted);
        vis.inverted = true;
        assert!(vis.inverted);
    }

    #[test]
    fn entered() {
        let mut vis = Visibility::default();
        assert!(!vis.entered());
        vis.min = Some(1.0);
        assert!(vis.entered());
    }

    #[test]
    fn valid() {
        let mut vis = Visibility::default();
        assert!(!vis.valid());

        vis.pv = Some("TST:PV".into());
        assert!(!vis.valid());

        vis.min = Some(0.0);
        vis.max = Some(4.0);
        assert!(vis.valid());

        vis.max = Some(-1.0);
        assert!(!vis.valid());

        vis.max = None;
        assert!(vis.valid());
    }
}
