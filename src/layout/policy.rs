use crate::choices::AlignmentChoice;
use crate::error::{EdlError, Result};
use crate::geometry::Rect;

/// Per-axis alignment of a stacked layout. `None` centers on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackAlignment {
    pub horizontal: Option<AlignmentChoice>,
    pub vertical: Option<AlignmentChoice>,
}

impl StackAlignment {
    pub const fn centered() -> Self {
        Self {
            horizontal: None,
            vertical: None,
        }
    }

    /// Combine alignment tags, at most one per axis. `Center` sets nothing.
    pub fn from_choices(choices: &[AlignmentChoice]) -> Result<Self> {
        let mut alignment = Self::centered();
        for &choice in choices {
            let slot = if choice.is_horizontal() {
                &mut alignment.horizontal
            } else if choice.is_vertical() {
                &mut alignment.vertical
            } else {
                continue;
            };
            if let Some(previous) = slot.replace(choice) {
                return Err(EdlError::validation(
                    "alignment",
                    format!("`{previous}` and `{choice}` align the same axis"),
                ));
            }
        }
        Ok(alignment)
    }
}

/// How a layout places its children relative to the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Left to right; the alignment picks the vertical placement.
    Horizontal(AlignmentChoice),
    /// Top to bottom; the alignment picks the horizontal placement.
    Vertical(AlignmentChoice),
    /// On top of each other.
    Stacked(StackAlignment),
}

/// Result of one arrangement pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    pub rects: Vec<Rect>,
    /// Set when the alignment has no meaning for the policy; the cross axis
    /// was left alone.
    pub unsupported: Option<AlignmentChoice>,
}

impl Policy {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Horizontal(_) => "HBox",
            Self::Vertical(_) => "VBox",
            Self::Stacked(_) => "Stack",
        }
    }

    /// Place `children` for a layout anchored at `origin`.
    ///
    /// The first child always lands on the origin; the others are derived
    /// from it. Only `x`/`y` change, sizes are inputs.
    pub fn arrange(&self, origin: (i32, i32), spacing: i32, children: &[Rect]) -> Arrangement {
        let mut rects = children.to_vec();
        let Some((anchor, rest)) = rects.split_first_mut() else {
            return Arrangement {
                rects,
                unsupported: None,
            };
        };
        anchor.x = origin.0;
        anchor.y = origin.1;
        let anchor = *anchor;

        let unsupported = self.unsupported_alignment();
        match *self {
            Self::Horizontal(alignment) => {
                let mut cursor = anchor.right();
                for rect in rest.iter_mut() {
                    rect.x = cursor + spacing;
                    cursor = rect.right();
                    match alignment {
                        AlignmentChoice::Top => rect.y = anchor.y,
                        AlignmentChoice::Bottom => {
                            rect.place_bottom(anchor.bottom());
                        }
                        AlignmentChoice::Center => {
                            rect.recenter(None, Some(anchor.center().1));
                        }
                        _ => {}
                    }
                }
            }
            Self::Vertical(alignment) => {
                let mut cursor = anchor.bottom();
                for rect in rest.iter_mut() {
                    rect.y = cursor + spacing;
                    cursor = rect.bottom();
                    match alignment {
                        AlignmentChoice::Left => rect.x = anchor.x,
                        AlignmentChoice::Right => {
                            rect.place_right(anchor.right());
                        }
                        AlignmentChoice::Center => {
                            rect.recenter(Some(anchor.center().0), None);
                        }
                        _ => {}
                    }
                }
            }
            Self::Stacked(alignment) => {
                let (cx, cy) = anchor.center();
                for rect in rest.iter_mut() {
                    match alignment.horizontal {
                        Some(AlignmentChoice::Left) => rect.x = anchor.x,
                        Some(AlignmentChoice::Right) => {
                            rect.place_right(anchor.right());
                        }
                        _ => {
                            rect.recenter(Some(cx), None);
                        }
                    }
                    match alignment.vertical {
                        Some(AlignmentChoice::Top) => rect.y = anchor.y,
                        Some(AlignmentChoice::Bottom) => {
                            rect.place_bottom(anchor.bottom());
                        }
                        _ => {
                            rect.recenter(None, Some(cy));
                        }
                    }
                }
            }
        }

        Arrangement { rects, unsupported }
    }

    /// Box alignment this policy cannot honor on its cross axis.
    fn unsupported_alignment(&self) -> Option<AlignmentChoice> {
        match *self {
            Self::Horizontal(alignment) => match alignment {
                AlignmentChoice::Top | AlignmentChoice::Bottom | AlignmentChoice::Center => None,
                other => Some(other),
            },
            Self::Vertical(alignment) => match alignment {
                AlignmentChoice::Left | AlignmentChoice::Right | AlignmentChoice::Center => None,
                other => Some(other),
            },
            Self::Stacked(_) => None,
        }
    }
}
