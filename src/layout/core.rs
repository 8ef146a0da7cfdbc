use crate::choices::AlignmentChoice;
use crate::error::{EdlError, Result};
use crate::geometry::Rect;

use super::policy::{Arrangement, Policy, StackAlignment};

/// Spacing box layouts start with.
pub const DEFAULT_SPACING: i32 = 5;

/// A container that positions its children according to a [`Policy`].
///
/// The layout only stores its settings and anchor; children live in the
/// tree and its size is always derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    name: String,
    policy: Policy,
    spacing: i32,
    pub(crate) origin: (i32, i32),
}

impl Layout {
    fn with_policy(policy: Policy, spacing: i32) -> Self {
        Self {
            name: policy.label().to_string(),
            policy,
            spacing,
            origin: (0, 0),
        }
    }

    /// Children left to right, top aligned.
    pub fn horizontal() -> Self {
        Self::with_policy(Policy::Horizontal(AlignmentChoice::Top), DEFAULT_SPACING)
    }

    /// Children top to bottom, left aligned.
    pub fn vertical() -> Self {
        Self::with_policy(Policy::Vertical(AlignmentChoice::Left), DEFAULT_SPACING)
    }

    /// Children on top of each other, centered on the first.
    pub fn stacked() -> Self {
        Self::with_policy(Policy::Stacked(StackAlignment::centered()), 0)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_origin(mut self, x: i32, y: i32) -> Self {
        self.origin = (x, y);
        self
    }

    pub fn with_spacing(mut self, spacing: i32) -> Result<Self> {
        self.set_spacing(spacing)?;
        Ok(self)
    }

    pub fn with_alignment(mut self, alignment: AlignmentChoice) -> Result<Self> {
        self.set_alignment(alignment)?;
        Ok(self)
    }

    pub fn with_stack_alignment(mut self, choices: &[AlignmentChoice]) -> Result<Self> {
        self.set_stack_alignment(choices)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    pub fn is_stacked(&self) -> bool {
        matches!(self.policy, Policy::Stacked(_))
    }

    /// Gap between children; stacked layouts have none.
    pub fn spacing(&self) -> Option<i32> {
        (!self.is_stacked()).then_some(self.spacing)
    }

    pub(crate) fn set_spacing(&mut self, spacing: i32) -> Result<()> {
        if self.is_stacked() {
            if spacing != 0 {
                return Err(EdlError::policy(format!(
                    "stacked layout `{}` has no spacing",
                    self.name
                )));
            }
            return Ok(());
        }
        if spacing < 0 {
            return Err(EdlError::validation(
                "spacing",
                format!("{spacing} is negative"),
            ));
        }
        self.spacing = spacing;
        Ok(())
    }

    /// Box layouts store the tag as-is; stacked layouts read it as a
    /// single-axis alignment and center the other axis.
    pub(crate) fn set_alignment(&mut self, alignment: AlignmentChoice) -> Result<()> {
        self.policy = match self.policy {
            Policy::Horizontal(_) => Policy::Horizontal(alignment),
            Policy::Vertical(_) => Policy::Vertical(alignment),
            Policy::Stacked(_) => Policy::Stacked(StackAlignment::from_choices(&[alignment])?),
        };
        Ok(())
    }

    pub(crate) fn set_stack_alignment(&mut self, choices: &[AlignmentChoice]) -> Result<()> {
        if !self.is_stacked() {
            return Err(EdlError::policy(format!(
                "`{}` is not stacked and aligns along one axis only",
                self.name
            )));
        }
        self.policy = Policy::Stacked(StackAlignment::from_choices(choices)?);
        Ok(())
    }

    /// Box alignment, or `None` for stacked layouts.
    pub fn alignment(&self) -> Option<AlignmentChoice> {
        match self.policy {
            Policy::Horizontal(alignment) | Policy::Vertical(alignment) => Some(alignment),
            Policy::Stacked(_) => None,
        }
    }

    pub fn stack_alignment(&self) -> Option<StackAlignment> {
        match self.policy {
            Policy::Stacked(alignment) => Some(alignment),
            _ => None,
        }
    }

    pub fn arrange(&self, children: &[Rect]) -> Arrangement {
        self.policy.arrange(self.origin, self.spacing, children)
    }

    /// Layout rectangle: anchored at the origin, sized by the children's
    /// bounding box.
    pub fn rect_over(&self, children: &[Rect]) -> Result<Rect> {
        let bounds = Rect::bounding(children.iter().copied())
            .ok_or_else(|| EdlError::EmptyLayout(self.name.clone()))?;
        Ok(Rect::new(self.origin.0, self.origin.1, bounds.w, bounds.h))
    }
}
