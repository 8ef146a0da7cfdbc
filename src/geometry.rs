/// Half of `value`, rounded half-up. Used for every center computation.
pub const fn half_up(value: i32) -> i32 {
    (value + 1).div_euclid(2)
}

/// Rectangle in EDM screen pixels, anchored at its top-left corner.
///
/// Positions may be negative: a centered child wider than its anchor sits to
/// the left of the layout origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn center(&self) -> (i32, i32) {
        (self.x + half_up(self.w), self.y + half_up(self.h))
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Move vertically so the bottom edge lands on `y`. Returns the new `y`.
    pub fn place_bottom(&mut self, y: i32) -> i32 {
        self.y = y - self.h;
        self.y
    }

    /// Move horizontally so the right edge lands on `x`. Returns the new `x`.
    pub fn place_right(&mut self, x: i32) -> i32 {
        self.x = x - self.w;
        self.x
    }

    /// Center on the given coordinates; an axis given as `None` is left alone.
    pub fn recenter(&mut self, x: Option<i32>, y: Option<i32>) -> (i32, i32) {
        if let Some(x) = x {
            self.x = x - half_up(self.w);
        }
        if let Some(y) = y {
            self.y = y - half_up(self.h);
        }
        (self.x, self.y)
    }

    /// Smallest rectangle enclosing every rect in `rects`, or `None` when empty.
    pub fn bounding<I>(rects: I) -> Option<Self>
    where
        I: IntoIterator<Item = Rect>,
    {
        let mut iter = rects.into_iter();
        let first = iter.next()?;
        let (mut left, mut top, mut right, mut bottom) =
            (first.x, first.y, first.right(), first.bottom());
        for rect in iter {
            left = left.min(rect.x);
            top = top.min(rect.y);
            right = right.max(rect.right());
            bottom = bottom.max(rect.bottom());
        }
        Some(Self::new(left, top, right - left, bottom - top))
    }
}
