/// Screen-space geometry in pixels.
/// Y grows downward; `Rect` is left/top/width/height like the level fixtures.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn dist_sq(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Rect { left, top, width, height }
    }

    /// Rectangle of the given half-extents centred on `c`.
    pub fn centered(c: Vec2, half_w: f32, half_h: f32) -> Self {
        Rect::new(c.x - half_w, c.y - half_h, half_w * 2.0, half_h * 2.0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && self.right() > other.left
            && self.top < other.bottom()
            && self.bottom() > other.top
    }

    /// Horizontal spans overlap (ignores Y).
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.right() > other.left && self.left < other.right()
    }

    /// Inclusive point containment on the X axis.
    #[inline]
    pub fn spans_x(&self, x: f32) -> bool {
        self.left <= x && x <= self.right()
    }

    /// Half-open containment (left/top inclusive), used for pointer hits.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }
}
