use std::cell::Cell;

use crate::geometry::Bounds;

/// A region whose on-screen bounds can be queried. `None` while it is not mounted.
pub trait Boundable {
    fn bounds(&self) -> Option<Bounds>;
}

impl Boundable for Bounds {
    fn bounds(&self) -> Option<Bounds> {
        Some(*self)
    }
}

impl Boundable for Cell<Option<Bounds>> {
    fn bounds(&self) -> Option<Bounds> {
        self.get()
    }
}

/// A positioned glyph that accepts a font-variation style string.
///
/// Applying a style changes presentation only, never the glyph's text or position.
pub trait RenderTarget {
    /// Bounding box in viewport space.
    fn bounds(&self) -> Bounds;

    fn set_style(&mut self, style: &str);
}
