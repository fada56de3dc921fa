use std::cell::Cell;

use ratatui::layout::{Position, Rect};

use crate::geometry::{Bounds, Point};
use crate::layout::Glyph;
use crate::target::{Boundable, RenderTarget};

/// Size of one terminal cell in viewport units. Cells are usually about twice as tall as wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f64,
    pub height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 2.0,
        }
    }
}

impl CellMetrics {
    pub fn bounds(&self, rect: Rect) -> Bounds {
        Bounds::from_cells(rect, self.width, self.height)
    }

    /// Viewport position of the middle of the cell at `column`, `row`.
    pub fn cell_center(&self, column: u16, row: u16) -> Point {
        Point::new(
            (column as f64 + 0.5) * self.width,
            (row as f64 + 0.5) * self.height,
        )
    }
}

/// The area a label is drawn into. Unmounted until the first layout pass.
#[derive(Debug, Default)]
pub struct TerminalRegion {
    area: Cell<Option<Rect>>,
    metrics: CellMetrics,
}

impl TerminalRegion {
    pub fn new(metrics: CellMetrics) -> Self {
        Self {
            area: Cell::new(None),
            metrics,
        }
    }

    pub fn set_area(&self, area: Rect) {
        self.area.set(Some(area));
    }

    pub fn unmount(&self) {
        self.area.set(None);
    }

    pub fn area(&self) -> Option<Rect> {
        self.area.get()
    }
}

impl Boundable for TerminalRegion {
    fn bounds(&self) -> Option<Bounds> {
        self.area.get().map(|area| self.metrics.bounds(area))
    }
}

/// One glyph occupying `width` cells on a single row.
#[derive(Debug, Clone)]
pub struct CellGlyph {
    symbol: String,
    column: u16,
    width: u16,
    position: Position,
    metrics: CellMetrics,
    style: String,
}

impl CellGlyph {
    pub fn new(glyph: &Glyph, metrics: CellMetrics) -> Self {
        Self {
            symbol: glyph.symbol.clone(),
            column: glyph.column,
            width: glyph.width,
            position: Position::new(glyph.column, 0),
            metrics,
            style: String::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn area(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, 1)
    }

    /// Last font-variation string applied, empty before the first frame.
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Move so the label starts at `origin`.
    pub fn place(&mut self, origin: Position) {
        self.position = Position::new(origin.x.saturating_add(self.column), origin.y);
    }
}

impl RenderTarget for CellGlyph {
    fn bounds(&self) -> Bounds {
        self.metrics.bounds(self.area())
    }

    fn set_style(&mut self, style: &str) {
        self.style.clear();
        self.style.push_str(style);
    }
}

/// Center a label of `label_width` columns in `area` and move its glyphs there.
///
/// Returns the single-row rect the label occupies, clipped to `area`.
pub fn place_label(area: Rect, label_width: u16, glyphs: &mut [Option<CellGlyph>]) -> Rect {
    let width = label_width.min(area.width);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + area.height.saturating_sub(1) / 2;
    let origin = Position::new(x, y);

    for glyph in glyphs.iter_mut().flatten() {
        glyph.place(origin);
    }

    Rect::new(x, y, width, area.height.min(1))
}
