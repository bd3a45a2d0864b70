use ratatui::layout::Rect;

use crate::snapshot::TargetView;

/// Maps square board coordinates onto a rectangle of terminal cells.
///
/// Drawing and mouse hits both go through [`BoardProjection::cell_rect`], so a
/// click lands on exactly the target painted in that cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardProjection {
    pub area: Rect,
    pub board_size: u32,
}

impl BoardProjection {
    pub fn new(area: Rect, board_size: u32) -> Self {
        Self { area, board_size }
    }

    /// Cell holding board point `(x, y)`
    pub fn to_cell(&self, x: u32, y: u32) -> (u16, u16) {
        let col = scale(x, self.area.width, self.board_size);
        let row = scale(y, self.area.height, self.board_size);
        (self.area.x + col, self.area.y + row)
    }

    /// Cells covered by a square footprint of `size` board units, at least one each way
    pub fn footprint(&self, size: u32) -> (u16, u16) {
        (
            scale(size, self.area.width, self.board_size).max(1),
            scale(size, self.area.height, self.board_size).max(1),
        )
    }

    /// Cells a `size` square with its top-left corner at `(x, y)` is painted on
    pub fn cell_rect(&self, x: u32, y: u32, size: u32) -> Rect {
        let (col, row) = self.to_cell(x, y);
        let (w, h) = self.footprint(size);
        Rect::new(col, row, w, h).intersection(self.area)
    }

    /// Topmost target painted on a cell; lower orders are painted last.
    pub fn target_under<'a>(
        &self,
        targets: &'a [TargetView],
        size: u32,
        column: u16,
        row: u16,
    ) -> Option<&'a TargetView> {
        targets
            .iter()
            .filter(|t| {
                let rect = self.cell_rect(t.position.x, t.position.y, size);
                column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
            })
            .min_by_key(|t| t.order)
    }
}

fn scale(v: u32, cells: u16, board_size: u32) -> u16 {
    if board_size == 0 {
        return 0;
    }
    let scaled = v as u64 * cells as u64 / board_size as u64;
    scaled.min(cells.saturating_sub(1) as u64) as u16
}
