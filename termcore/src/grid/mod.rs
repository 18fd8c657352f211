// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! The circular screen grid (`spec.md` §3 `Grid`, invariants G1-G3).

mod cell;

pub use cell::{Cell, GraphicsState};

use tracing::{trace, warn};

use crate::atlas::AtlasSlot;
use crate::effect::{CodePoint, CursorMove, Emit, EraseTarget, SgrOp};

/// Total rows backing the ring buffer, including scrollback.
pub const ROWS: usize = 1000;
/// Maximum columns any row can hold.
pub const COLS: usize = 500;

/// A circular-buffer screen grid. `row_origin` is the physical row index
/// that maps to logical row 0 (Invariant G1: `physical(y) = (row_origin +
/// y) % ROWS`); scrolling the live view advances `row_origin` instead of
/// copying rows.
#[derive(Debug)]
pub struct Grid {
    cells: Vec<Cell>,
    row_origin: usize,
    visible_rows: u16,
    visible_cols: u16,
    cursor_x: u16,
    cursor_y: u16,
    scroll_offset: usize,
    graphics: GraphicsState,
}

impl Grid {
    /// Creates a grid with the given visible viewport. Panics if either
    /// dimension is zero or exceeds the backing buffer — callers should
    /// validate against `TermCoreError::InvalidScreenSize` first.
    #[must_use]
    pub fn new(visible_cols: u16, visible_rows: u16) -> Self {
        assert!(visible_cols > 0 && usize::from(visible_cols) <= COLS);
        assert!(visible_rows > 0 && usize::from(visible_rows) <= ROWS);
        Grid {
            cells: vec![Cell::default(); ROWS * COLS],
            row_origin: 0,
            visible_rows,
            visible_cols,
            cursor_x: 0,
            cursor_y: 0,
            scroll_offset: 0,
            graphics: GraphicsState::default(),
        }
    }

    #[must_use]
    pub fn cursor(&self) -> (u16, u16) {
        (self.cursor_x, self.cursor_y)
    }

    #[must_use]
    pub fn visible_size(&self) -> (u16, u16) {
        (self.visible_cols, self.visible_rows)
    }

    fn physical_row(&self, y: usize) -> usize {
        (self.row_origin + y) % ROWS
    }

    fn cell_index(&self, x: u16, y: usize) -> usize {
        self.physical_row(y) * COLS + usize::from(x)
    }

    /// Reads the cell at `(x, y)` in the *viewed* frame: when
    /// `scroll_offset` is nonzero this looks further back into scrollback
    /// history instead of the live viewport (`spec.md` §4.2 `scroll_view`).
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Cell {
        let logical_row = i64::from(y) - self.scroll_offset as i64;
        let physical = (self.row_origin as i64 + logical_row).rem_euclid(ROWS as i64) as usize;
        self.cells[physical * COLS + usize::from(x)]
    }

    /// Applies a single decoded effect to the grid. Returns `Some(row)`
    /// with the newly-exposed physical row index whenever a line feed
    /// advances `row_origin` (the signal a renderer can use to know a
    /// fresh scrollback row became available), `None` otherwise.
    ///
    /// `Emit::Print` is not handled here: printing a code point first
    /// requires resolving an atlas slot through the glyph cache
    /// (`spec.md` §4.2), which the grid has no access to. Callers route
    /// `Print` through [`Grid::print_glyph`] instead — see
    /// `TerminalCore::feed_pty_byte`.
    pub fn apply(&mut self, effect: Emit) -> Option<usize> {
        match effect {
            Emit::Print(cp) => {
                warn!(cp, "Emit::Print reached Grid::apply; route through print_glyph instead");
                None
            }
            Emit::CursorMove(m) => {
                self.move_cursor(m);
                None
            }
            Emit::Erase(target) => {
                self.erase(target);
                None
            }
            Emit::SetGraphics(ops) => {
                self.set_graphics(&ops);
                None
            }
            Emit::LineFeed => self.line_feed(),
            Emit::CarriageReturn => {
                self.cursor_x = 0;
                None
            }
            Emit::Backspace => {
                self.cursor_x = self.cursor_x.saturating_sub(1);
                None
            }
            Emit::Tab => {
                let next = (self.cursor_x / 8 + 1) * 8;
                self.cursor_x = next.min(self.visible_cols.saturating_sub(1));
                None
            }
            Emit::Bell | Emit::SetWindowTitle(_) => {
                // Neither effect touches the grid; handled by the caller
                // (bell/title are I/O-loop concerns, spec.md §4.4).
                None
            }
        }
    }

    /// Writes a printable code point at the cursor, using an atlas slot
    /// already resolved by the caller through the glyph cache
    /// (`spec.md` §4.2 `print(cp, fg)`), then advances the cursor. Resets
    /// `scroll_offset` to 0 so freshly printed output is visible even if
    /// the viewer had scrolled back (`spec.md` §4.2 `scroll_view`).
    /// Returns `Some(row)` under the same condition as [`Grid::apply`]
    /// when the advance wraps past the last visible row.
    pub fn print_glyph(&mut self, code_point: CodePoint, slot: AtlasSlot) -> Option<usize> {
        self.scroll_offset = 0;
        let idx = self.cell_index(self.cursor_x, usize::from(self.cursor_y));
        self.cells[idx] = self.graphics.to_cell(code_point, slot);
        self.cursor_x += 1;
        if self.cursor_x >= self.visible_cols {
            self.cursor_x = 0;
            self.line_feed()
        } else {
            None
        }
    }

    fn move_cursor(&mut self, m: CursorMove) {
        let max_y = self.visible_rows.saturating_sub(1);
        let max_x = self.visible_cols.saturating_sub(1);
        match m {
            CursorMove::Up(n) => self.cursor_y = self.cursor_y.saturating_sub(n),
            CursorMove::Down(n) => self.cursor_y = (self.cursor_y + n).min(max_y),
            CursorMove::Forward(n) => self.cursor_x = (self.cursor_x + n).min(max_x),
            CursorMove::Back(n) => self.cursor_x = self.cursor_x.saturating_sub(n),
            CursorMove::NextLine(n) => {
                self.cursor_y = (self.cursor_y + n).min(max_y);
                self.cursor_x = 0;
            }
            CursorMove::PrevLine(n) => {
                self.cursor_y = self.cursor_y.saturating_sub(n);
                self.cursor_x = 0;
            }
            CursorMove::ColumnAbsolute(col) => {
                self.cursor_x = col.saturating_sub(1).min(max_x);
            }
            CursorMove::Position { row, col } => {
                self.cursor_y = row.saturating_sub(1).min(max_y);
                self.cursor_x = col.saturating_sub(1).min(max_x);
            }
        }
    }

    /// Advances the cursor to the next line, scrolling the live view when
    /// already on the last visible row (Invariant G2: the cursor never
    /// leaves `[0, visible_rows)`).
    fn line_feed(&mut self) -> Option<usize> {
        if self.cursor_y + 1 < self.visible_rows {
            self.cursor_y += 1;
            None
        } else {
            let exposed = self.physical_row(usize::from(self.visible_rows));
            self.clear_physical_row(exposed);
            self.row_origin = (self.row_origin + 1) % ROWS;
            Some(exposed)
        }
    }

    fn clear_physical_row(&mut self, physical_row: usize) {
        let start = physical_row * COLS;
        for cell in &mut self.cells[start..start + COLS] {
            *cell = Cell::default();
        }
    }

    fn erase(&mut self, target: EraseTarget) {
        match target {
            EraseTarget::Display(n) => self.erase_display(n),
            EraseTarget::Line(n) => self.erase_line(n),
        }
    }

    fn erase_display(&mut self, n: u8) {
        match n {
            0 => self.erase_rect(self.cursor_x, self.cursor_y, self.visible_cols, self.visible_rows.saturating_sub(1)),
            1 => self.erase_rect(0, 0, self.cursor_x, self.cursor_y),
            2 | 3 => self.erase_rect(0, 0, self.visible_cols, self.visible_rows.saturating_sub(1)),
            other => warn!(n = other, "unknown CSI J argument, ignoring"),
        }
    }

    fn erase_line(&mut self, n: u8) {
        match n {
            0 => self.erase_row_span(self.cursor_y, self.cursor_x, self.visible_cols),
            1 => self.erase_row_span(self.cursor_y, 0, self.cursor_x),
            2 => self.erase_row_span(self.cursor_y, 0, self.visible_cols),
            other => warn!(n = other, "unknown CSI K argument, ignoring"),
        }
    }

    fn erase_row_span(&mut self, y: u16, from_x: u16, to_x: u16) {
        for x in from_x..to_x.min(self.visible_cols) {
            let idx = self.cell_index(x, usize::from(y));
            self.cells[idx] = Cell::default();
        }
    }

    /// Clears every row from `y0` through `y1` inclusive, honoring
    /// `row_origin` wraparound.
    fn erase_rect(&mut self, from_x: u16, y0: u16, to_x: u16, y1: u16) {
        for y in y0..=y1 {
            let (lo, hi) = if y == y0 && y == y1 {
                (from_x, to_x)
            } else if y == y0 {
                (from_x, self.visible_cols)
            } else if y == y1 {
                (0, to_x)
            } else {
                (0, self.visible_cols)
            };
            self.erase_row_span(y, lo, hi);
        }
    }

    fn set_graphics(&mut self, ops: &[SgrOp]) {
        for op in ops {
            match *op {
                // Resets both fg AND bg to the default, preserving the
                // source's `updateGraphicsState` bug verbatim.
                SgrOp::Reset => {
                    self.graphics = GraphicsState::default();
                }
                SgrOp::Fg(c) => self.graphics.fg = c,
                SgrOp::Bg(c) => self.graphics.bg = c,
                SgrOp::ExtendedFg | SgrOp::ExtendedBg | SgrOp::Unknown(_) => {
                    trace!(?op, "SGR op has no grid effect");
                }
            }
        }
    }

    /// Resizes the visible viewport in place. Existing cell contents are
    /// left untouched; the cursor is clamped into the new bounds.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.visible_cols = cols.min(COLS as u16);
        self.visible_rows = rows.min(ROWS as u16);
        self.cursor_x = self.cursor_x.min(self.visible_cols.saturating_sub(1));
        self.cursor_y = self.cursor_y.min(self.visible_rows.saturating_sub(1));
    }

    /// Moves the scrollback viewing offset by `delta` rows (positive =
    /// further back), clamped to what the ring buffer actually holds.
    pub fn scroll_view(&mut self, delta: i64) {
        let max_offset = ROWS - usize::from(self.visible_rows);
        let current = self.scroll_offset as i64;
        self.scroll_offset = (current + delta).clamp(0, max_offset as i64) as usize;
    }

    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cursor_position_matches_worked_example() {
        let mut g = Grid::new(80, 24);
        g.apply(Emit::CursorMove(CursorMove::Position { row: 5, col: 10 }));
        assert_eq!(g.cursor(), (9, 4));
    }

    #[test]
    fn cursor_up_by_three() {
        let mut g = Grid::new(80, 24);
        g.apply(Emit::CursorMove(CursorMove::Position { row: 10, col: 10 }));
        g.apply(Emit::CursorMove(CursorMove::Up(3)));
        assert_eq!(g.cursor(), (9, 6));
    }

    #[test]
    fn cursor_up_clamps_at_zero() {
        let mut g = Grid::new(80, 24);
        g.apply(Emit::CursorMove(CursorMove::Position { row: 10, col: 10 }));
        g.apply(Emit::CursorMove(CursorMove::Up(100)));
        assert_eq!(g.cursor(), (9, 0));
    }

    #[test]
    fn sgr_reset_clears_fg_and_bg() {
        use crate::color::{default_color, PALETTE};
        let mut g = Grid::new(80, 24);
        g.apply(Emit::SetGraphics(vec![SgrOp::Fg(PALETTE[1]), SgrOp::Bg(PALETTE[2])]));
        g.apply(Emit::SetGraphics(vec![SgrOp::Reset]));
        assert_eq!(g.graphics.fg, default_color());
        assert_eq!(g.graphics.bg, default_color());
    }

    #[test]
    fn end_to_end_ab_cr_cd() {
        let mut g = Grid::new(80, 24);
        g.apply(Emit::CursorMove(CursorMove::Position { row: 1, col: 4 }));
        for cp in "ab".chars() {
            g.print_glyph(cp as u32, AtlasSlot(1));
        }
        g.apply(Emit::CarriageReturn);
        for cp in "cd".chars() {
            g.print_glyph(cp as u32, AtlasSlot(1));
        }
        assert_eq!(g.cell(0, 0).code_point, 'c' as u32);
        assert_eq!(g.cell(1, 0).code_point, 'd' as u32);
    }

    #[test]
    fn print_glyph_stores_resolved_atlas_slot() {
        let mut g = Grid::new(80, 24);
        g.print_glyph('x' as u32, AtlasSlot(42));
        let cell = g.cell(0, 0);
        assert_eq!(cell.atlas_slot, AtlasSlot(42));
        assert!(!cell.is_empty());
    }

    #[test]
    fn default_cell_is_empty() {
        let g = Grid::new(80, 24);
        assert!(g.cell(0, 0).is_empty());
    }

    #[test]
    fn line_feed_at_bottom_advances_row_origin() {
        let mut g = Grid::new(4, 2);
        g.apply(Emit::CursorMove(CursorMove::Position { row: 2, col: 1 }));
        let signal = g.apply(Emit::LineFeed);
        assert!(signal.is_some());
        assert_eq!(g.row_origin, 1);
        assert_eq!(g.cursor(), (0, 1));
    }

    #[test]
    fn tab_advances_to_next_stop() {
        let mut g = Grid::new(80, 24);
        g.apply(Emit::Tab);
        assert_eq!(g.cursor(), (8, 0));
    }

    #[test]
    fn scroll_view_reveals_history_rows() {
        // spec.md §8: writing ROWS + visible_rows newlines, then
        // scroll_view(+5), reveals the 5 most recent history rows above
        // the live viewport instead of the live screen.
        let mut g = Grid::new(4, 3);
        for i in 0..(ROWS + 3) {
            g.print_glyph((b'0' + (i % 10) as u8) as u32, AtlasSlot(1));
            g.apply(Emit::LineFeed);
            g.apply(Emit::CarriageReturn);
        }
        let live_top = g.cell(0, 0).code_point;

        g.scroll_view(5);
        assert_eq!(g.scroll_offset(), 5);
        let scrolled_top = g.cell(0, 0).code_point;
        assert_ne!(scrolled_top, live_top);

        g.scroll_view(-5);
        assert_eq!(g.scroll_offset(), 0);
        assert_eq!(g.cell(0, 0).code_point, live_top);
    }

    #[test]
    fn scroll_view_clamps_to_available_history() {
        let mut g = Grid::new(80, 24);
        g.scroll_view(i64::MAX);
        assert_eq!(g.scroll_offset(), ROWS - 24);
        g.scroll_view(-(i64::MAX));
        assert_eq!(g.scroll_offset(), 0);
    }

    #[test]
    fn print_glyph_resets_scroll_offset_to_live_view() {
        let mut g = Grid::new(80, 24);
        g.scroll_view(5);
        assert_eq!(g.scroll_offset(), 5);
        g.print_glyph('z' as u32, AtlasSlot(1));
        assert_eq!(g.scroll_offset(), 0);
    }

    #[test]
    fn erase_display_zero_clears_cursor_to_end_of_screen() {
        let mut g = Grid::new(4, 3);
        for cp in "abcdefghijkl".chars() {
            g.print_glyph(cp as u32, AtlasSlot(1));
        }
        // Cursor wrapped back to (0, 0) after filling all 3 rows; move it
        // into the middle row so the erase must reach rows below it too.
        g.apply(Emit::CursorMove(CursorMove::Position { row: 2, col: 3 }));
        g.apply(Emit::Erase(EraseTarget::Display(0)));

        assert!(g.cell(2, 1).is_empty());
        assert!(g.cell(0, 2).is_empty());
        assert!(g.cell(3, 2).is_empty());
        // Untouched: everything strictly before the cursor on row 1.
        assert!(!g.cell(0, 1).is_empty());
        assert!(!g.cell(1, 1).is_empty());
    }
}
