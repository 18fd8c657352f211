// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! A single screen cell (`spec.md` §3 `Cell`).

use crate::atlas::AtlasSlot;
use crate::color::{default_color, Color};
use crate::effect::CodePoint;

/// Sentinel slot rendered as blank; no glyph is ever cached there in
/// ordinary operation (`spec.md` §3 `Cell`).
const EMPTY_SLOT: AtlasSlot = AtlasSlot(0);

/// One character position on the grid: the atlas slot the renderer should
/// sample plus the foreground color it was printed with (`spec.md` §3
/// `Cell = (atlas_slot, fg_color)`). `code_point` and `bg`/`bold`/`reverse`
/// are carried alongside for the non-GPU debug view and future SGR
/// extensions; they are not part of the distilled spec's pair but don't
/// contradict it — see `DESIGN.md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub atlas_slot: AtlasSlot,
    pub code_point: CodePoint,
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub reverse: bool,
}

impl Cell {
    #[must_use]
    pub const fn blank() -> Self {
        Cell { atlas_slot: EMPTY_SLOT, code_point: ' ' as CodePoint, fg: Color { r: 0, g: 0, b: 0 }, bg: Color { r: 0, g: 0, b: 0 }, bold: false, reverse: false }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atlas_slot == EMPTY_SLOT
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell { atlas_slot: EMPTY_SLOT, code_point: ' ' as CodePoint, fg: default_color(), bg: default_color(), bold: false, reverse: false }
    }
}

/// Current SGR graphics state, applied to every cell printed until changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsState {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub reverse: bool,
}

impl Default for GraphicsState {
    fn default() -> Self {
        GraphicsState { fg: default_color(), bg: default_color(), bold: false, reverse: false }
    }
}

impl GraphicsState {
    #[must_use]
    pub fn to_cell(self, code_point: CodePoint, atlas_slot: AtlasSlot) -> Cell {
        Cell { atlas_slot, code_point, fg: self.fg, bg: self.bg, bold: self.bold, reverse: self.reverse }
    }
}
