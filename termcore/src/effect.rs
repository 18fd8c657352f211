// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! The decoder's output alphabet (`spec.md` §4.1 `Emit`) and the screen-model
//! effects it carries.

use crate::color::Color;

/// A Unicode code point. Overlong/surrogate/out-of-range UTF-8 sequences are
/// not rejected (`spec.md` §4.1, §9 open question) — this simply holds
/// whatever bit pattern the byte sequence assembled to.
pub type CodePoint = u32;

/// Substituted for invalid UTF-8 (`spec.md` §3).
pub const REPLACEMENT: CodePoint = 0xFFFD;

/// CSI cursor-movement effects (final bytes `A`-`H`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Up(u16),
    Down(u16),
    Forward(u16),
    Back(u16),
    NextLine(u16),
    PrevLine(u16),
    ColumnAbsolute(u16),
    /// `row`/`col` are the raw 1-based CSI parameters (row first, then
    /// column), matching the xterm `CSI row;col H` convention used by the
    /// worked example in `spec.md` §8. See `DESIGN.md` for why this
    /// supersedes the table's `x`/`y` labels.
    Position { row: u16, col: u16 },
}

/// CSI erase effects (final bytes `J`/`K`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseTarget {
    /// `n` from `ESC[nJ`: 0 = cursor..end, 1 = start..cursor, 2 = whole
    /// screen, 3 = whole screen + scrollback.
    Display(u8),
    /// `n` from `ESC[nK`: 0 = cursor..EOL, 1 = BOL..cursor, 2 = whole line.
    Line(u8),
}

/// A single SGR (`m`) sub-command, applied in argument order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrOp {
    Reset,
    Fg(Color),
    Bg(Color),
    /// `38`/`48` recognized but extended-color parsing is stubbed per
    /// `spec.md` §4.1 ("application MAY be stubbed").
    ExtendedFg,
    ExtendedBg,
    Unknown(i64),
}

/// Everything the decoder can hand back from a single `feed()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit {
    Print(CodePoint),
    CursorMove(CursorMove),
    Erase(EraseTarget),
    SetGraphics(Vec<SgrOp>),
    SetWindowTitle(Vec<u8>),
    Bell,
    Backspace,
    Tab,
    LineFeed,
    CarriageReturn,
}
