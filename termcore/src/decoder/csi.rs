// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! CSI argument parsing and final-byte dispatch (`spec.md` §4.1 CSI table).

use tracing::warn;

use crate::color::{BRIGHT_PALETTE, PALETTE};
use crate::effect::{CursorMove, Emit, EraseTarget, SgrOp};

/// At most 20 arguments; excess are discarded with a diagnostic.
pub const MAX_CSI_ARGS: usize = 20;

/// Fixed-capacity argument list, mirroring the original's `int args[20]`.
#[derive(Debug, Default)]
struct CsiArgs {
    values: [i64; MAX_CSI_ARGS],
    count: usize,
}

impl CsiArgs {
    fn get(&self, index: usize) -> Option<i64> {
        (index < self.count).then(|| self.values[index])
    }

    fn push(&mut self, value: i64) {
        if self.count >= MAX_CSI_ARGS {
            warn!(value, "CSI argument list full, discarding excess argument");
            return;
        }
        self.values[self.count] = value;
        self.count += 1;
    }
}

/// Left-to-right decimal accumulation over `buf`, splitting on `;` and on
/// the final command byte itself (the original's `lastByte` sentinel is
/// reused as a second separator, a quirk preserved here since any argument
/// byte equal to the final command byte would behave identically in the
/// source).
fn parse_args(buf: &[u8], last_byte: u8) -> CsiArgs {
    let mut args = CsiArgs::default();
    let mut value: i64 = 0;
    let mut parsing = false;
    for &c in buf {
        if c == b';' || c == last_byte {
            if parsing {
                args.push(value);
            }
            value = 0;
            parsing = false;
        } else if c.is_ascii_digit() {
            value = value * 10 + i64::from(c - b'0');
            parsing = true;
        } else {
            warn!(byte = c, "non-digit byte in CSI argument, ignoring");
        }
    }
    args
}

/// Parses and dispatches a complete CSI sequence (`buf` excludes the `ESC
/// [`, includes the final byte). Returns `None` for sequences that are
/// accepted but carry no `Emit` (unknown final byte, no-op scroll).
pub fn dispatch(buf: &[u8]) -> Option<Emit> {
    let Some(&last_byte) = buf.last() else {
        return None;
    };

    let takes_args = matches!(
        last_byte,
        b'A'..=b'H' | b'J' | b'K' | b'S' | b'T' | b'm'
    );
    let args = if takes_args { parse_args(buf, last_byte) } else { CsiArgs::default() };

    let n = |default: i64| args.get(0).unwrap_or(default);

    match last_byte {
        b'A' => Some(Emit::CursorMove(CursorMove::Up(n(1).max(0) as u16))),
        b'B' => Some(Emit::CursorMove(CursorMove::Down(n(1).max(0) as u16))),
        b'C' => Some(Emit::CursorMove(CursorMove::Forward(n(1).max(0) as u16))),
        b'D' => Some(Emit::CursorMove(CursorMove::Back(n(1).max(0) as u16))),
        b'E' => Some(Emit::CursorMove(CursorMove::NextLine(n(1).max(0) as u16))),
        b'F' => Some(Emit::CursorMove(CursorMove::PrevLine(n(1).max(0) as u16))),
        b'G' => Some(Emit::CursorMove(CursorMove::ColumnAbsolute(n(0).max(0) as u16))),
        b'H' => {
            // Row first, then column (xterm `CSI row;col H`) — see
            // `DESIGN.md` for why this differs from the table's literal
            // `x`/`y` labels.
            let row = args.get(0).unwrap_or(1).max(1) as u16;
            let col = args.get(1).unwrap_or(1).max(1) as u16;
            Some(Emit::CursorMove(CursorMove::Position { row, col }))
        }
        b'J' => Some(Emit::Erase(EraseTarget::Display(n(0).clamp(0, 3) as u8))),
        b'K' => Some(Emit::Erase(EraseTarget::Line(n(0).clamp(0, 2) as u8))),
        b'S' | b'T' => {
            warn!(final_byte = %(last_byte as char), "CSI scroll command accepted but not implemented");
            None
        }
        b'm' => Some(Emit::SetGraphics(sgr_ops(&args))),
        other => {
            warn!(final_byte = other, "unsupported CSI command");
            None
        }
    }
}

fn sgr_ops(args: &CsiArgs) -> Vec<SgrOp> {
    if args.count == 0 {
        return vec![sgr_op(0)];
    }
    (0..args.count).map(|i| sgr_op(args.get(i).unwrap_or(0))).collect()
}

fn sgr_op(command: i64) -> SgrOp {
    match command {
        0 => SgrOp::Reset,
        30..=37 => SgrOp::Fg(PALETTE[(command - 30) as usize]),
        40..=47 => SgrOp::Bg(PALETTE[(command - 40) as usize]),
        90..=97 => SgrOp::Fg(BRIGHT_PALETTE[(command - 90) as usize]),
        100..=107 => SgrOp::Bg(BRIGHT_PALETTE[(command - 100) as usize]),
        38 => SgrOp::ExtendedFg,
        48 => SgrOp::ExtendedBg,
        other => {
            warn!(command = other, "unhandled SGR command");
            SgrOp::Unknown(other)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_position_uses_row_then_col() {
        let emit = dispatch(b"5;10H");
        assert_eq!(emit, Some(Emit::CursorMove(CursorMove::Position { row: 5, col: 10 })));
    }

    #[test]
    fn cursor_up_defaults_to_one() {
        assert_eq!(dispatch(b"A"), Some(Emit::CursorMove(CursorMove::Up(1))));
    }

    #[test]
    fn sgr_red_maps_to_palette_one() {
        let emit = dispatch(b"31m");
        assert_eq!(emit, Some(Emit::SetGraphics(vec![SgrOp::Fg(PALETTE[1])])));
    }

    #[test]
    fn sgr_reset_with_no_args() {
        assert_eq!(dispatch(b"m"), Some(Emit::SetGraphics(vec![SgrOp::Reset])));
    }

    #[test]
    fn excess_arguments_are_discarded() {
        let mut buf = Vec::new();
        for _ in 0..25 {
            buf.extend_from_slice(b"1;");
        }
        buf.push(b'm');
        let args = parse_args(&buf, b'm');
        assert_eq!(args.count, MAX_CSI_ARGS);
    }

    #[test]
    fn erase_display_clamps_unknown_n() {
        assert_eq!(dispatch(b"9J"), Some(Emit::Erase(EraseTarget::Display(3))));
    }
}
