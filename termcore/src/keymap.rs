// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! Keyboard input to PTY byte-sequence mapping (`spec.md` §5, grounded on
//! `keys.h::INPUT_KEY_MAPPING`).
//!
//! The source indexes a GLFW keycode table; termcore instead matches on
//! `crossterm::event::KeyEvent` since the app binary's debug view already
//! depends on `crossterm` for its own input loop. Multi-byte results (the
//! arrow keys) are returned in on-the-wire order, not the source's
//! little-endian-packed `int`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Sentinel for a key with no PTY byte mapping (`keys.h::KEY_UNMAPPED`).
const UNMAPPED: Option<&[u8]> = None;

/// Resolves a key event to the bytes that should be written to the PTY, or
/// `None` if the key has no mapping (e.g. a bare Escape, Insert, or
/// Delete, all unmapped in the source table).
#[must_use]
pub fn key_to_bytes(event: KeyEvent) -> Option<Vec<u8>> {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = event.code {
            let lower = c.to_ascii_lowercase();
            if lower.is_ascii_lowercase() {
                let byte = lower as u8 - 0x60;
                trace!(key = %c, byte, "control+letter mapping");
                return Some(vec![byte]);
            }
        }
    }

    let shift = event.modifiers.contains(KeyModifiers::SHIFT);
    match event.code {
        KeyCode::Char(c) => {
            let byte = if shift { c.to_ascii_uppercase() } else { c } as u8;
            Some(vec![byte])
        }
        KeyCode::Enter => Some(vec![0x0D]),
        KeyCode::Tab => Some(vec![0x09]),
        KeyCode::Backspace => Some(vec![0x08]),
        KeyCode::Up => Some(b"\x1B[A".to_vec()),
        KeyCode::Down => Some(b"\x1B[B".to_vec()),
        KeyCode::Right => Some(b"\x1B[C".to_vec()),
        KeyCode::Left => Some(b"\x1B[D".to_vec()),
        KeyCode::Esc | KeyCode::Insert | KeyCode::Delete => UNMAPPED.map(<[u8]>::to_vec),
        _ => {
            trace!(?event, "unmapped key event");
            None
        }
    }
}
