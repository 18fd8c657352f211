// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! Byte-at-a-time streaming decoder (`spec.md` §4.1).
//!
//! Consumes raw PTY bytes one at a time and produces zero or one [`Emit`]
//! per byte. Never blocks, never panics, and never rejects malformed input:
//! invalid UTF-8 and truncated escape sequences degrade to the replacement
//! character or are silently absorbed, matching the source's own tolerance
//! for garbage input.

mod csi;

use tracing::{debug, warn};

use crate::effect::{CodePoint, Emit, REPLACEMENT};

/// Longest CSI/OSC/DCS argument buffer before bytes are dropped (the
/// source's `char buf[128]` with no bounds check; here the cap actually
/// holds).
const ARG_BUF_CAP: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceType {
    Csi,
    Osc,
    Dcs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Plain,
    /// Mid-sequence UTF-8 continuation bytes. `len` is the total encoded
    /// length, `seen` the continuation bytes consumed so far.
    Utf8 { len: u8, seen: u8, collected: u32 },
    /// Just saw `ESC` (0x1B); waiting on the byte that selects CSI/OSC/DCS
    /// or, for anything else, falls through to `Arguments` reusing
    /// whatever `seq_type`/`arg_buf` state is already sitting in the
    /// decoder (preserved verbatim from the source; see `DESIGN.md`).
    Escape,
    Arguments,
}

/// A resumable byte-stream decoder. Feed it one byte at a time; it never
/// blocks and always returns promptly.
#[derive(Debug)]
pub struct Decoder {
    stage: Stage,
    seq_type: SequenceType,
    arg_buf: Vec<u8>,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Decoder { stage: Stage::Plain, seq_type: SequenceType::Csi, arg_buf: Vec::with_capacity(ARG_BUF_CAP) }
    }

    /// Feeds a single byte, returning the effect it produced, if any.
    pub fn feed(&mut self, byte: u8) -> Option<Emit> {
        match self.stage {
            Stage::Plain => self.plain_byte(byte),
            Stage::Utf8 { .. } => self.utf8_byte(byte),
            Stage::Escape => self.escape_byte(byte),
            Stage::Arguments => self.args_byte(byte),
        }
    }

    fn plain_byte(&mut self, byte: u8) -> Option<Emit> {
        match byte {
            0x1B => {
                self.stage = Stage::Escape;
                None
            }
            0x07 => Some(Emit::Bell),
            0x08 => Some(Emit::Backspace),
            0x09 => Some(Emit::Tab),
            0x0A => Some(Emit::LineFeed),
            0x0D => Some(Emit::CarriageReturn),
            0x0B | 0x0C | 0x7F => {
                // No effect, matching `executeC0ControlCode`'s missing
                // cases for VT, FF, and DEL.
                None
            }
            0x00..=0x7F => Some(Emit::Print(CodePoint::from(byte))),
            _ => self.utf8_leading_byte(byte),
        }
    }

    fn utf8_leading_byte(&mut self, byte: u8) -> Option<Emit> {
        let (len, initial) = if byte & 0b1110_0000 == 0b1100_0000 {
            (2u8, u32::from(byte & 0b0001_1111))
        } else if byte & 0b1111_0000 == 0b1110_0000 {
            (3, u32::from(byte & 0b0000_1111))
        } else if byte & 0b1111_1000 == 0b1111_0000 {
            (4, u32::from(byte & 0b0000_0111))
        } else {
            warn!(byte, "invalid UTF-8 leading byte");
            return Some(Emit::Print(REPLACEMENT));
        };
        self.stage = Stage::Utf8 { len, seen: 1, collected: initial };
        None
    }

    fn utf8_byte(&mut self, byte: u8) -> Option<Emit> {
        let Stage::Utf8 { len, seen, collected } = self.stage else { unreachable!() };
        if byte & 0b1100_0000 != 0b1000_0000 {
            warn!(byte, "expected UTF-8 continuation byte, got something else");
            self.stage = Stage::Plain;
            // The offending byte itself still needs to go through the
            // normal plain-text path rather than being dropped.
            return self.plain_byte(byte).or(Some(Emit::Print(REPLACEMENT)));
        }
        let collected = (collected << 6) | u32::from(byte & 0b0011_1111);
        let seen = seen + 1;
        if seen < len {
            self.stage = Stage::Utf8 { len, seen, collected };
            None
        } else {
            self.stage = Stage::Plain;
            // Overlong encodings and surrogate code points are accepted
            // as-is (spec.md §9 open question: left unspecified).
            Some(Emit::Print(collected))
        }
    }

    fn escape_byte(&mut self, byte: u8) -> Option<Emit> {
        match byte {
            b'[' => {
                self.seq_type = SequenceType::Csi;
                self.arg_buf.clear();
                self.stage = Stage::Arguments;
                None
            }
            b']' => {
                self.seq_type = SequenceType::Osc;
                self.arg_buf.clear();
                self.stage = Stage::Arguments;
                None
            }
            b'P' => {
                self.seq_type = SequenceType::Dcs;
                self.arg_buf.clear();
                self.stage = Stage::Arguments;
                None
            }
            _ => {
                // Fallthrough quirk preserved from `handleStageEscape`:
                // any other byte after ESC is handed to the arguments
                // stage with whatever `seq_type`/`arg_buf` was last left
                // over, rather than resetting to plain text.
                debug!(byte, "ESC followed by unrecognized selector byte, falling through to arguments stage");
                self.stage = Stage::Arguments;
                self.args_byte(byte)
            }
        }
    }

    fn args_byte(&mut self, byte: u8) -> Option<Emit> {
        match self.seq_type {
            SequenceType::Csi => self.csi_byte(byte),
            SequenceType::Osc => self.osc_byte(byte),
            SequenceType::Dcs => self.dcs_byte(byte),
        }
    }

    fn csi_byte(&mut self, byte: u8) -> Option<Emit> {
        let is_final = (0x40..=0x7E).contains(&byte);
        if self.arg_buf.len() < ARG_BUF_CAP {
            self.arg_buf.push(byte);
        } else {
            warn!("CSI argument buffer full, dropping byte");
        }
        if !is_final {
            return None;
        }
        self.stage = Stage::Plain;
        let buf = std::mem::take(&mut self.arg_buf);
        csi::dispatch(&buf)
    }

    fn osc_byte(&mut self, byte: u8) -> Option<Emit> {
        // Terminators are BEL (7-bit) or ST (8-bit); `spec.md` §4.1 does
        // not include the 2-byte 7-bit ST (`ESC \`) form.
        if byte == 0x07 || byte == 0x9C {
            self.stage = Stage::Plain;
            let buf = std::mem::take(&mut self.arg_buf);
            return Some(osc_emit(&buf));
        }
        if self.arg_buf.len() < ARG_BUF_CAP {
            self.arg_buf.push(byte);
        } else {
            warn!("OSC argument buffer full, abandoning sequence");
            self.arg_buf.clear();
            self.stage = Stage::Plain;
        }
        None
    }

    fn dcs_byte(&mut self, byte: u8) -> Option<Emit> {
        // The original stub always "terminates" a DCS sequence
        // immediately without executing anything; here we absorb bytes
        // silently until the argument buffer saturates, then fall back
        // to plain text (spec.md §9: DCS terminator left unspecified).
        if self.arg_buf.len() < ARG_BUF_CAP {
            self.arg_buf.push(byte);
        } else {
            debug!("DCS sequence exceeded buffer cap, abandoning");
            self.arg_buf.clear();
            self.stage = Stage::Plain;
        }
        None
    }
}

fn osc_emit(buf: &[u8]) -> Emit {
    const TITLE_PREFIX: &[u8] = b"0;";
    if let Some(title) = buf.strip_prefix(TITLE_PREFIX) {
        Emit::SetWindowTitle(title.to_vec())
    } else {
        debug!(len = buf.len(), "OSC sequence without window-title prefix, ignoring payload");
        Emit::SetWindowTitle(Vec::new())
    }
}
