// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! External-interface seams (`spec.md` §6): everything outside the core's
//! responsibility — PTY I/O, rasterization, GPU texture upload, wall-clock
//! time — is named here as a trait so the core stays testable without a
//! window, a shell, or a font file.

use crate::effect::CodePoint;
use crate::error::TermCoreError;

/// Non-blocking read half of a PTY master, or anything byte-stream shaped.
pub trait PtyReader {
    /// Reads available bytes into `buf`, returning the count read. `Ok(0)`
    /// means no data is currently available, not EOF — callers distinguish
    /// EOF via a separate channel (e.g. the child process exiting).
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
}

/// Write half of a PTY master. Implementations are responsible for partial
/// writes (spec.md §9: retry-with-backoff is the intentional divergence
/// from the source's fire-and-forget `write()`).
pub trait PtyWriter {
    fn write_all_retrying(&mut self, buf: &[u8]) -> std::io::Result<()>;
    fn set_window_size(&mut self, cols: u16, rows: u16) -> std::io::Result<()>;
}

/// A single-channel (alpha/coverage) glyph bitmap, tile-positioned the way
/// `glyph.c::addCodePointToAtlas` lays pixels into the shared atlas.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major single-byte coverage values.
    pub pixels: Vec<u8>,
    /// Horizontal distance from the pen origin to the left edge of the
    /// glyph (FreeType `bitmap_left`).
    pub bearing_x: i32,
    /// Vertical distance from the pen origin (baseline) to the top edge of
    /// the glyph (FreeType `bitmap_top`).
    pub bearing_y: i32,
}

/// Converts a code point into pixels. The real implementation wraps a font
/// library (FreeType in the source); tests substitute a stub.
pub trait GlyphRasterizer {
    fn rasterize(&mut self, code_point: CodePoint) -> Result<Bitmap, TermCoreError>;
    /// Fixed per-glyph tile size the atlas texture is divided into,
    /// computed once from the font's metrics (`loadBaselineFont`).
    fn tile_size(&self) -> (u32, u32);
    fn line_spacing(&self) -> u32;
    fn max_below_baseline(&self) -> i32;
}

/// Uploads a rasterized tile into GPU atlas texture memory at `slot`.
pub trait AtlasTextureSink {
    fn upload_tile(&mut self, slot: u16, bitmap: &Bitmap);
}

/// Wall-clock time, abstracted so the I/O loop's poll/backoff timing is
/// deterministic under test.
pub trait Clock {
    fn now(&self) -> std::time::Instant;
    fn sleep(&self, duration: std::time::Duration);
}
