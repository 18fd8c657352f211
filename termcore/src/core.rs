// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! Owns the decoder, grid, and glyph cache together (`spec.md` §9 redesign
//! flag: "encapsulate as a single value instead of three globals").

use crossterm::event::KeyEvent;

use crate::atlas::{AtlasSlot, Cache};
use crate::decoder::Decoder;
use crate::error::TermCoreError;
use crate::grid::{Cell, Grid};
use crate::keymap::key_to_bytes;
use crate::traits::{AtlasTextureSink, GlyphRasterizer};

/// The terminal's full in-memory state: the byte decoder, the screen grid
/// it feeds, and the glyph cache the renderer reads from. The I/O loop
/// (`termcore-app`) drives this; it owns no PTY or GPU handles itself.
#[derive(Debug)]
pub struct TerminalCore {
    decoder: Decoder,
    grid: Grid,
    cache: Cache,
}

impl TerminalCore {
    pub fn new<R, S>(cols: u16, rows: u16, rasterizer: &mut R, sink: &mut S) -> Result<Self, TermCoreError>
    where
        R: GlyphRasterizer,
        S: AtlasTextureSink,
    {
        if cols == 0 || rows == 0 {
            return Err(TermCoreError::InvalidScreenSize { cols, rows });
        }
        Ok(TerminalCore { decoder: Decoder::new(), grid: Grid::new(cols, rows), cache: Cache::new(rasterizer, sink)? })
    }

    /// Feeds one PTY output byte through the decoder and into the grid.
    /// Returns the newly-exposed scrollback row, if a line feed scrolled
    /// the view (see `Grid::apply`).
    ///
    /// Printable code points are resolved to an atlas slot through the
    /// glyph cache before they reach the grid (`spec.md` §2: "when the
    /// Screen Model stores a printable code point, it first resolves an
    /// atlas slot through the Cache"). A rasterization failure is
    /// recoverable input malformation (`spec.md` §7 cat. 1): it is logged
    /// and the byte is dropped rather than propagated.
    pub fn feed_pty_byte<R, S>(&mut self, byte: u8, rasterizer: &mut R, sink: &mut S) -> Option<usize>
    where
        R: GlyphRasterizer,
        S: AtlasTextureSink,
    {
        let effect = self.decoder.feed(byte)?;
        if let crate::effect::Emit::Print(cp) = effect {
            match self.cache.get(cp, rasterizer, sink) {
                Ok(slot) => self.grid.print_glyph(cp, slot),
                Err(err) => {
                    tracing::warn!(error = %err, code_point = cp, "glyph rasterization failed, dropping printed byte");
                    None
                }
            }
        } else {
            self.grid.apply(effect)
        }
    }

    /// Resolves a key event to PTY-bound bytes without touching the grid;
    /// the caller is responsible for writing them to the PTY.
    #[must_use]
    pub fn key_to_pty_bytes(&self, event: KeyEvent) -> Option<Vec<u8>> {
        key_to_bytes(event)
    }

    /// Looks up (and if necessary rasterizes) the atlas slot for a code
    /// point outside the normal print path (e.g. a cursor glyph overlay).
    /// Printed cells already carry their resolved slot via
    /// [`TerminalCore::feed_pty_byte`]; this exists for callers that need
    /// one without printing.
    pub fn glyph_slot<R, S>(&mut self, code_point: u32, rasterizer: &mut R, sink: &mut S) -> Result<AtlasSlot, TermCoreError>
    where
        R: GlyphRasterizer,
        S: AtlasTextureSink,
    {
        self.cache.get(code_point, rasterizer, sink)
    }

    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Cell {
        self.grid.cell(x, y)
    }

    #[must_use]
    pub fn cursor(&self) -> (u16, u16) {
        self.grid.cursor()
    }

    #[must_use]
    pub fn visible_size(&self) -> (u16, u16) {
        self.grid.visible_size()
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.grid.resize(cols, rows);
    }

    pub fn scroll_view(&mut self, delta: i64) {
        self.grid.scroll_view(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Bitmap;
    use pretty_assertions::assert_eq;

    struct StubRasterizer;

    impl GlyphRasterizer for StubRasterizer {
        fn rasterize(&mut self, _code_point: u32) -> Result<Bitmap, TermCoreError> {
            Ok(Bitmap { width: 1, height: 1, pixels: vec![0xFF], bearing_x: 0, bearing_y: 0 })
        }
        fn tile_size(&self) -> (u32, u32) {
            (8, 8)
        }
        fn line_spacing(&self) -> u32 {
            8
        }
        fn max_below_baseline(&self) -> i32 {
            0
        }
    }

    struct StubSink;

    impl AtlasTextureSink for StubSink {
        fn upload_tile(&mut self, _slot: u16, _bitmap: &Bitmap) {}
    }

    #[test]
    fn feed_pty_byte_resolves_printed_cell_through_cache() {
        let mut raster = StubRasterizer;
        let mut sink = StubSink;
        let mut core = TerminalCore::new(10, 5, &mut raster, &mut sink).unwrap();

        core.feed_pty_byte(b'x', &mut raster, &mut sink);

        let cell = core.cell(0, 0);
        assert_eq!(cell.code_point, u32::from(b'x'));
        assert_ne!(cell.atlas_slot, AtlasSlot(0));
        assert_eq!(core.cursor(), (1, 0));
    }

    #[test]
    fn feed_pty_byte_does_not_touch_grid_for_partial_utf8() {
        let mut raster = StubRasterizer;
        let mut sink = StubSink;
        let mut core = TerminalCore::new(10, 5, &mut raster, &mut sink).unwrap();

        // First byte of a 2-byte UTF-8 sequence: decoder needs more input.
        let signal = core.feed_pty_byte(0xC3, &mut raster, &mut sink);
        assert_eq!(signal, None);
        assert_eq!(core.cursor(), (0, 0));
    }

    #[test]
    fn new_rejects_zero_sized_screen() {
        let mut raster = StubRasterizer;
        let mut sink = StubSink;
        assert!(TerminalCore::new(0, 5, &mut raster, &mut sink).is_err());
    }
}
