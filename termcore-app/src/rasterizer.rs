// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! Stand-ins for the GPU rasterizer/texture sink the debug view doesn't
//! need: it draws characters directly with crossterm instead of sampling
//! an atlas texture, but `TerminalCore` still needs something implementing
//! both traits to warm up.

use termcore::error::TermCoreError;
use termcore::traits::{AtlasTextureSink, Bitmap, GlyphRasterizer};
use termcore::CodePoint;

/// Produces an empty 1x1 bitmap for every code point. `font_pixel_size` is
/// stored only so a real FreeType-backed rasterizer could be substituted
/// later with the same tile geometry.
#[derive(Debug)]
pub struct NullRasterizer {
    font_pixel_size: u32,
}

impl NullRasterizer {
    #[must_use]
    pub fn new(font_pixel_size: u32) -> Self {
        NullRasterizer { font_pixel_size }
    }
}

impl GlyphRasterizer for NullRasterizer {
    fn rasterize(&mut self, _code_point: CodePoint) -> Result<Bitmap, TermCoreError> {
        Ok(Bitmap { width: 1, height: 1, pixels: vec![0], bearing_x: 0, bearing_y: 0 })
    }

    fn tile_size(&self) -> (u32, u32) {
        (self.font_pixel_size, self.font_pixel_size)
    }

    fn line_spacing(&self) -> u32 {
        self.font_pixel_size
    }

    fn max_below_baseline(&self) -> i32 {
        0
    }
}

/// Discards every upload; the debug view never samples the atlas texture.
#[derive(Debug)]
pub struct NullSink;

impl AtlasTextureSink for NullSink {
    fn upload_tile(&mut self, _slot: u16, _bitmap: &Bitmap) {}
}
