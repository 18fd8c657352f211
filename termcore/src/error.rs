// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! Fatal, startup-only error conditions (`spec.md` §7 category 3).
//!
//! Recoverable input malformation and resource saturation are never
//! represented here — those are logged and clamped in place by the
//! decoder, grid, and cache themselves.

use thiserror::Error;

/// Conditions that abort the process at startup. None of these can occur
/// once the main loop is running.
#[derive(Debug, Error)]
pub enum TermCoreError {
    #[error("failed to load glyph atlas: {0}")]
    AtlasLoad(String),

    #[error("failed to initialize glyph rasterizer: {0}")]
    RasterizerInit(String),

    #[error("screen dimensions must be positive, got {cols}x{rows}")]
    InvalidScreenSize { cols: u16, rows: u16 },
}
