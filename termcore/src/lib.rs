// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! The windowless, PTY-less, GPU-less core of a terminal emulator.
//!
//! ```text
//! PTY bytes -> Decoder -> Emit -> Grid -> Cell -----> renderer
//!                                       \
//!                                        -> Atlas::get(code_point) -> texture slot
//! ```
//!
//! Everything a real terminal also needs — spawning a shell, opening a
//! window, rasterizing fonts, uploading GPU textures — is named as a trait
//! in [`traits`] and supplied by a caller (`termcore-pty`, `termcore-app`).

pub mod atlas;
pub mod color;
pub mod core;
pub mod decoder;
pub mod effect;
pub mod error;
pub mod grid;
pub mod keymap;
pub mod logging;
pub mod traits;

pub use atlas::{AtlasSlot, Cache};
pub use core::TerminalCore;
pub use decoder::Decoder;
pub use effect::{CodePoint, CursorMove, Emit, EraseTarget, SgrOp};
pub use error::TermCoreError;
pub use grid::{Cell, Grid};
