// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! Thin I/O loop host (`spec.md` §4.4): polls the PTY and the keyboard,
//! drives a [`termcore::TerminalCore`], and renders it with a crossterm
//! debug view standing in for the GPU renderer the real application would
//! use.

mod debug_view;
mod rasterizer;

use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use portable_pty::Child;
use termcore::logging::try_initialize_logging_global;
use termcore::traits::{PtyReader, PtyWriter};
use termcore::TerminalCore;
use termcore_pty::PtyProcess;
use tracing::{info, warn};

use crate::rasterizer::{NullSink, NullRasterizer};

/// GPU-accelerated terminal emulator core, driven here by a text-only
/// debug view.
#[derive(Debug, Parser)]
#[command(name = "termcore-app", version, about)]
struct Args {
    /// Shell to spawn. Defaults to /bin/bash.
    #[arg(long, default_value = "")]
    shell: String,

    /// Initial column count.
    #[arg(long, default_value_t = 80)]
    cols: u16,

    /// Initial row count.
    #[arg(long, default_value_t = 24)]
    rows: u16,

    /// Nominal glyph pixel size. Unused by the debug view; kept so a real
    /// GPU renderer can be swapped in without touching the CLI surface.
    #[arg(long, default_value_t = 16)]
    font_pixel_size: u32,

    /// Log level filter (e.g. "info", "debug", "termcore=trace").
    #[arg(long, default_value = "warn")]
    log_level: String,
}

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const PTY_READ_CHUNK: usize = 4096;

fn main() -> Result<()> {
    let args = Args::parse();
    try_initialize_logging_global(&args.log_level);
    info!(shell = %args.shell, cols = args.cols, rows = args.rows, "starting termcore-app");

    let mut pty = PtyProcess::spawn(&args.shell, args.cols, args.rows)
        .into_diagnostic()
        .wrap_err("failed to spawn shell")?;

    let mut rasterizer = NullRasterizer::new(args.font_pixel_size);
    let mut sink = NullSink;
    let mut core = TerminalCore::new(args.cols, args.rows, &mut rasterizer, &mut sink)
        .into_diagnostic()
        .wrap_err("failed to initialize terminal core")?;

    let mut view = debug_view::DebugView::new().into_diagnostic().wrap_err("failed to start debug view")?;
    let mut read_buf = [0u8; PTY_READ_CHUNK];

    let result = run_loop(&mut core, &mut pty, &mut view, &mut read_buf, &mut rasterizer, &mut sink);
    view.shutdown().into_diagnostic()?;
    result
}

fn run_loop(
    core: &mut TerminalCore,
    pty: &mut PtyProcess,
    view: &mut debug_view::DebugView,
    read_buf: &mut [u8],
    rasterizer: &mut NullRasterizer,
    sink: &mut NullSink,
) -> Result<()> {
    loop {
        if let Some(exit_status) = pty.child_mut().try_wait().into_diagnostic()? {
            info!(?exit_status, "shell exited");
            return Ok(());
        }

        let n = pty.read_nonblocking(read_buf).into_diagnostic().wrap_err("PTY read failed")?;
        let mut scrolled = false;
        for &byte in &read_buf[..n] {
            if core.feed_pty_byte(byte, rasterizer, sink).is_some() {
                scrolled = true;
            }
        }
        if n > 0 || scrolled {
            view.render(core).into_diagnostic()?;
        }

        if let Some(event) = view.poll_key_event(POLL_INTERVAL).into_diagnostic()? {
            if let Some(bytes) = core.key_to_pty_bytes(event) {
                if let Err(e) = pty.write_all_retrying(&bytes) {
                    warn!(error = %e, "dropping keystroke, PTY write failed");
                }
            }
        }

        if let Some((cols, rows)) = view.poll_resize().into_diagnostic()? {
            core.resize(cols, rows);
            if let Err(e) = pty.set_window_size(cols, rows) {
                warn!(error = %e, "failed to propagate resize to PTY");
            }
        }
    }
}
