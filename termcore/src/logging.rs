// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! Structured logging setup, mirroring the teacher crate's
//! `try_initialize_logging_global` naming convention.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a global `tracing` subscriber reading its filter from
/// `TERMCORE_LOG` (falling back to `default_level`). Safe to call more
/// than once — only the first call takes effect.
pub fn try_initialize_logging_global(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("TERMCORE_LOG")
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            // Another subscriber (e.g. one installed by a test harness)
            // already won; nothing more to do.
        }
    });
}
