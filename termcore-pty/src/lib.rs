// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! Spawns a shell behind a PTY and implements termcore's
//! [`PtyReader`]/[`PtyWriter`] traits over it (`spec.md` §4.3, grounded on
//! `terminal.c::spawnShell`).
//!
//! The source spawns with `forkpty` + `execl("/bin/bash", ...)` and marks
//! the master fd `O_NONBLOCK`. `portable-pty` gives the same shape
//! (non-blocking master reader/writer) without hand-rolling `fork`/`exec`.

use std::io::{self, ErrorKind, Read, Write};
use std::time::Duration;

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use termcore::traits::{PtyReader, PtyWriter};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure modes specific to spawning and sizing a PTY. These are
/// category-3 conditions the caller should treat as fatal at startup.
#[derive(Debug, Error)]
pub enum PtySpawnError {
    #[error("failed to open a PTY: {0}")]
    OpenFailed(String),
    #[error("failed to spawn shell {shell:?}: {source}")]
    SpawnFailed { shell: String, source: String },
    #[error("failed to resize PTY: {0}")]
    ResizeFailed(String),
}

/// A spawned shell's PTY master, split into the reader/writer termcore's
/// traits expect plus the child handle for lifecycle management.
pub struct PtyProcess {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    reader: Box<dyn Read + Send>,
    child: Box<dyn Child + Send + Sync>,
}

impl std::fmt::Debug for PtyProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyProcess").finish_non_exhaustive()
    }
}

impl PtyProcess {
    /// Spawns `shell` (falling back to `/bin/bash` if empty) attached to a
    /// new PTY sized `cols`x`rows`.
    pub fn spawn(shell: &str, cols: u16, rows: u16) -> Result<Self, PtySpawnError> {
        let shell = if shell.is_empty() { "/bin/bash" } else { shell };
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 })
            .map_err(|e| PtySpawnError::OpenFailed(e.to_string()))?;

        let cmd = CommandBuilder::new(shell);
        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| PtySpawnError::SpawnFailed { shell: shell.to_string(), source: e.to_string() })?;
        drop(pair.slave);

        let writer = pair.master.take_writer().map_err(|e| PtySpawnError::OpenFailed(e.to_string()))?;
        let reader = pair.master.try_clone_reader().map_err(|e| PtySpawnError::OpenFailed(e.to_string()))?;

        debug!(shell, cols, rows, "spawned shell behind PTY");
        Ok(PtyProcess { master: pair.master, writer, reader, child })
    }

    #[must_use]
    pub fn child_mut(&mut self) -> &mut (dyn Child + Send + Sync) {
        self.child.as_mut()
    }
}

impl PtyReader for PtyProcess {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }
}

/// Bytes to retry per attempt and the backoff between attempts, used when
/// a write doesn't drain the whole buffer in one call (`spec.md` §9:
/// intentional divergence from the source's fire-and-forget `write()`,
/// which silently drops the undelivered remainder on a partial write).
const WRITE_RETRY_BACKOFF: Duration = Duration::from_micros(500);
const MAX_WRITE_RETRIES: u32 = 16;

impl PtyWriter for PtyProcess {
    fn write_all_retrying(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut remaining = buf;
        let mut attempts = 0;
        while !remaining.is_empty() {
            match self.writer.write(remaining) {
                Ok(0) => {
                    attempts += 1;
                    if attempts > MAX_WRITE_RETRIES {
                        return Err(io::Error::new(ErrorKind::WriteZero, "PTY write stalled after max retries"));
                    }
                    std::thread::sleep(WRITE_RETRY_BACKOFF);
                }
                Ok(n) => {
                    remaining = &remaining[n..];
                    attempts = 0;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    attempts += 1;
                    if attempts > MAX_WRITE_RETRIES {
                        return Err(e);
                    }
                    std::thread::sleep(WRITE_RETRY_BACKOFF);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn set_window_size(&mut self, cols: u16, rows: u16) -> io::Result<()> {
        self.master
            .resize(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 })
            .map_err(|e| {
                warn!(error = %e, "failed to resize PTY");
                io::Error::other(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use pretty_assertions::assert_eq;

    use super::*;

    /// Reads from `pty` until `needle` appears in the accumulated output or
    /// `timeout` elapses, returning everything read so far.
    fn read_until(pty: &mut PtyProcess, needle: &str, timeout: Duration) -> Vec<u8> {
        let deadline = Instant::now() + timeout;
        let mut acc = Vec::new();
        let mut buf = [0u8; 4096];
        while Instant::now() < deadline {
            match pty.read_nonblocking(&mut buf) {
                Ok(0) => std::thread::sleep(Duration::from_millis(10)),
                Ok(n) => {
                    acc.extend_from_slice(&buf[..n]);
                    if String::from_utf8_lossy(&acc).contains(needle) {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        acc
    }

    #[test]
    fn spawn_echo_produces_expected_output() {
        let mut pty = PtyProcess::spawn("echo", 80, 24).unwrap();
        // `echo` with no arguments just emits a newline and exits; confirm
        // the PTY round-trips *something* rather than staying silent.
        let output = read_until(&mut pty, "\n", Duration::from_secs(5));
        assert!(!output.is_empty());
    }

    #[test]
    fn cat_echoes_back_written_input() {
        let mut pty = PtyProcess::spawn("cat", 80, 24).unwrap();
        pty.write_all_retrying(b"hello pty\n").unwrap();
        let output = read_until(&mut pty, "hello pty", Duration::from_secs(5));
        assert!(String::from_utf8_lossy(&output).contains("hello pty"));
    }

    #[test]
    fn set_window_size_succeeds_on_live_pty() {
        let mut pty = PtyProcess::spawn("cat", 80, 24).unwrap();
        assert!(pty.set_window_size(120, 40).is_ok());
    }

    #[test]
    fn spawn_rejects_nonexistent_shell() {
        let result = PtyProcess::spawn("/no/such/binary-termcore-test", 80, 24);
        assert!(result.is_err());
    }
}
