// Copyright (c) 2026 termcore contributors. Licensed under Apache License, Version 2.0.

//! A crossterm-rendered view of a [`TerminalCore`]'s grid, standing in for
//! the GPU window the real application would open.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyEvent};
use crossterm::style::Print;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{execute, queue};
use termcore::TerminalCore;

pub struct DebugView {
    stdout: Stdout,
}

impl DebugView {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, Hide, Clear(ClearType::All))?;
        Ok(DebugView { stdout })
    }

    pub fn render(&mut self, core: &TerminalCore) -> io::Result<()> {
        let (cols, rows) = core.visible_size();
        queue!(self.stdout, MoveTo(0, 0))?;
        for y in 0..rows {
            queue!(self.stdout, MoveTo(0, y))?;
            for x in 0..cols {
                let cell = core.cell(x, y);
                let ch = char::from_u32(cell.code_point).unwrap_or(' ');
                queue!(self.stdout, Print(ch))?;
            }
        }
        let (cx, cy) = core.cursor();
        queue!(self.stdout, MoveTo(cx, cy))?;
        self.stdout.flush()
    }

    pub fn poll_key_event(&self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(Some(key)),
            _ => Ok(None),
        }
    }

    pub fn poll_resize(&self) -> io::Result<Option<(u16, u16)>> {
        // crossterm delivers resizes through the same event queue as key
        // presses; the thin loop only asks for one event per tick so a
        // resize that arrives alongside a keypress is picked up on the
        // next tick instead of being dropped.
        if !event::poll(Duration::from_millis(0))? {
            return Ok(None);
        }
        match event::read()? {
            Event::Resize(cols, rows) => Ok(Some((cols, rows))),
            _ => Ok(None),
        }
    }

    pub fn shutdown(&mut self) -> io::Result<()> {
        execute!(self.stdout, Show)?;
        disable_raw_mode()
    }
}
