// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Progress reporting.  The engines only know about the `Progress`
//! trait; the binary decides whether anything gets drawn.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Receives (current, total) pairs from the workers of a phase.
/// Within a phase `current` only ever grows.
pub trait Progress: Send + Sync {
    /// A new phase with `total` units of work is starting.
    fn begin(&self, _phase: &str, _total: usize) {}

    /// `current` of `total` units of work are done.
    fn update(&self, current: usize, total: usize);
}

/// Reports nothing.
#[derive(Debug, Default)]
pub struct Silent;

impl Progress for Silent {
    fn update(&self, _current: usize, _total: usize) {}
}

const BAR_WIDTH: usize = 40;

#[derive(Debug, Default)]
struct BarState {
    phase: String,
    current: usize,
    drawn: usize,
}

/// A textual progress bar drawn on stderr.
#[derive(Debug, Default)]
pub struct TextBar {
    state: Mutex<BarState>,
}

impl TextBar {
    /// A bar with no phase started yet.
    pub fn new() -> Self {
        TextBar::default()
    }
}

fn render_bar(phase: &str, current: usize, total: usize) -> String {
    let filled = if total == 0 {
        BAR_WIDTH
    } else {
        current.min(total) * BAR_WIDTH / total
    };
    format!(
        "{:<12} [{}{}] {}/{}",
        phase,
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        current,
        total
    )
}

impl Progress for TextBar {
    fn begin(&self, phase: &str, total: usize) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = BarState {
            phase: phase.to_string(),
            current: 0,
            drawn: 0,
        };
        eprint!("\r{}", render_bar(phase, 0, total));
    }

    fn update(&self, current: usize, total: usize) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if current <= state.current {
            return;
        }
        state.current = current;
        // Redraw only when the bar visibly moves, or at the end.
        let cells = current.min(total) * BAR_WIDTH / total.max(1);
        if cells == state.drawn && current < total {
            return;
        }
        state.drawn = cells;
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        let _ = write!(handle, "\r{}", render_bar(&state.phase, current, total));
        if current >= total {
            let _ = writeln!(handle);
        }
        let _ = handle.flush();
    }
}

/// Shared counter the workers of one phase advance together.  The
/// count and the report happen under one lock, so the sink sees the
/// counts in order.
pub(crate) struct Ticker<'a> {
    sink: &'a dyn Progress,
    done: Mutex<usize>,
    total: usize,
}

impl<'a> Ticker<'a> {
    pub(crate) fn start(sink: &'a dyn Progress, phase: &str, total: usize) -> Self {
        sink.begin(phase, total);
        Ticker {
            sink,
            done: Mutex::new(0),
            total,
        }
    }

    pub(crate) fn advance(&self, units: usize) {
        if units == 0 {
            return;
        }
        let mut done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        *done += units;
        self.sink.update(*done, self.total);
    }
}
