// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one error type the library hands back.

use failure::Fail;
use std::io;

/// Everything that can go wrong while setting up or running a render.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The pixel grid or its complex-plane window cannot be built.
    #[fail(display = "invalid geometry: {}", _0)]
    InvalidGeometry(String),

    /// A phase was asked to run on zero workers.
    #[fail(display = "thread count must be at least 1")]
    NoThreads,

    /// An iteration limit of zero makes every point trivially "bounded".
    #[fail(display = "iteration limit must be at least 1")]
    NoIterations,

    /// The Buddhabrot window (min, max) selects nothing.
    #[fail(
        display = "iteration window is empty: min ({}) must be below max ({})",
        min, max
    )]
    EmptyWindow {
        /// Lower, exclusive, bound of the window.
        min: u32,
        /// Upper, exclusive, bound of the window.
        max: u32,
    },

    /// One of the workers of a phase panicked before the barrier.
    #[fail(display = "a worker thread panicked")]
    WorkerPanicked,

    /// The image could not be written.
    #[fail(display = "could not write image: {}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        RenderError::Io(err)
    }
}
