// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! What to render and where to put it, plus the little parsers the
//! command line needs for its `WxH` and `RE,IM` values.

use itertools::Itertools;
use num::Complex;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::RenderError;
use crate::planes::Geometry;

/// Given a string and a separator, returns the two values separated
/// by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let (l, r) = s.splitn(2, separator).collect_tuple()?;
    match (T::from_str(l.trim()), T::from_str(r.trim())) {
        (Ok(l), Ok(r)) => Some((l, r)),
        _ => None,
    }
}

/// A specific implementation of parse_pair using a comma and expecting
/// floating point numbers.
pub fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

/// Which of the two images to render.
#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    /// One escape count per pixel.
    Mandelbrot {
        /// Iterations before a point counts as bounded.
        iterations: u32,
    },
    /// Orbit density of the seeds escaping inside (min, max).
    Buddhabrot {
        /// Random seeds drawn on top of the grid seeds.
        points: usize,
        /// Lower, exclusive, bound of the escape window.
        min: u32,
        /// Upper, exclusive, bound of the escape window, and the
        /// classification limit.
        max: u32,
        /// Seed for the random phase; entropy when absent.
        seed: Option<u64>,
    },
}

/// Everything needed for one render.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Where the image goes.  The extension picks the format.
    pub output: PathBuf,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// The complex number at the middle of the image.
    pub center: Complex<f64>,
    /// The span of the real axis across the image.
    pub graph_width: f64,
    /// Worker threads per phase.
    pub threads: usize,
    /// What to render.
    pub mode: Mode,
}

impl Config {
    /// Checks every value before any memory is allocated or thread
    /// spawned.
    pub fn validate(&self) -> Result<(), RenderError> {
        self.geometry()?;
        if self.threads == 0 {
            return Err(RenderError::NoThreads);
        }
        match self.mode {
            Mode::Mandelbrot { iterations } if iterations == 0 => Err(RenderError::NoIterations),
            Mode::Buddhabrot { min, max, .. } if min >= max => {
                Err(RenderError::EmptyWindow { min, max })
            }
            _ => Ok(()),
        }
    }

    /// The grid geometry described by this configuration.
    pub fn geometry(&self) -> Result<Geometry, RenderError> {
        Geometry::new(self.width, self.height, self.center, self.graph_width)
    }
}
