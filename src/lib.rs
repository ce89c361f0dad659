#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot and Buddhabrot renderer
//!
//! The Mandelbrot takes a point on the complex plane and repeatedly
//! squares it and adds the original point back, counting how many
//! iterations it takes for the result to run off to infinity.  That
//! count, the escape time, is the number used to render the image.
//!
//! The Buddhabrot looks at the same iteration from the other side.
//! Every iteration creates a new complex number that itself may be
//! used as a coordinate on the complex plane.  By mapping that
//! coordinate to the nearest pixel and incrementing that pixel by one,
//! we can plot the "orbit" of every seed that eventually escapes.  The
//! density of all those orbits is the Buddhabrot.
//!
//! Both engines split their pixel grids into contiguous blocks, one
//! per worker thread, and wait for every worker before moving on.

pub mod buddhabrot;
pub mod color;
pub mod config;
pub mod error;
pub mod escape;
pub mod mandelbrot;
pub mod output;
pub mod partition;
pub mod planes;
pub mod progress;

pub use crate::buddhabrot::Buddhabrot;
pub use crate::config::{Config, Mode};
pub use crate::error::RenderError;
pub use crate::mandelbrot::Mandelbrot;
pub use crate::planes::{Geometry, Pixel};
pub use crate::progress::{Progress, Silent, TextBar};

use log::info;
use std::sync::Arc;

/// Validates the configuration, runs the engine it asks for and saves
/// the result.
pub fn render(config: &Config, progress: Arc<dyn Progress>) -> Result<(), RenderError> {
    config.validate()?;
    let geometry = config.geometry()?;
    match config.mode {
        Mode::Mandelbrot { iterations } => {
            let mut engine = Mandelbrot::new(geometry).with_progress(progress);
            engine.calculate(config.threads, iterations)?;
            engine.save(&config.output)?;
        }
        Mode::Buddhabrot {
            points,
            min,
            max,
            seed,
        } => {
            let mut engine = Buddhabrot::new(geometry).with_progress(progress);
            if let Some(seed) = seed {
                engine = engine.with_seed(seed);
            }
            engine.calculate(config.threads, points, min, max)?;
            engine.save(&config.output)?;
        }
    }
    info!("wrote {}", config.output.display());
    Ok(())
}
