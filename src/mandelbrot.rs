// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Mandelbrot engine: one escape count per pixel, computed by
//! handing every worker its own slice of the escape buffer.

use log::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::color;
use crate::error::RenderError;
use crate::escape::escape_time;
use crate::output;
use crate::partition::run_slices;
use crate::planes::Geometry;
use crate::progress::{Progress, Silent, Ticker};

/// Owns a grid geometry and the escape buffer that covers it.
pub struct Mandelbrot {
    geometry: Geometry,
    iterations: Vec<u32>,
    limit: u32,
    progress: Arc<dyn Progress>,
}

impl Mandelbrot {
    /// Allocates the escape buffer for the geometry.  Nothing is
    /// computed until `calculate`.
    pub fn new(geometry: Geometry) -> Self {
        let iterations = vec![0; geometry.len()];
        Mandelbrot {
            geometry,
            iterations,
            limit: 0,
            progress: Arc::new(Silent),
        }
    }

    /// Reports progress of every subsequent `calculate` to `progress`.
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub(crate) fn set_progress(&mut self, progress: Arc<dyn Progress>) {
        self.progress = progress;
    }

    /// The geometry this engine renders.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The escape counts of the last `calculate`, one per pixel, row
    /// major from the top left.
    pub fn iterations(&self) -> &[u32] {
        &self.iterations
    }

    /// The limit used by the last `calculate`.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Fills the escape buffer with the escape count of every pixel,
    /// split across `threads` workers.
    pub fn calculate(&mut self, threads: usize, limit: u32) -> Result<(), RenderError> {
        self.calculate_phase("mandelbrot", threads, limit)
    }

    pub(crate) fn calculate_phase(
        &mut self,
        phase: &str,
        threads: usize,
        limit: u32,
    ) -> Result<(), RenderError> {
        if limit == 0 {
            return Err(RenderError::NoIterations);
        }
        self.limit = limit;
        let started = Instant::now();
        info!(
            "{}: {} pixels, limit {}, {} threads",
            phase,
            self.geometry.len(),
            limit,
            threads
        );

        let geometry = &self.geometry;
        let ticker = Ticker::start(&*self.progress, phase, geometry.len());
        let row = geometry.width();
        run_slices(&mut self.iterations, threads, |block, region| {
            for (n, chunk) in region.chunks_mut(row).enumerate() {
                let base = block.start + n * row;
                for (i, cell) in chunk.iter_mut().enumerate() {
                    *cell = escape_time(geometry.offset_to_point(base + i), limit);
                }
                ticker.advance(chunk.len());
            }
        })?;

        info!("{}: done in {:?}", phase, started.elapsed());
        Ok(())
    }

    /// Colors the escape buffer with the Mandelbrot gradient.
    pub fn to_rgb(&self) -> Vec<u8> {
        color::mandelbrot_image(&self.iterations, self.limit)
    }

    /// Writes the colored escape buffer to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        output::save(
            path,
            self.geometry.width(),
            self.geometry.height(),
            &self.to_rgb(),
        )
    }
}
