// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Buddhabrot engine.
//!
//! A render runs in four phases, each one finishing on every worker
//! before the next starts:
//!
//! 1. *Classification*: a Mandelbrot pass at the top of the iteration
//!    window gives every pixel its escape count.
//! 2. *Grid orbits*: every pixel that escapes strictly inside the
//!    window has its orbit replayed and plotted.
//! 3. *Random orbits*: seeds drawn uniformly from the square
//!    [-2, 2) × [-2, 2) are escaped and, when inside the window,
//!    plotted the same way.
//! 4. *Reduction*: the brightest pixel of the accumulation buffer is
//!    found for normalization.
//!
//! Plotting an orbit increments the pixel under each point it visits
//! and the pixel under that point's conjugate.  Many orbits cross the
//! same pixel, so the accumulation buffer is a slab of 64-bit atomics;
//! a hot pixel can pass `u32::MAX` on long runs.

use log::info;
use num::Complex;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::color;
use crate::error::RenderError;
use crate::escape::{escape_time, replay_orbit};
use crate::mandelbrot::Mandelbrot;
use crate::output;
use crate::partition::run_blocks;
use crate::planes::Geometry;
use crate::progress::{Progress, Silent, Ticker};

// Random samples between two progress reports.
const SAMPLE_BATCH: usize = 4096;

/// Derives the seed of one worker's random stream from the render
/// seed, so neighbouring workers don't draw correlated samples.
fn worker_seed(seed: u64, worker: usize) -> u64 {
    // splitmix64 finalizer
    let mut z = seed.wrapping_add((worker as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn in_window(escape: u32, min: u32, max: u32) -> bool {
    escape > min && escape < max
}

/// Replays the orbit of `c` for its `escape` count and bumps every
/// pixel it, or its mirror image, lands on.
fn plot(geometry: &Geometry, accumulation: &[AtomicU64], c: Complex<f64>, escape: u32) {
    replay_orbit(c, escape, |z| {
        if let Some(offset) = geometry.point_to_offset(z) {
            accumulation[offset].fetch_add(1, Ordering::Relaxed);
        }
        if let Some(offset) = geometry.conjugate_offset(z) {
            accumulation[offset].fetch_add(1, Ordering::Relaxed);
        }
    });
}

/// Owns the classification engine, the accumulation buffer and the
/// maximum used to normalize it.
pub struct Buddhabrot {
    mandelbrot: Mandelbrot,
    accumulation: Option<Vec<AtomicU64>>,
    max_index: Mutex<u64>,
    seed: Option<u64>,
    progress: Arc<dyn Progress>,
}

impl Buddhabrot {
    /// Allocates the classification buffer for the geometry.  The
    /// accumulation buffer waits for the first render.
    pub fn new(geometry: Geometry) -> Self {
        Buddhabrot {
            mandelbrot: Mandelbrot::new(geometry),
            accumulation: None,
            max_index: Mutex::new(0),
            seed: None,
            progress: Arc::new(Silent),
        }
    }

    /// Makes the random phase reproducible: the same seed and thread
    /// count always give the same image.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reports the progress of every phase to `progress`.
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.mandelbrot.set_progress(progress.clone());
        self.progress = progress;
        self
    }

    /// The geometry this engine renders.
    pub fn geometry(&self) -> &Geometry {
        self.mandelbrot.geometry()
    }

    /// The escape counts found by the classification phase.
    pub fn classification(&self) -> &[u32] {
        self.mandelbrot.iterations()
    }

    /// A snapshot of the accumulation buffer; all zeroes before the
    /// first render.
    pub fn densities(&self) -> Vec<u64> {
        match self.accumulation {
            Some(ref accumulation) => accumulation
                .iter()
                .map(|cell| cell.load(Ordering::Relaxed))
                .collect(),
            None => vec![0; self.geometry().len()],
        }
    }

    /// The brightest pixel found by the last reduction.
    pub fn max_index(&self) -> u64 {
        *self.max_index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs all four phases.  Orbits are plotted for seeds whose escape
    /// count lies strictly between `iteration_min` and `iteration_max`.
    pub fn calculate(
        &mut self,
        threads: usize,
        random_points: usize,
        iteration_min: u32,
        iteration_max: u32,
    ) -> Result<(), RenderError> {
        if iteration_min >= iteration_max {
            return Err(RenderError::EmptyWindow {
                min: iteration_min,
                max: iteration_max,
            });
        }
        let started = Instant::now();
        self.classify(threads, iteration_max)?;
        self.reset();
        self.accumulate_grid(threads, iteration_min, iteration_max)?;
        self.accumulate_random(threads, random_points, iteration_min, iteration_max)?;
        self.reduce(threads)?;
        info!(
            "buddhabrot: max density {} after {:?}",
            self.max_index(),
            started.elapsed()
        );
        Ok(())
    }

    /// Phase one: escape counts for every pixel, with the top of the
    /// window as the limit.
    pub fn classify(&mut self, threads: usize, iteration_max: u32) -> Result<(), RenderError> {
        self.mandelbrot
            .calculate_phase("classify", threads, iteration_max)
    }

    /// Zeroes the accumulation buffer and the maximum, allocating the
    /// buffer on first use.
    pub fn reset(&mut self) {
        let len = self.mandelbrot.geometry().len();
        let accumulation = self
            .accumulation
            .get_or_insert_with(|| (0..len).map(|_| AtomicU64::new(0)).collect());
        for cell in accumulation.iter() {
            cell.store(0, Ordering::Relaxed);
        }
        *self
            .max_index
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = 0;
    }

    fn ensure_accumulation(&mut self) {
        if self.accumulation.is_none() {
            self.reset();
        }
    }

    /// Phase two: plots the orbit of every classified pixel whose
    /// escape count falls inside the window.
    pub fn accumulate_grid(
        &mut self,
        threads: usize,
        iteration_min: u32,
        iteration_max: u32,
    ) -> Result<(), RenderError> {
        let started = Instant::now();
        self.ensure_accumulation();
        let (geometry, classes) = (self.mandelbrot.geometry(), self.mandelbrot.iterations());
        let accumulation = self.accumulation.as_deref().unwrap_or(&[]);
        info!(
            "grid orbits: window ({}, {}), {} threads",
            iteration_min, iteration_max, threads
        );

        let row = geometry.width();
        let ticker = Ticker::start(&*self.progress, "grid orbits", classes.len());
        run_blocks(classes.len(), threads, |_, block| {
            let mut pending = 0;
            for offset in block.range() {
                let escape = classes[offset];
                if in_window(escape, iteration_min, iteration_max) {
                    plot(geometry, accumulation, geometry.offset_to_point(offset), escape);
                }
                pending += 1;
                if pending == row {
                    ticker.advance(pending);
                    pending = 0;
                }
            }
            ticker.advance(pending);
        })?;

        info!("grid orbits: done in {:?}", started.elapsed());
        Ok(())
    }

    /// Phase three: draws `random_points` seeds, split across the
    /// workers, each worker with its own random stream.
    pub fn accumulate_random(
        &mut self,
        threads: usize,
        random_points: usize,
        iteration_min: u32,
        iteration_max: u32,
    ) -> Result<(), RenderError> {
        let started = Instant::now();
        self.ensure_accumulation();
        let geometry = self.mandelbrot.geometry();
        let accumulation = self.accumulation.as_deref().unwrap_or(&[]);
        let seed = self.seed;
        info!(
            "random orbits: {} samples, window ({}, {}), {} threads",
            random_points, iteration_min, iteration_max, threads
        );

        let square = Uniform::new(-2.0_f64, 2.0_f64);
        let ticker = Ticker::start(&*self.progress, "random orbits", random_points);
        run_blocks(random_points, threads, |worker, block| {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(worker_seed(seed, worker)),
                None => StdRng::from_entropy(),
            };
            let mut pending = 0;
            for _ in block.range() {
                let c = Complex::new(square.sample(&mut rng), square.sample(&mut rng));
                let escape = escape_time(c, iteration_max);
                if in_window(escape, iteration_min, iteration_max) {
                    plot(geometry, accumulation, c, escape);
                }
                pending += 1;
                if pending == SAMPLE_BATCH {
                    ticker.advance(pending);
                    pending = 0;
                }
            }
            ticker.advance(pending);
        })?;

        info!("random orbits: done in {:?}", started.elapsed());
        Ok(())
    }

    /// Phase four: every worker scans its block for a local maximum and
    /// merges it into the shared one.  The lock is only taken for the
    /// merge.
    pub fn reduce(&mut self, threads: usize) -> Result<(), RenderError> {
        self.ensure_accumulation();
        let accumulation = self.accumulation.as_deref().unwrap_or(&[]);
        let max_index = &self.max_index;
        let ticker = Ticker::start(&*self.progress, "reduce", accumulation.len());
        run_blocks(accumulation.len(), threads, |_, block| {
            let local = accumulation[block.range()]
                .iter()
                .map(|cell| cell.load(Ordering::Relaxed))
                .max()
                .unwrap_or(0);
            {
                let mut max = max_index.lock().unwrap_or_else(PoisonError::into_inner);
                if local > *max {
                    *max = local;
                }
            }
            ticker.advance(block.len);
        })
    }

    /// Colors the accumulation buffer as gray levels relative to the
    /// brightest pixel.
    pub fn to_rgb(&self) -> Vec<u8> {
        color::buddhabrot_image(&self.densities(), self.max_index())
    }

    /// Writes the colored accumulation buffer to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        let geometry = self.geometry();
        output::save(path, geometry.width(), geometry.height(), &self.to_rgb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Buddhabrot {
        Buddhabrot::new(Geometry::new(80, 60, Complex::new(-0.5, 0.0), 4.0).unwrap())
    }

    #[test]
    fn empty_window_is_rejected() {
        let mut b = small();
        assert!(b.calculate(2, 100, 50, 50).is_err());
        assert!(b.calculate(2, 100, 60, 50).is_err());
    }

    #[test]
    fn densities_start_at_zero() {
        let b = small();
        assert!(b.densities().iter().all(|&d| d == 0));
        assert_eq!(b.max_index(), 0);
    }

    #[test]
    fn classification_uses_the_top_of_the_window() {
        let mut b = small().with_seed(1);
        b.calculate(3, 0, 5, 40).unwrap();
        assert!(b.classification().iter().all(|&i| i <= 40));
        assert!(b.classification().iter().any(|&i| i == 40));
    }

    #[test]
    fn max_index_matches_a_sequential_scan() {
        let mut b = small().with_seed(7);
        b.calculate(4, 20_000, 3, 200).unwrap();
        let densities = b.densities();
        let scanned = *densities.iter().max().unwrap();
        assert!(scanned > 0);
        assert_eq!(b.max_index(), scanned);
    }

    #[test]
    fn accumulation_never_decreases_between_phases() {
        let mut b = small().with_seed(11);
        b.classify(2, 100).unwrap();
        b.reset();
        b.accumulate_grid(2, 2, 100).unwrap();
        let after_grid = b.densities();
        b.accumulate_random(3, 5_000, 2, 100).unwrap();
        let after_random = b.densities();
        assert!(after_grid.iter().zip(after_random.iter()).all(|(a, b)| a <= b));
        assert!(after_random.iter().sum::<u64>() > after_grid.iter().sum::<u64>());
        b.reduce(2).unwrap();
        assert_eq!(b.densities(), after_random);
    }

    #[test]
    fn orbits_are_symmetric_about_the_real_axis() {
        // With the real axis on row 15, row y mirrors row 30 - y.
        let geometry = Geometry::new(30, 30, Complex::new(-0.5, 0.0), 3.3).unwrap();
        let mut b = Buddhabrot::new(geometry).with_seed(3);
        b.calculate(2, 1_000, 2, 60).unwrap();
        let d = b.densities();
        assert!(d.iter().any(|&v| v > 0));
        for y in 1..30 {
            for x in 0..30 {
                assert_eq!(d[y * 30 + x], d[(30 - y) * 30 + x]);
            }
        }
    }

    #[test]
    fn seeded_renders_are_reproducible() {
        let mut first = small().with_seed(42);
        first.calculate(3, 10_000, 2, 100).unwrap();
        let mut second = small().with_seed(42);
        second.calculate(3, 10_000, 2, 100).unwrap();
        assert_eq!(first.densities(), second.densities());
        assert_eq!(first.max_index(), second.max_index());
    }

    #[test]
    fn rerunning_starts_from_zero() {
        let mut b = small().with_seed(5);
        b.calculate(2, 2_000, 2, 100).unwrap();
        let once = b.densities();
        b.calculate(2, 2_000, 2, 100).unwrap();
        assert_eq!(b.densities(), once);
    }

    #[test]
    fn worker_seeds_differ() {
        assert_ne!(worker_seed(0, 0), worker_seed(0, 1));
        assert_ne!(worker_seed(1, 0), worker_seed(0, 0));
    }

    #[test]
    fn hot_pixels_keep_counting_past_u32() {
        let geometry = Geometry::new(16, 16, Complex::new(0.0, 0.0), 16.0).unwrap();
        let accumulation: Vec<AtomicU64> = (0..256).map(|_| AtomicU64::new(0)).collect();
        let hot = 8 * 16 + 9;
        accumulation[hot].store(u64::from(u32::MAX), Ordering::Relaxed);
        plot(&geometry, &accumulation, Complex::new(1.0, 0.0), 2);
        assert_eq!(
            accumulation[hot].load(Ordering::Relaxed),
            u64::from(u32::MAX) + 2
        );
    }

    #[test]
    fn plot_skips_the_escaped_point() {
        let geometry = Geometry::new(16, 16, Complex::new(0.0, 0.0), 16.0).unwrap();
        let accumulation: Vec<AtomicU64> = (0..256).map(|_| AtomicU64::new(0)).collect();
        // Orbit of 1: 1, 2, then 5 escapes.  Both real, so each point
        // and its conjugate land on the same pixel.
        plot(&geometry, &accumulation, Complex::new(1.0, 0.0), 2);
        let hits: Vec<u64> = accumulation.iter().map(|a| a.load(Ordering::Relaxed)).collect();
        assert_eq!(hits.iter().sum::<u64>(), 4);
        assert_eq!(hits[8 * 16 + 9], 2);
        assert_eq!(hits[8 * 16 + 10], 2);
        assert_eq!(hits[geometry.point_to_offset(&Complex::new(5.0, 0.0)).unwrap()], 0);
    }
}
