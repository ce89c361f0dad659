// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Geometry struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0 in
//! the upper left, and a rectangle on the complex plane described by
//! its center and its width along the real axis.
use num::Complex;

use crate::error::RenderError;

/// Describes the x, y of a pixel on the integral plane.  Row zero is
/// the top of the image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Contains the definitions of two planes: an integral cartesian
/// plane, and a complex cartesian plane.  Maps points from one to the
/// other.  Fixed at construction.
#[derive(Clone, Debug)]
pub struct Geometry {
    width: usize,
    height: usize,
    center: Complex<f64>,
    graph_width: f64,
    graph_height: f64,
    // The complex coordinate of pixel (0, 0).
    corner: Complex<f64>,
    // The distance between two neighbouring pixels, on both axes.
    step: f64,
}

impl Geometry {
    /// Constructor.  Takes the size of the pixel grid, the complex
    /// number at its center and the span of the real axis it covers.
    /// The imaginary span follows from the aspect ratio of the grid.
    pub fn new(
        width: usize,
        height: usize,
        center: Complex<f64>,
        graph_width: f64,
    ) -> Result<Geometry, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidGeometry(format!(
                "image size {}x{} has no pixels",
                width, height
            )));
        }
        if width.checked_mul(height).is_none() {
            return Err(RenderError::InvalidGeometry(format!(
                "image size {}x{} has too many pixels",
                width, height
            )));
        }
        if !(graph_width.is_finite() && graph_width > 0.0) {
            return Err(RenderError::InvalidGeometry(format!(
                "graph width {} must be a positive number",
                graph_width
            )));
        }
        if !(center.re.is_finite() && center.im.is_finite()) {
            return Err(RenderError::InvalidGeometry(format!(
                "center {} is not a finite point",
                center
            )));
        }

        let graph_height = graph_width * (height as f64) / (width as f64);
        let corner = Complex::new(
            center.re - graph_width / 2.0,
            center.im + graph_height / 2.0,
        );

        Ok(Geometry {
            width,
            height,
            center,
            graph_width,
            graph_height,
            corner,
            step: graph_width / (width as f64),
        })
    }

    /// Width of the pixel grid.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the pixel grid.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The complex number at the middle of the grid.
    pub fn center(&self) -> Complex<f64> {
        self.center
    }

    /// Span of the imaginary axis.
    pub fn graph_height(&self) -> f64 {
        self.graph_height
    }

    /// Span of the real axis.
    pub fn graph_width(&self) -> f64 {
        self.graph_width
    }

    /// The complex coordinate of the top-left pixel.
    pub fn corner(&self) -> Complex<f64> {
        self.corner
    }

    /// Pixel pitch on both axes.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false for a geometry that made it through `new`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Turns a linear offset into the image buffer into the pixel it
    /// stands for.
    pub fn offset_to_pixel(&self, offset: usize) -> Pixel {
        Pixel(offset % self.width, offset / self.width)
    }

    /// Given a pixel on the integral cartesian plane, map it to the
    /// complex number at its location.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.corner.re + (pixel.0 as f64) * self.step,
            self.corner.im - (pixel.1 as f64) * self.step,
        )
    }

    /// Shortcut for the engines, which walk the buffer by offset.
    #[inline]
    pub fn offset_to_point(&self, offset: usize) -> Complex<f64> {
        self.pixel_to_point(&self.offset_to_pixel(offset))
    }

    /// Given a complex number, find the nearest pixel.  Points that
    /// land outside the grid, and points that aren't finite (orbits
    /// on their way to infinity) have no pixel.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let left = ((point.re - self.corner.re) / self.step).round();
        let top = ((self.corner.im - point.im) / self.step).round();
        // A NaN fails both range checks.
        if !(0.0..self.width as f64).contains(&left) || !(0.0..self.height as f64).contains(&top)
        {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }

    /// Since the Buddhabrot actually tracks the progress of a complex
    /// number as it orbits, we have to map those complex numbers back
    /// to the pixel plane and increment the pixels the orbit passes
    /// through.  This takes a point and returns its linear offset into
    /// the image buffer, if it has one.
    #[inline]
    pub fn point_to_offset(&self, point: &Complex<f64>) -> Option<usize> {
        self.point_to_pixel(point)
            .map(|pixel| pixel.1 * self.width + pixel.0)
    }

    /// The Mandelbrot set is symmetric about the real axis, so every
    /// orbit has a mirror image.  Returns the offset of the point's
    /// conjugate.
    #[inline]
    pub fn conjugate_offset(&self, point: &Complex<f64>) -> Option<usize> {
        self.point_to_offset(&point.conj())
    }
}
