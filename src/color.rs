// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The two fixed transfer functions from escape counts and orbit
//! densities to RGB bytes.

use num::clamp;

fn channel(v: f64) -> u8 {
    clamp(255.0 * v, 0.0, 255.0) as u8
}

/// Colors one Mandelbrot pixel.  Points inside the set (those that
/// reached the limit) are black; the rest run from dark blue through
/// yellow to white as they near the boundary.
pub fn mandelbrot_rgb(iterations: u32, limit: u32) -> [u8; 3] {
    if limit == 0 || iterations >= limit {
        return [0, 0, 0];
    }
    let v = f64::from(iterations) / f64::from(limit);
    [channel(v.powi(10)), channel(v.powi(3)), channel(v)]
}

/// Colors one Buddhabrot pixel as a gray level relative to the
/// brightest pixel.
pub fn buddhabrot_rgb(density: u64, max: u64) -> [u8; 3] {
    if max == 0 {
        return [0, 0, 0];
    }
    let v = channel(density as f64 / max as f64);
    [v, v, v]
}

/// Colors a whole escape buffer into interleaved RGB.
pub fn mandelbrot_image(iterations: &[u32], limit: u32) -> Vec<u8> {
    let mut image = Vec::with_capacity(iterations.len() * 3);
    for &i in iterations {
        image.extend_from_slice(&mandelbrot_rgb(i, limit));
    }
    image
}

/// Colors a whole accumulation buffer into interleaved RGB.
pub fn buddhabrot_image(densities: &[u64], max: u64) -> Vec<u8> {
    let mut image = Vec::with_capacity(densities.len() * 3);
    for &d in densities {
        image.extend_from_slice(&buddhabrot_rgb(d, max));
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_interior_is_black() {
        assert_eq!(mandelbrot_rgb(50, 50), [0, 0, 0]);
    }

    #[test]
    fn fast_escapes_are_dark() {
        assert_eq!(mandelbrot_rgb(0, 50), [0, 0, 0]);
        assert_eq!(mandelbrot_rgb(1, 100), [0, 0, 2]);
    }

    #[test]
    fn gradient_saturates_near_the_boundary() {
        let [r, g, b] = mandelbrot_rgb(99, 100);
        assert_eq!(b, 252);
        assert!(g > 200 && g < b);
        assert!(r > 200 && r < g);
        let [r, g, b] = mandelbrot_rgb(50, 100);
        assert_eq!((r, g, b), (0, 31, 127));
    }

    #[test]
    fn buddhabrot_is_gray() {
        assert_eq!(buddhabrot_rgb(10, 10), [255, 255, 255]);
        assert_eq!(buddhabrot_rgb(0, 10), [0, 0, 0]);
        assert_eq!(buddhabrot_rgb(5, 10), [127, 127, 127]);
        assert_eq!(buddhabrot_rgb(0, 0), [0, 0, 0]);
        let big = u64::from(u32::MAX) * 4;
        assert_eq!(buddhabrot_rgb(big, big), [255, 255, 255]);
        assert_eq!(buddhabrot_rgb(big / 2, big), [127, 127, 127]);
    }

    #[test]
    fn images_interleave_three_bytes_per_pixel() {
        let image = mandelbrot_image(&[0, 50, 100], 100);
        assert_eq!(image.len(), 9);
        assert_eq!(&image[6..], &[0, 0, 0]);
        assert_eq!(&image[3..6], &[0, 31, 127]);
        assert_eq!(buddhabrot_image(&[2, 4], 4), vec![127, 127, 127, 255, 255, 255]);
    }
}
