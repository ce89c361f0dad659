// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The classic iterator function, and the orbit replay that the
//! Buddhabrot builds on.

use num::Complex;

/// The square of the escape radius.  Once |z|² passes this the orbit
/// is known to go to infinity.
pub const ESCAPE_NORM_SQR: f64 = 4.0;

/// Iterates z ← z² + c from z = 0 and returns the index of the first
/// iteration whose result lies outside the escape radius.  Points
/// that never leave within `limit` iterations return `limit`.
#[inline]
pub fn escape_time(c: Complex<f64>, limit: u32) -> u32 {
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    for i in 0..limit {
        z = z * z + c;
        if z.norm_sqr() > ESCAPE_NORM_SQR {
            return i;
        }
    }
    limit
}

/// Walks the orbit of `c` for `steps` iterations, handing every point
/// visited to `visit`.  Given a point's escape time as `steps`, this
/// visits every point of the orbit except the one that escaped.
#[inline]
pub fn replay_orbit<F>(c: Complex<f64>, steps: u32, mut visit: F)
where
    F: FnMut(&Complex<f64>),
{
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    for _ in 0..steps {
        z = z * z + c;
        visit(&z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_time(Complex::new(0.0, 0.0), 50), 50);
        assert_eq!(escape_time(Complex::new(0.0, 0.0), 1), 1);
    }

    #[test]
    fn two_escapes_at_once() {
        assert!(escape_time(Complex::new(2.0, 0.0), 50) <= 1);
    }

    #[test]
    fn far_points_escape_on_the_first_iteration() {
        assert_eq!(escape_time(Complex::new(3.0, 3.0), 50), 0);
    }

    #[test]
    fn escape_time_is_bounded_and_deterministic() {
        let samples = [
            Complex::new(-0.75, 0.1),
            Complex::new(0.3, 0.5),
            Complex::new(-1.0, 0.0),
            Complex::new(-2.0, 0.0),
            Complex::new(0.26, 0.0),
            Complex::new(-0.1, 0.9),
        ];
        for c in samples.iter() {
            let first = escape_time(*c, 200);
            assert!(first <= 200);
            assert_eq!(first, escape_time(*c, 200));
        }
    }

    #[test]
    fn zero_limit_returns_zero() {
        assert_eq!(escape_time(Complex::new(5.0, 0.0), 0), 0);
    }

    #[test]
    fn replay_stops_before_the_escaped_point() {
        let c = Complex::new(1.0, 0.0);
        // 1, 2, 5: the third iteration is the one that escapes.
        let steps = escape_time(c, 100);
        assert_eq!(steps, 2);
        let mut seen = vec![];
        replay_orbit(c, steps, |z| seen.push(*z));
        assert_eq!(seen, vec![Complex::new(1.0, 0.0), Complex::new(2.0, 0.0)]);
    }
}
