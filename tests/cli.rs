// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn mandelbuddha() -> Command {
    Command::cargo_bin("mandelbuddha").unwrap()
}

#[test]
fn no_arguments_prints_usage() {
    mandelbuddha()
        .assert()
        .failure()
        .stderr(predicate::str::contains("USAGE"));
}

#[test]
fn missing_output_is_an_error() {
    mandelbuddha()
        .args(&["mandelbrot", "--size", "10x5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn malformed_size_is_rejected() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("m.ppm");
    mandelbuddha()
        .args(&["mandelbrot", "--size", "10by5", "-o"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
    assert!(!out.exists());
}

#[test]
fn zero_threads_are_rejected() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("m.ppm");
    mandelbuddha()
        .args(&["mandelbrot", "--threads", "0", "-o"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Thread count must be between"));
}

#[test]
fn renders_a_mandelbrot_ppm() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("m.ppm");
    mandelbuddha()
        .args(&[
            "mandelbrot",
            "--quiet",
            "--size",
            "10x5",
            "--center",
            "-0.5,0",
            "--graph-width",
            "4",
            "--threads",
            "3",
            "--iterations",
            "50",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success();
    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"P6 10 5 255\n"));
    assert_eq!(bytes.len(), b"P6 10 5 255\n".len() + 150);
}

#[test]
fn renders_a_seeded_buddhabrot_reproducibly() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.ppm");
    let second = dir.path().join("second.ppm");
    for out in &[&first, &second] {
        mandelbuddha()
            .args(&[
                "buddhabrot",
                "-q",
                "-s",
                "24x16",
                "-t",
                "2",
                "--points",
                "2000",
                "--min",
                "2",
                "--max",
                "100",
                "--seed",
                "17",
                "-o",
            ])
            .arg(out)
            .assert()
            .success();
    }
    let bytes = fs::read(&first).unwrap();
    assert!(bytes.starts_with(b"P6 24 16 255\n"));
    assert_eq!(bytes, fs::read(&second).unwrap());
}

#[test]
fn empty_window_fails_after_parsing() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("b.ppm");
    mandelbuddha()
        .args(&["buddhabrot", "-q", "-s", "8x8", "--min", "50", "--max", "50", "-o"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("iteration window is empty"));
    assert!(!out.exists());
}

#[test]
fn min_of_zero_opens_the_window_at_the_bottom() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("b.ppm");
    mandelbuddha()
        .args(&[
            "buddhabrot", "-q", "-s", "8x8", "-t", "2", "--points", "100", "--min", "0", "--max",
            "30", "--seed", "1", "-o",
        ])
        .arg(&out)
        .assert()
        .success();
    assert!(fs::read(&out).unwrap().starts_with(b"P6 8 8 255\n"));
}
