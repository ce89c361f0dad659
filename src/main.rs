// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use failure::Error;
use mandelbuddha::config::{parse_complex, parse_pair};
use mandelbuddha::{render, Config, Mode, Progress, Silent, TextBar};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_positive_float(s: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(f) if f.is_finite() && f > 0.0 => Ok(()),
        _ => Err("Graph width must be a positive number".to_string()),
    }
}

const MANDELBROT: &str = "mandelbrot";
const BUDDHABROT: &str = "buddhabrot";
const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const GRAPH_WIDTH: &str = "graph-width";
const THREADS: &str = "threads";
const QUIET: &str = "quiet";
const ITERATIONS: &str = "iterations";
const POINTS: &str = "points";
const MIN: &str = "min";
const MAX: &str = "max";
const SEED: &str = "seed";

// Options every subcommand takes.
fn common_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(OUTPUT)
            .required(true)
            .long(OUTPUT)
            .short("o")
            .takes_value(true)
            .help("Output file; .ppm, .pnm or no extension for PPM, anything else by extension"),
        Arg::with_name(SIZE)
            .long(SIZE)
            .short("s")
            .takes_value(true)
            .default_value("800x600")
            .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
            .help("Size of output image"),
        Arg::with_name(CENTER)
            .long(CENTER)
            .short("c")
            .takes_value(true)
            .allow_hyphen_values(true)
            .default_value("-0.5,0")
            .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
            .help("Complex number at the center of the image"),
        Arg::with_name(GRAPH_WIDTH)
            .long(GRAPH_WIDTH)
            .short("w")
            .takes_value(true)
            .default_value("4.0")
            .validator(|s| validate_positive_float(&s))
            .help("Span of the real axis across the image"),
        Arg::with_name(THREADS)
            .long(THREADS)
            .short("t")
            .takes_value(true)
            .validator(|s| {
                validate_range(
                    &s,
                    1,
                    1024,
                    "Could not parse thread count",
                    "Thread count must be between 1 and 1024",
                )
            })
            .help("Number of threads to use in solver [default: number of CPUs]"),
        Arg::with_name(QUIET)
            .long(QUIET)
            .short("q")
            .help("Don't draw a progress bar"),
    ]
}

fn iteration_arg(
    name: &'static str,
    low: u32,
    default: &'static str,
    help: &'static str,
) -> Arg<'static, 'static> {
    Arg::with_name(name)
        .long(name)
        .takes_value(true)
        .default_value(default)
        .validator(move |s| {
            validate_range(
                &s,
                low,
                10_000_000,
                "Could not parse iteration count",
                &format!("Iteration count must be between {} and 10000000", low),
            )
        })
        .help(help)
}

fn args() -> ArgMatches<'static> {
    App::new("mandelbuddha")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot and Buddhabrot renderer")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name(MANDELBROT)
                .about("Escape-time image of the Mandelbrot set")
                .args(&common_args())
                .arg(
                    iteration_arg(ITERATIONS, 1, "1000", "Iterations before a point counts as inside")
                        .short("i"),
                ),
        )
        .subcommand(
            SubCommand::with_name(BUDDHABROT)
                .about("Orbit density of the points escaping the Mandelbrot set")
                .args(&common_args())
                .arg(
                    Arg::with_name(POINTS)
                        .long(POINTS)
                        .short("p")
                        .takes_value(true)
                        .default_value("1000000")
                        .validator(|s| {
                            usize::from_str(&s)
                                .map(|_| ())
                                .map_err(|_| "Could not parse random point count".to_string())
                        })
                        .help("Random seeds sampled on top of the pixel grid"),
                )
                .arg(iteration_arg(MIN, 0, "20", "Plot orbits escaping after more than this"))
                .arg(iteration_arg(MAX, 1, "1000", "Plot orbits escaping before this"))
                .arg(
                    Arg::with_name(SEED)
                        .long(SEED)
                        .takes_value(true)
                        .validator(|s| {
                            u64::from_str(&s)
                                .map(|_| ())
                                .map_err(|_| "Could not parse seed".to_string())
                        })
                        .help("Seed for the random samples; same seed, same image"),
                ),
        )
        .get_matches()
}

// Values have been through the clap validators, so a failure here is
// a missing value.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| failure::format_err!("Could not parse --{}", name))
}

fn config(mode_name: &str, matches: &ArgMatches) -> Result<Config, Error> {
    let size = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| failure::format_err!("Error parsing image dimensions"))?;
    let center = matches
        .value_of(CENTER)
        .and_then(parse_complex)
        .ok_or_else(|| failure::format_err!("Error parsing center point"))?;
    let threads = match matches.value_of(THREADS) {
        Some(_) => value(matches, THREADS)?,
        None => num_cpus::get(),
    };
    let mode = if mode_name == MANDELBROT {
        Mode::Mandelbrot {
            iterations: value(matches, ITERATIONS)?,
        }
    } else {
        Mode::Buddhabrot {
            points: value(matches, POINTS)?,
            min: value(matches, MIN)?,
            max: value(matches, MAX)?,
            seed: match matches.value_of(SEED) {
                Some(_) => Some(value(matches, SEED)?),
                None => None,
            },
        }
    };

    Ok(Config {
        output: PathBuf::from(matches.value_of(OUTPUT).unwrap_or_default()),
        width: size.0,
        height: size.1,
        center,
        graph_width: value(matches, GRAPH_WIDTH)?,
        threads,
        mode,
    })
}

fn run() -> Result<(), Error> {
    let matches = args();
    let (mode_name, sub) = match matches.subcommand() {
        (name, Some(sub)) => (name, sub),
        _ => failure::bail!("No render mode given"),
    };
    let config = config(mode_name, sub)?;
    let progress: Arc<dyn Progress> = if sub.is_present(QUIET) {
        Arc::new(Silent)
    } else {
        Arc::new(TextBar::new())
    };
    render(&config, progress)?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprint!("error");
        for cause in e.iter_chain() {
            eprint!(": {}", cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}
