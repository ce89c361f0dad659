// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writes rendered RGB buffers to disk.  PPM is written by hand so the
//! header is exactly `P6 <width> <height> 255\n`; every other format
//! goes through the image crate.

use image::ColorType;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::RenderError;

fn check_len(width: usize, height: usize, rgb: &[u8]) -> io::Result<()> {
    if rgb.len() != width * height * 3 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} bytes of pixels for a {}x{} image",
                rgb.len(),
                width,
                height
            ),
        ));
    }
    Ok(())
}

/// Writes a binary PPM: the ASCII header followed by the raw RGB
/// bytes, row major from the top left.
pub fn write_ppm<W: Write>(
    mut writer: W,
    width: usize,
    height: usize,
    rgb: &[u8],
) -> Result<(), RenderError> {
    check_len(width, height, rgb)?;
    writeln!(writer, "P6 {} {} 255", width, height)?;
    writer.write_all(rgb)?;
    writer.flush()?;
    Ok(())
}

fn is_pnm(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        None => true,
        Some(ext) => ext.eq_ignore_ascii_case("ppm") || ext.eq_ignore_ascii_case("pnm"),
    }
}

/// Saves an RGB buffer to `path`, choosing the format from its
/// extension.  No extension, `.ppm` and `.pnm` get a binary PPM.
pub fn save<P: AsRef<Path>>(
    path: P,
    width: usize,
    height: usize,
    rgb: &[u8],
) -> Result<(), RenderError> {
    let path = path.as_ref();
    check_len(width, height, rgb)?;
    if is_pnm(path) {
        let output = File::create(path)?;
        write_ppm(BufWriter::new(output), width, height, rgb)
    } else {
        image::save_buffer(path, rgb, width as u32, height as u32, ColorType::RGB(8))?;
        Ok(())
    }
}
