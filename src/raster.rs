use image::{ImageFormat, Rgba, RgbaImage};
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Poppler's PDF-to-image converter
const PDFTOPPM: &str = "pdftoppm";

const TRANSPARENT: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Renders the first page of `pdf` to the PNG file `png` at `dpi` dots per
/// inch
pub(crate) fn rasterize(pdf: &Path, png: &Path, dpi: u32) -> Result<(), RasterError> {
    // pdftoppm appends the extension itself
    let root = png.with_extension("");
    log::debug!(
        "Running {PDFTOPPM} -png -r {dpi} -singlefile {} {}",
        pdf.display(),
        root.display()
    );
    let output = Command::new(PDFTOPPM)
        .arg("-png")
        .arg("-r")
        .arg(dpi.to_string())
        .arg("-singlefile")
        .arg(pdf)
        .arg(&root)
        .output()
        .map_err(|source| RasterError::Spawn {
            program: PDFTOPPM,
            source,
        })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(RasterError::Failed {
            program: PDFTOPPM,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

/// Makes every pixel whose red, green, and blue components all exceed
/// `threshold` fully transparent.  Returns the number of pixels changed.
pub(crate) fn knock_out_background(img: &mut RgbaImage, threshold: u8) -> usize {
    let mut changed = 0;
    for pixel in img.pixels_mut() {
        let Rgba([r, g, b, _]) = *pixel;
        if r > threshold && g > threshold && b > threshold {
            *pixel = TRANSPARENT;
            changed += 1;
        }
    }
    changed
}

/// Rewrites the PNG at `path` as RGBA with its near-white background made
/// transparent
pub(crate) fn make_transparent(path: &Path, threshold: u8) -> Result<(), RasterError> {
    let mut img = image::open(path)?.to_rgba8();
    let changed = knock_out_background(&mut img, threshold);
    log::debug!(
        "Made {changed} of {} pixels transparent in {}",
        u64::from(img.width()) * u64::from(img.height()),
        path.display()
    );
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

#[derive(Debug, Error)]
pub(crate) enum RasterError {
    #[error("failed to run {program}; is poppler installed?")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        program: &'static str,
        status: ExitStatus,
        stderr: String,
    },
    #[error("failed to process image")]
    Image(#[from] image::ImageError),
}
