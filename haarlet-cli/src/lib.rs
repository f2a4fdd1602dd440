//! Image ingestion and export around the `haarlet` pipeline.

use clap::ValueEnum;
use haarlet::metrics::normalize_for_display;
use haarlet::{Coefficients, IntensityBuffer, ProcessingSize};
use image::imageops::FilterType;
use image::{GrayImage, Rgb, RgbImage, RgbaImage};
use log::debug;
use std::error::Error;
use std::path::Path;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMap {
    #[default]
    Gray,
    Viridis,
    Inferno,
    Magma,
}

/// ITU-R BT.601 luma, rounded and clamped to 8 bits.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y.round().clamp(0.0, 255.0) as u8
}

/// Resize `img` to the resolved processing size and convert it to intensities.
pub fn intensity_from_rgba(
    img: &RgbaImage,
    size: ProcessingSize,
) -> Result<IntensityBuffer, Box<dyn Error>> {
    let (sw, sh) = (img.width() as usize, img.height() as usize);
    let target = size.resolve(sw, sh)?;
    let (w, h) = haarlet::sizing::target_dimensions(sw, sh, target);
    debug!("resizing {sw}x{sh} -> {w}x{h}");
    let resized = if (w, h) == (sw, sh) {
        img.clone()
    } else {
        image::imageops::resize(img, w as u32, h as u32, FilterType::Triangle)
    };
    let luma8: Vec<u8> = resized
        .pixels()
        .map(|p| luma(p.0[0], p.0[1], p.0[2]))
        .collect();
    Ok(IntensityBuffer::from_luma8(w, h, &luma8)?)
}

/// Decode an image file into an intensity buffer at the requested processing size.
pub fn load_intensity(path: &Path, size: ProcessingSize) -> Result<IntensityBuffer, Box<dyn Error>> {
    let img = image::open(path)?.to_rgba8();
    intensity_from_rgba(&img, size)
}

pub fn save_luma_png(
    values: &[u8],
    width: usize,
    height: usize,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let img = GrayImage::from_raw(width as u32, height as u32, values.to_vec())
        .ok_or("pixel count does not match dimensions")?;
    img.save(path)?;
    Ok(())
}

/// Map display values through a colour map.
pub fn colorize(values: &[u8], width: usize, height: usize, cmap: ColorMap) -> RgbImage {
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let v = values[y as usize * width + x as usize];
        let t = f64::from(v) / 255.0;
        let c = match cmap {
            ColorMap::Gray => return Rgb([v, v, v]),
            ColorMap::Viridis => colorous::VIRIDIS.eval_continuous(t),
            ColorMap::Inferno => colorous::INFERNO.eval_continuous(t),
            ColorMap::Magma => colorous::MAGMA.eval_continuous(t),
        };
        Rgb([c.r, c.g, c.b])
    })
}

/// Write the min-max stretched coefficient grid.
pub fn save_coefficients(
    coefficients: &Coefficients,
    cmap: ColorMap,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let values = normalize_for_display(coefficients.data());
    let (w, h) = (coefficients.width(), coefficients.height());
    match cmap {
        ColorMap::Gray => save_luma_png(&values, w, h, path),
        _ => {
            colorize(&values, w, h, cmap).save(path)?;
            Ok(())
        }
    }
}

pub fn save_intensity(buffer: &IntensityBuffer, path: &Path) -> Result<(), Box<dyn Error>> {
    save_luma_png(&buffer.to_luma8(), buffer.width(), buffer.height(), path)
}
