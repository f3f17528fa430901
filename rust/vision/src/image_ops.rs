// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image processing operations for room outline detection

use crate::error::{DetectorError, Result};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use planscale_core::RasterImage;

/// Apply Gaussian blur for noise reduction
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    imageproc::filter::gaussian_blur_f32(image, sigma)
}

/// Apply Canny edge detection
pub fn canny_edges(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    imageproc::edges::canny(image, low_threshold, high_threshold)
}

/// Morphological dilation with a square structuring element
pub fn dilate(image: &GrayImage, radius: u8) -> GrayImage {
    imageproc::morphology::dilate(image, Norm::LInf, radius)
}

/// Morphological erosion with a square structuring element
pub fn erode(image: &GrayImage, radius: u8) -> GrayImage {
    imageproc::morphology::erode(image, Norm::LInf, radius)
}

/// Morphological closing (dilate then erode) - bridges small gaps in lines
pub fn morphological_close(image: &GrayImage, radius: u8) -> GrayImage {
    let dilated = dilate(image, radius);
    erode(&dilated, radius)
}

/// Convert RGBA bytes to grayscale image
pub fn rgba_to_grayscale(rgba: &[u8], width: u32, height: u32) -> GrayImage {
    let mut gray = GrayImage::new(width, height);

    let row_len = width as usize;
    for y in 0..height {
        for x in 0..width {
            let i = (y as usize * row_len + x as usize) * 4;
            if i + 2 < rgba.len() {
                let r = rgba[i] as f32;
                let g = rgba[i + 1] as f32;
                let b = rgba[i + 2] as f32;
                // Standard luminance formula (ITU-R BT.601)
                let luma = (0.299 * r + 0.587 * g + 0.114 * b) as u8;
                gray.put_pixel(x, y, Luma([luma]));
            }
        }
    }

    gray
}

/// Grayscale rendition of the loaded image at its displayed size
///
/// Detection runs on what the user sees, so contour coordinates line up
/// with canvas space after offsetting by the fit origin.
pub fn rasterize_displayed(image: &RasterImage, width: u32, height: u32) -> Result<GrayImage> {
    if width == 0 || height == 0 {
        return Err(DetectorError::EmptyBounds {
            width: width as f64,
            height: height as f64,
        });
    }

    let gray = rgba_to_grayscale(image.rgba(), image.width(), image.height());
    if gray.width() == width && gray.height() == height {
        return Ok(gray);
    }
    Ok(imageops::resize(&gray, width, height, FilterType::Triangle))
}

/// Binary edge map used for contour extraction
///
/// Intermediate buffers live only for the duration of this call.
pub fn edge_map(
    gray: &GrayImage,
    blur_sigma: f32,
    canny_low: f32,
    canny_high: f32,
    close_radius: u8,
) -> GrayImage {
    let blurred = gaussian_blur(gray, blur_sigma);
    let edges = canny_edges(&blurred, canny_low, canny_high);
    if close_radius == 0 {
        return edges;
    }
    morphological_close(&edges, close_radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_raster(width: u32, height: u32, value: u8) -> RasterImage {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            rgba.extend_from_slice(&[value, value, value, 255]);
        }
        RasterImage::new(width, height, rgba).unwrap()
    }

    #[test]
    fn test_rgba_to_grayscale() {
        // White pixel (255, 255, 255, 255)
        let rgba = vec![255, 255, 255, 255, 0, 0, 0, 255];
        let gray = rgba_to_grayscale(&rgba, 2, 1);

        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_grayscale_indexes_rows() {
        // 3 x 2: only the last pixel is black
        let mut rgba = vec![255u8; 3 * 2 * 4];
        rgba[20..23].copy_from_slice(&[0, 0, 0]);
        let gray = rgba_to_grayscale(&rgba, 3, 2);
        assert_eq!(gray.get_pixel(2, 1).0[0], 0);
        assert_eq!(gray.get_pixel(2, 0).0[0], 255);
        assert_eq!(gray.get_pixel(0, 1).0[0], 255);
    }

    #[test]
    fn test_rasterize_resizes_to_display() {
        let raster = solid_raster(40, 20, 200);
        let gray = rasterize_displayed(&raster, 20, 10).unwrap();
        assert_eq!(gray.dimensions(), (20, 10));
        assert_eq!(gray.get_pixel(5, 5).0[0], 200);

        let same = rasterize_displayed(&raster, 40, 20).unwrap();
        assert_eq!(same.dimensions(), (40, 20));
    }

    #[test]
    fn test_rasterize_rejects_empty_bounds() {
        let raster = solid_raster(4, 4, 0);
        assert!(matches!(
            rasterize_displayed(&raster, 0, 4),
            Err(DetectorError::EmptyBounds { .. })
        ));
    }

    #[test]
    fn test_close_bridges_gap() {
        // Horizontal line with a 2 px gap
        let mut img = GrayImage::new(30, 9);
        for x in (2..13).chain(15..28) {
            img.put_pixel(x, 4, Luma([255]));
        }
        let closed = morphological_close(&img, 2);
        assert_eq!(closed.get_pixel(13, 4).0[0], 255);
        assert_eq!(closed.get_pixel(14, 4).0[0], 255);
    }

    #[test]
    fn test_edge_map_blank_image() {
        let gray = GrayImage::from_pixel(50, 50, Luma([255]));
        let edges = edge_map(&gray, 1.1, 50.0, 150.0, 2);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }
}
