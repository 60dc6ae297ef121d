//! Image quality scoring and the tamper decision built on it
//! Author: kartik4091
//! Created: 2025-06-05
//!
//! The score adds sharpness, contrast and brightness and subtracts noise:
//!
//! `score = var(laplacian) - MAD(pixel - median) + std(pixel) + mean(pixel)`
//!
//! It is a coarse single-number proxy. Values are not normalized for image
//! size or bit depth, so scores are only comparable between captures from
//! the same source, and the threshold has to be tuned per scanner/corpus.

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::AnalysisError;
use crate::utils::statistics::{mean, median, median_abs_deviation, std_dev, variance};

/// The four measures and the composite score for one pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMeasurements {
    /// Variance of the Laplacian; near zero means heavy blur
    pub blurriness: f64,
    /// Median absolute deviation of (pixel - median)
    pub noise: f64,
    /// Standard deviation of intensities
    pub contrast: f64,
    /// Mean intensity
    pub brightness: f64,
    pub score: f64,
}

/// Converts to 8-bit grayscale with luma = 0.299 R + 0.587 G + 0.114 B.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let p = rgb.get_pixel(x, y);
        let luma = 0.299 * p.0[0] as f64 + 0.587 * p.0[1] as f64 + 0.114 * p.0[2] as f64;
        image::Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageQualityScorer;

impl ImageQualityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score_image(&self, image: &DynamicImage) -> Result<QualityMeasurements, AnalysisError> {
        self.score(&to_grayscale(image))
    }

    /// Computes all measures. Pure and deterministic for a given buffer.
    #[instrument(skip(self, gray), fields(width = gray.width(), height = gray.height()))]
    pub fn score(&self, gray: &GrayImage) -> Result<QualityMeasurements, AnalysisError> {
        if gray.width() == 0 || gray.height() == 0 {
            return Err(AnalysisError::EmptyImage);
        }

        let pixels: Vec<f64> = gray.as_raw().iter().map(|&p| p as f64).collect();
        let blurriness = variance(&laplacian(gray));

        let center = median(&pixels);
        let centered: Vec<f64> = pixels.iter().map(|p| p - center).collect();
        let noise = median_abs_deviation(&centered);

        let contrast = std_dev(&pixels);
        let brightness = mean(&pixels);
        let score = blurriness - noise + contrast + brightness;

        debug!(blurriness, noise, contrast, brightness, score, "Image quality measured");
        Ok(QualityMeasurements {
            blurriness,
            noise,
            contrast,
            brightness,
            score,
        })
    }
}

/// 3x3 Laplacian `[0,1,0; 1,-4,1; 0,1,0]` at every pixel, borders mirrored
/// without repeating the edge pixel (reflect-101).
fn laplacian(gray: &GrayImage) -> Vec<f64> {
    let (w, h) = (gray.width() as i64, gray.height() as i64);
    let at = |x: i64, y: i64| -> f64 {
        gray.get_pixel(reflect101(x, w) as u32, reflect101(y, h) as u32).0[0] as f64
    };

    let mut out = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            let response =
                at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4.0 * at(x, y);
            out.push(response);
        }
    }
    out
}

fn reflect101(i: i64, n: i64) -> i64 {
    if n == 1 {
        0
    } else if i < 0 {
        -i
    } else if i >= n {
        2 * n - 2 - i
    } else {
        i
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TamperDecision {
    Tampered,
    NotTampered,
}

/// Binary verdict on a quality score against a fixed, caller-supplied threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TamperDecisionPolicy {
    threshold: f64,
}

impl TamperDecisionPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn decide(&self, score: f64) -> TamperDecision {
        if score < self.threshold {
            TamperDecision::Tampered
        } else {
            TamperDecision::NotTampered
        }
    }
}
