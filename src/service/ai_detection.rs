//! AI-generated-image detection
//!
//! Two interchangeable policies, selected once at construction: a local
//! statistical heuristic, or a pre-trained binary classifier behind the
//! model backend. Each policy keeps its own decision threshold (0.7 vs 0.6);
//! the asymmetry is intentional and load-bearing for downstream consumers.

use image::{DynamicImage, RgbImage};

use crate::model::AiDetection;
use crate::service::inference::{ClassifierClient, InferenceError};

/// Decision threshold for the heuristic policy.
pub const HEURISTIC_AI_THRESHOLD: f32 = 0.7;
/// Decision threshold for the classifier policy.
pub const CLASSIFIER_AI_THRESHOLD: f32 = 0.6;

/// Both edges at or above this count as suspiciously high resolution.
const HIGH_RES_EDGE: u32 = 1024;
/// Pixel standard deviation below this counts as suspiciously smooth.
const SMOOTH_STDDEV: f32 = 35.0;

const HEURISTIC_SCORE_BOTH: f32 = 0.9;
const HEURISTIC_SCORE_ONE: f32 = 0.6;
const HEURISTIC_SCORE_NONE: f32 = 0.1;

/// Statistical heuristic over resolution and smoothness.
#[derive(Debug, Default)]
pub struct HeuristicDetector;

impl HeuristicDetector {
    /// Score the image without any model call.
    ///
    /// The score is always one of {0.1, 0.6, 0.9}: both signals, exactly one
    /// signal, or neither.
    pub fn detect(&self, image: &DynamicImage) -> AiDetection {
        // Fixed color mode before measuring
        let rgb = image.to_rgb8();

        let is_high_res = rgb.width() >= HIGH_RES_EDGE && rgb.height() >= HIGH_RES_EDGE;
        let std_dev = pixel_stddev(&rgb);
        let is_smooth = std_dev < SMOOTH_STDDEV;

        let ai_score = if is_high_res && is_smooth {
            HEURISTIC_SCORE_BOTH
        } else if is_high_res || is_smooth {
            HEURISTIC_SCORE_ONE
        } else {
            HEURISTIC_SCORE_NONE
        };

        let is_ai_generated = ai_score > HEURISTIC_AI_THRESHOLD;

        tracing::debug!(
            width = rgb.width(),
            height = rgb.height(),
            std_dev = std_dev,
            ai_score = ai_score,
            "Heuristic AI detection"
        );

        AiDetection {
            is_ai_generated,
            ai_score,
            explanation: if is_ai_generated {
                "Высокое разрешение и гладкость изображения указывают на возможную генерацию ИИ"
                    .to_string()
            } else {
                "Изображение выглядит как обычная фотография".to_string()
            },
        }
    }
}

/// Standard deviation over all RGB channel values.
fn pixel_stddev(image: &RgbImage) -> f32 {
    let raw = image.as_raw();
    if raw.is_empty() {
        return 0.0;
    }

    let n = raw.len() as f64;
    let sum: f64 = raw.iter().map(|&v| f64::from(v)).sum();
    let mean = sum / n;
    let variance: f64 = raw
        .iter()
        .map(|&v| {
            let d = f64::from(v) - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    variance.sqrt() as f32
}

/// Decision from a classifier score; the threshold is strict, so a score of
/// exactly 0.6 is not flagged.
fn classifier_detection(ai_score: f32) -> AiDetection {
    let is_ai_generated = ai_score > CLASSIFIER_AI_THRESHOLD;
    AiDetection {
        is_ai_generated,
        ai_score,
        explanation: format!(
            "Классификатор оценил вероятность ИИ-генерации в {:.2}",
            ai_score
        ),
    }
}

/// Interchangeable AI-image detection strategy.
pub enum AiImageDetector {
    Heuristic(HeuristicDetector),
    Classifier(ClassifierClient),
}

impl AiImageDetector {
    /// Run the active policy on the lot image.
    pub async fn detect(&self, image: &DynamicImage) -> Result<AiDetection, InferenceError> {
        match self {
            AiImageDetector::Heuristic(detector) => Ok(detector.detect(image)),
            AiImageDetector::Classifier(client) => {
                let response = client.classify(image).await?;
                Ok(classifier_detection(response.synthetic_score()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([128, 128, 128])))
    }

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        }))
    }

    #[test]
    fn high_res_and_smooth_scores_high() {
        let result = HeuristicDetector.detect(&solid(1024, 1024));
        assert_eq!(result.ai_score, 0.9);
        assert!(result.is_ai_generated);
    }

    #[test]
    fn only_smooth_scores_middle() {
        let result = HeuristicDetector.detect(&solid(64, 64));
        assert_eq!(result.ai_score, 0.6);
        assert!(!result.is_ai_generated);
    }

    #[test]
    fn only_high_res_scores_middle() {
        // Checkerboard std-dev is 127.5, far above the smoothness cutoff.
        let result = HeuristicDetector.detect(&checkerboard(1024, 1024));
        assert_eq!(result.ai_score, 0.6);
        assert!(!result.is_ai_generated);
    }

    #[test]
    fn neither_signal_scores_low() {
        let result = HeuristicDetector.detect(&checkerboard(64, 64));
        assert_eq!(result.ai_score, 0.1);
        assert!(!result.is_ai_generated);
    }

    #[test]
    fn score_is_always_one_of_the_three_bands() {
        for image in [
            solid(10, 10),
            solid(1024, 1024),
            solid(2048, 64),
            checkerboard(64, 64),
            checkerboard(1100, 1024),
        ] {
            let result = HeuristicDetector.detect(&image);
            assert!(
                [0.1, 0.6, 0.9].contains(&result.ai_score),
                "unexpected score {}",
                result.ai_score
            );
            assert_eq!(
                result.is_ai_generated,
                result.ai_score > HEURISTIC_AI_THRESHOLD
            );
        }
    }

    #[test]
    fn non_square_high_res_requires_both_edges() {
        // 2048x64: only one edge reaches 1024, so this is not high-res,
        // but it is smooth.
        let result = HeuristicDetector.detect(&solid(2048, 64));
        assert_eq!(result.ai_score, 0.6);
    }

    #[test]
    fn stddev_of_solid_image_is_zero() {
        let rgb = RgbImage::from_pixel(8, 8, Rgb([10, 10, 10]));
        assert_eq!(pixel_stddev(&rgb), 0.0);
    }

    #[test]
    fn classifier_threshold_is_a_strict_bound() {
        // Exactly at the threshold is not flagged.
        let at = classifier_detection(0.6);
        assert_eq!(at.ai_score, 0.6);
        assert!(!at.is_ai_generated);

        let above = classifier_detection(0.61);
        assert!(above.is_ai_generated);
        assert!(above.explanation.contains("0.61"));
    }

    #[test]
    fn classifier_zero_score_is_not_flagged() {
        // A response with no synthetic label maps to 0.0 upstream.
        let detection = classifier_detection(0.0);
        assert!(!detection.is_ai_generated);
        assert_eq!(detection.ai_score, 0.0);
    }
}
