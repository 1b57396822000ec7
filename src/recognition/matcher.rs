//! Template matching implementation
//!
//! Zero-mean normalized cross-correlation of every template against the
//! frame, with oversized templates shrunk to fit before scanning.

use super::preprocess::Frame;
use super::template::{Template, TemplateStore};
use image::{GrayImage, Luma};
use imageproc::integral_image::{integral_image, integral_squared_image};
use imageproc::template_matching::{MatchTemplateMethod, match_template};
use std::borrow::Cow;

/// Score reported when there is nothing to compare against.
pub const NO_SCORE: f32 = -1.0;

/// Best template for a frame before any threshold is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub name: Option<String>,
    pub score: f32,
}

/// Scores frames against every template in a store.
#[derive(Debug, Clone, Default)]
pub struct SymbolMatcher;

impl SymbolMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Scan all templates and keep the highest scoring one.
    ///
    /// Every template is scored; ties keep the template that comes first in
    /// store order.
    pub fn best_match(&self, frame: &Frame, store: &TemplateStore) -> BestMatch {
        let scores = store.templates().iter().map(|template| {
            let score = self.score_template(frame.pixels(), template);
            log::debug!("  template '{}' score={:.3}", template.name, score);
            (template.name.as_str(), score)
        });
        select_best(scores)
    }

    /// Maximum of the correlation surface for one template.
    pub fn score_template(&self, frame: &GrayImage, template: &Template) -> f32 {
        let fitted = fit_template(&template.image, frame.width(), frame.height());
        if fitted.width() != template.width() || fitted.height() != template.height() {
            log::debug!(
                "📐 Template '{}' resized {}x{} -> {}x{} to fit {}x{} frame",
                template.name,
                template.width(),
                template.height(),
                fitted.width(),
                fitted.height(),
                frame.width(),
                frame.height()
            );
        }
        max_correlation(frame, &fitted)
    }
}

/// Running maximum over `(name, score)` pairs with a strict `>` so the first
/// of equal scores wins.
pub fn select_best<'a>(scores: impl IntoIterator<Item = (&'a str, f32)>) -> BestMatch {
    let mut best = BestMatch {
        name: None,
        score: NO_SCORE,
    };
    for (name, score) in scores {
        if best.name.is_none() || score > best.score {
            best.name = Some(name.to_string());
            best.score = score;
        }
    }
    best
}

/// Return the template unchanged if it fits inside the frame, otherwise a copy
/// shrunk by a uniform factor so both dimensions fit.
pub fn fit_template(template: &GrayImage, frame_width: u32, frame_height: u32) -> Cow<'_, GrayImage> {
    let (width, height) = template.dimensions();
    if width <= frame_width && height <= frame_height {
        return Cow::Borrowed(template);
    }

    let scale = f64::min(
        frame_height as f64 / height as f64,
        frame_width as f64 / width as f64,
    );
    let new_width = ((width as f64 * scale) as u32).clamp(1, frame_width.max(1));
    let new_height = ((height as f64 * scale) as u32).clamp(1, frame_height.max(1));

    Cow::Owned(resize_area(template, new_width, new_height))
}

/// Shrink with area averaging: each output pixel is the coverage-weighted
/// mean of the source pixels beneath it.
pub fn resize_area(src: &GrayImage, new_width: u32, new_height: u32) -> GrayImage {
    let (src_width, src_height) = src.dimensions();
    if (src_width, src_height) == (new_width, new_height) {
        return src.clone();
    }

    let x_weights = area_weights(src_width, new_width);
    let y_weights = area_weights(src_height, new_height);

    // Horizontal pass into a float buffer of new_width x src_height
    let mut rows = vec![0f64; new_width as usize * src_height as usize];
    for y in 0..src_height {
        for (x, taps) in x_weights.iter().enumerate() {
            let acc: f64 = taps
                .iter()
                .map(|&(sx, w)| src.get_pixel(sx, y)[0] as f64 * w)
                .sum();
            rows[y as usize * new_width as usize + x] = acc;
        }
    }

    GrayImage::from_fn(new_width, new_height, |x, y| {
        let acc: f64 = y_weights[y as usize]
            .iter()
            .map(|&(sy, w)| rows[sy as usize * new_width as usize + x as usize] * w)
            .sum();
        Luma([acc.round().clamp(0.0, 255.0) as u8])
    })
}

/// For each output index, the source indices it covers with normalized weights.
fn area_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(u32, f64)>> {
    let ratio = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * ratio;
            let end = ((d + 1) as f64 * ratio).min(src_len as f64);
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_len);
            let mut taps: Vec<(u32, f64)> = (first..last)
                .map(|s| {
                    let lo = start.max(s as f64);
                    let hi = end.min((s + 1) as f64);
                    (s, (hi - lo).max(0.0))
                })
                .filter(|&(_, w)| w > 0.0)
                .collect();
            let total: f64 = taps.iter().map(|&(_, w)| w).sum();
            if total > 0.0 {
                for tap in &mut taps {
                    tap.1 /= total;
                }
            }
            taps
        })
        .collect()
}

/// Zero-mean normalized cross-correlation at every offset where the template
/// fits inside the image. Offsets where the window or template is flat score 0.
///
/// The template must not exceed the image in either dimension.
pub fn correlation_surface(image: &GrayImage, template: &GrayImage) -> Vec<f32> {
    let (iw, ih) = image.dimensions();
    let (tw, th) = template.dimensions();
    debug_assert!(tw <= iw && th <= ih, "template larger than image");

    let n = tw as i128 * th as i128;
    let (t_sum, t_sq) = template.pixels().fold((0i128, 0i128), |(s, q), p| {
        let v = p[0] as i128;
        (s + v, q + v * v)
    });
    let t_var_n = n * t_sq - t_sum * t_sum;

    // Raw sum of image * template products at each offset
    let cross = match_template(image, template, MatchTemplateMethod::CrossCorrelation);
    let sums = integral_image::<_, u64>(image);
    let squares = integral_squared_image::<_, u64>(image);

    let window = |ii: &image::ImageBuffer<Luma<u64>, Vec<u64>>, x: u32, y: u32| -> i128 {
        let a = ii.get_pixel(x, y)[0] as i128;
        let b = ii.get_pixel(x + tw, y)[0] as i128;
        let c = ii.get_pixel(x, y + th)[0] as i128;
        let d = ii.get_pixel(x + tw, y + th)[0] as i128;
        d - b - c + a
    };

    let mut scores = Vec::with_capacity(cross.width() as usize * cross.height() as usize);
    for (x, y, products) in cross.enumerate_pixels() {
        let w_sum = window(&sums, x, y);
        let w_var_n = n * window(&squares, x, y) - w_sum * w_sum;

        let score = if t_var_n <= 0 || w_var_n <= 0 {
            0.0
        } else {
            let numerator = n as f64 * products[0] as f64 - (t_sum * w_sum) as f64;
            let denominator = (w_var_n as f64).sqrt() * (t_var_n as f64).sqrt();
            (numerator / denominator).clamp(-1.0, 1.0)
        };
        scores.push(score as f32);
    }
    scores
}

/// Peak of the correlation surface, or [`NO_SCORE`] if the template cannot be placed.
pub fn max_correlation(image: &GrayImage, template: &GrayImage) -> f32 {
    if template.width() > image.width()
        || template.height() > image.height()
        || template.width() == 0
        || template.height() == 0
    {
        return NO_SCORE;
    }
    correlation_surface(image, template)
        .into_iter()
        .fold(NO_SCORE, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]))
    }

    fn cross_glyph(size: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let mid = size / 2;
            if x.abs_diff(mid) <= 1 || y.abs_diff(mid) <= 1 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    #[test]
    fn test_fitting_template_is_not_scaled() {
        let template = gradient(10, 8);
        let fitted = fit_template(&template, 20, 20);
        assert!(matches!(fitted, Cow::Borrowed(_)));
        assert_eq!(fitted.dimensions(), (10, 8));

        let exact = fit_template(&template, 10, 8);
        assert!(matches!(exact, Cow::Borrowed(_)));
    }

    #[test]
    fn test_oversized_template_shrinks_uniformly() {
        // scale = min(40/30, 40/60) = 2/3
        let template = gradient(60, 30);
        let fitted = fit_template(&template, 40, 40);
        assert_eq!(fitted.dimensions(), (40, 20));

        // Only one dimension too large still triggers scaling
        let tall = gradient(10, 50);
        let fitted = fit_template(&tall, 25, 25);
        assert_eq!(fitted.dimensions(), (5, 25));
    }

    #[test]
    fn test_extreme_aspect_ratio_keeps_one_pixel() {
        let sliver = gradient(1000, 4);
        let fitted = fit_template(&sliver, 10, 10);
        assert_eq!(fitted.width(), 10);
        assert_eq!(fitted.height(), 1);
    }

    #[test]
    fn test_area_resize_averages_blocks() {
        let src = GrayImage::from_fn(4, 2, |x, _| Luma([if x < 2 { 0 } else { 200 }]));
        let out = resize_area(&src, 2, 1);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(1, 0)[0], 200);

        let uneven = GrayImage::from_fn(3, 1, |x, _| Luma([[0, 90, 180][x as usize]]));
        let out = resize_area(&uneven, 2, 1);
        // Output 0 covers [0, 1.5): (0 * 1 + 90 * 0.5) / 1.5 = 30
        assert_eq!(out.get_pixel(0, 0)[0], 30);
        // Output 1 covers [1.5, 3): (90 * 0.5 + 180 * 1) / 1.5 = 150
        assert_eq!(out.get_pixel(1, 0)[0], 150);
    }

    #[test]
    fn test_identical_image_scores_one() {
        let glyph = cross_glyph(21);
        let score = max_correlation(&glyph, &glyph);
        assert!((score - 1.0).abs() < 1e-4, "score {score}");
    }

    #[test]
    fn test_correlation_invariant_to_brightness_and_contrast() {
        let template = gradient(12, 9);
        let brighter = GrayImage::from_fn(12, 9, |x, y| {
            Luma([(template.get_pixel(x, y)[0] as u32 / 2 + 60) as u8])
        });
        let score = max_correlation(&brighter, &template);
        assert!(score > 0.99, "score {score}");
    }

    #[test]
    fn test_inverted_image_scores_minus_one() {
        let glyph = cross_glyph(15);
        let inverted = GrayImage::from_fn(15, 15, |x, y| Luma([255 - glyph.get_pixel(x, y)[0]]));
        let score = max_correlation(&inverted, &glyph);
        assert!((score + 1.0).abs() < 1e-4, "score {score}");
    }

    #[test]
    fn test_template_found_inside_larger_frame() {
        let glyph = cross_glyph(9);
        let mut frame = GrayImage::from_pixel(30, 20, Luma([0u8]));
        image::imageops::replace(&mut frame, &glyph, 14, 6);
        let surface = correlation_surface(&frame, &glyph);
        assert_eq!(surface.len(), (30 - 9 + 1) * (20 - 9 + 1));
        let best = max_correlation(&frame, &glyph);
        assert!((best - 1.0).abs() < 1e-4);
        let at = surface[6 * (30 - 9 + 1) + 14];
        assert!((at - 1.0).abs() < 1e-4, "peak should sit at the glyph offset");
    }

    #[test]
    fn test_flat_inputs_score_zero() {
        let flat = GrayImage::from_pixel(10, 10, Luma([128u8]));
        let glyph = cross_glyph(10);
        assert_eq!(max_correlation(&flat, &glyph), 0.0);
        assert_eq!(max_correlation(&glyph, &flat), 0.0);
    }

    #[test]
    fn test_select_best_prefers_higher_score_in_any_order() {
        let forward = select_best([("low", 0.80), ("high", 0.90)]);
        let backward = select_best([("high", 0.90), ("low", 0.80)]);
        assert_eq!(forward.name.as_deref(), Some("high"));
        assert_eq!(backward.name.as_deref(), Some("high"));
        assert_eq!(forward.score, 0.90);
    }

    #[test]
    fn test_select_best_tie_keeps_first() {
        let best = select_best([("A", 0.5), ("B", 0.5), ("C", 0.4)]);
        assert_eq!(best.name.as_deref(), Some("A"));
    }

    #[test]
    fn test_select_best_empty() {
        let best = select_best(std::iter::empty());
        assert_eq!(best.name, None);
        assert_eq!(best.score, NO_SCORE);
    }

    #[test]
    fn test_oversized_template_still_matches_scaled_frame() {
        let big = cross_glyph(40);
        let frame = resize_area(&big, 20, 20);
        let template = Template::new("plus", big);
        let score = SymbolMatcher::new().score_template(&frame, &template);
        assert!((score - 1.0).abs() < 1e-4, "score {score}");
    }
}
