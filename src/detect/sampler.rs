//! Pixel sampling for dominant-colour detection
//!
//! Sampling cost is bounded twice: the image is first shrunk to a small
//! canvas, then at most `max_samples` pixels are drawn from it.

use image::{imageops::FilterType, DynamicImage, RgbaImage};
use rand::Rng;

/// Canvas sizes (long edge), tiered by source resolution
const TIER_SMALL: u32 = 42; // sources up to 600px
const TIER_MEDIUM: u32 = 56; // sources up to 1600px
const TIER_LARGE: u32 = 72; // anything bigger

/// Pixels with alpha below this are treated as transparent
const MIN_ALPHA: u8 = 128;
/// Pixels with every channel above this are treated as background white
const NEAR_WHITE: u8 = 245;

/// Long edge of the sampling canvas for a `width` x `height` source
pub fn sampling_edge(width: u32, height: u32) -> u32 {
    let long_edge = width.max(height);
    let target = if long_edge <= 600 {
        TIER_SMALL
    } else if long_edge <= 1600 {
        TIER_MEDIUM
    } else {
        TIER_LARGE
    };

    // Never upscale
    target.min(long_edge)
}

/// Shrink `img` to its sampling canvas, keeping the aspect ratio
pub fn downscale(img: &DynamicImage) -> RgbaImage {
    let edge = sampling_edge(img.width(), img.height());
    if img.width().max(img.height()) <= edge {
        return img.to_rgba8();
    }

    img.resize(edge, edge, FilterType::Triangle).to_rgba8()
}

fn is_usable(pixel: &image::Rgba<u8>) -> bool {
    let [r, g, b, a] = pixel.0;
    a >= MIN_ALPHA && !(r > NEAR_WHITE && g > NEAR_WHITE && b > NEAR_WHITE)
}

/// Reservoir-sample up to `max_samples` opaque, non-near-white pixels
///
/// Every usable pixel has the same chance of being picked regardless of
/// its position.
pub fn sample_pixels<R: Rng + ?Sized>(img: &RgbaImage, max_samples: usize, rng: &mut R) -> Vec<[u8; 3]> {
    let mut reservoir: Vec<[u8; 3]> = Vec::with_capacity(max_samples.min(img.len() / 4));
    if max_samples == 0 {
        return reservoir;
    }

    let mut seen = 0usize;
    for pixel in img.pixels().filter(|p| is_usable(p)) {
        let rgb = [pixel.0[0], pixel.0[1], pixel.0[2]];
        seen += 1;

        if reservoir.len() < max_samples {
            reservoir.push(rgb);
        } else {
            let slot = rng.gen_range(0..seen);
            if slot < max_samples {
                reservoir[slot] = rgb;
            }
        }
    }

    reservoir
}
