//! Color space conversion and category classification
//!
//! This module handles conversion between the color spaces the detector needs:
//! - sRGB (8-bit display values, what decoded images give us)
//! - Linear RGB → XYZ (device-independent color space, D65 white point)
//! - CIE Lab (perceptual distance, used for clustering)
//! - HSL (cheap saturation/lightness thresholds for achromatic pixels)
//!
//! and maps any color onto one of eleven named categories.

use cgmath::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard sRGB (linear) to XYZ conversion matrix (D65 white point)
/// Source: IEC 61966-2-1:1999 (sRGB standard)
const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124, 0.3576, 0.1805],
    [0.2126, 0.7152, 0.0722],
    [0.0193, 0.1192, 0.9505],
];

/// D65 reference white in XYZ
const D65_WHITE: [f32; 3] = [0.95047, 1.0, 1.08883];

/// One of the eleven canonical color names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorCategory {
    Black,
    Gray,
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Brown,
}

impl ColorCategory {
    pub const ALL: [ColorCategory; 11] = [
        ColorCategory::Black,
        ColorCategory::Gray,
        ColorCategory::White,
        ColorCategory::Red,
        ColorCategory::Orange,
        ColorCategory::Yellow,
        ColorCategory::Green,
        ColorCategory::Blue,
        ColorCategory::Purple,
        ColorCategory::Pink,
        ColorCategory::Brown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorCategory::Black => "black",
            ColorCategory::Gray => "gray",
            ColorCategory::White => "white",
            ColorCategory::Red => "red",
            ColorCategory::Orange => "orange",
            ColorCategory::Yellow => "yellow",
            ColorCategory::Green => "green",
            ColorCategory::Blue => "blue",
            ColorCategory::Purple => "purple",
            ColorCategory::Pink => "pink",
            ColorCategory::Brown => "brown",
        }
    }

    /// Representative sRGB value used for nearest-anchor matching
    pub fn anchor(self) -> [u8; 3] {
        match self {
            ColorCategory::Black => [0, 0, 0],
            ColorCategory::Gray => [128, 128, 128],
            ColorCategory::White => [255, 255, 255],
            ColorCategory::Red => [220, 38, 38],
            ColorCategory::Orange => [249, 115, 22],
            ColorCategory::Yellow => [234, 209, 8],
            ColorCategory::Green => [34, 160, 70],
            ColorCategory::Blue => [37, 99, 235],
            ColorCategory::Purple => [130, 60, 200],
            ColorCategory::Pink => [236, 72, 153],
            ColorCategory::Brown => [140, 85, 40],
        }
    }
}

impl fmt::Display for ColorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColor(pub String);

impl fmt::Display for UnknownColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown color: {}", self.0)
    }
}

impl std::error::Error for UnknownColor {}

impl FromStr for ColorCategory {
    type Err = UnknownColor;

    /// Accepts canonical names and every alias in the alias table
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve_alias(s).ok_or_else(|| UnknownColor(s.to_string()))
    }
}

/// Color words that map onto a canonical category
const ALIASES: &[(&str, ColorCategory)] = &[
    ("grey", ColorCategory::Gray),
    ("silver", ColorCategory::Gray),
    ("charcoal", ColorCategory::Gray),
    ("slate", ColorCategory::Gray),
    ("ivory", ColorCategory::White),
    ("cream", ColorCategory::White),
    ("snow", ColorCategory::White),
    ("ebony", ColorCategory::Black),
    ("onyx", ColorCategory::Black),
    ("jet", ColorCategory::Black),
    ("crimson", ColorCategory::Red),
    ("scarlet", ColorCategory::Red),
    ("maroon", ColorCategory::Red),
    ("ruby", ColorCategory::Red),
    ("amber", ColorCategory::Orange),
    ("tangerine", ColorCategory::Orange),
    ("coral", ColorCategory::Orange),
    ("peach", ColorCategory::Orange),
    ("gold", ColorCategory::Yellow),
    ("golden", ColorCategory::Yellow),
    ("lemon", ColorCategory::Yellow),
    ("mustard", ColorCategory::Yellow),
    ("lime", ColorCategory::Green),
    ("olive", ColorCategory::Green),
    ("emerald", ColorCategory::Green),
    ("teal", ColorCategory::Blue),
    ("mint", ColorCategory::Green),
    ("navy", ColorCategory::Blue),
    ("cyan", ColorCategory::Blue),
    ("azure", ColorCategory::Blue),
    ("turquoise", ColorCategory::Blue),
    ("sky", ColorCategory::Blue),
    ("cobalt", ColorCategory::Blue),
    ("violet", ColorCategory::Purple),
    ("lavender", ColorCategory::Purple),
    ("lilac", ColorCategory::Purple),
    ("indigo", ColorCategory::Purple),
    ("plum", ColorCategory::Purple),
    ("magenta", ColorCategory::Pink),
    ("fuchsia", ColorCategory::Pink),
    ("rose", ColorCategory::Pink),
    ("salmon", ColorCategory::Pink),
    ("beige", ColorCategory::Brown),
    ("tan", ColorCategory::Brown),
    ("chocolate", ColorCategory::Brown),
    ("bronze", ColorCategory::Brown),
    ("sepia", ColorCategory::Brown),
];

/// Resolve a color word (canonical name or alias) to its category
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn resolve_alias(word: &str) -> Option<ColorCategory> {
    let word = word.trim().to_ascii_lowercase();
    ColorCategory::ALL
        .iter()
        .copied()
        .find(|c| c.name() == word)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == word)
                .map(|(_, category)| *category)
        })
}

/// Every alias that resolves to `category` (canonical name excluded)
pub fn aliases_of(category: ColorCategory) -> impl Iterator<Item = &'static str> {
    ALIASES
        .iter()
        .filter(move |(_, c)| *c == category)
        .map(|(alias, _)| *alias)
}

/// A color in CIE Lab space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    /// Convert an 8-bit sRGB triple to Lab
    ///
    /// # Algorithm
    /// 1. Undo the sRGB transfer curve to get linear RGB
    /// 2. Multiply by SRGB_TO_XYZ to get XYZ
    /// 3. Normalize by the D65 white and apply the Lab companding function
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        let linear = Vector3::new(
            srgb_to_linear(rgb[0]),
            srgb_to_linear(rgb[1]),
            srgb_to_linear(rgb[2]),
        );
        let xyz = srgb_to_xyz_matrix() * linear;

        let fx = lab_f(xyz.x / D65_WHITE[0]);
        let fy = lab_f(xyz.y / D65_WHITE[1]);
        let fz = lab_f(xyz.z / D65_WHITE[2]);

        Lab {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Chroma (distance from the neutral axis)
    pub fn chroma(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    pub fn distance_squared(&self, other: &Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }
}

/// Convert SRGB_TO_XYZ to a cgmath Matrix3 (cgmath is column-major)
fn srgb_to_xyz_matrix() -> Matrix3<f32> {
    let m = SRGB_TO_XYZ;
    Matrix3::new(
        m[0][0], m[1][0], m[2][0], // Column 0
        m[0][1], m[1][1], m[2][1], // Column 1
        m[0][2], m[1][2], m[2][2], // Column 2
    )
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// Hue in degrees [0, 360), saturation and lightness in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        let r = rgb[0] as f32 / 255.0;
        let g = rgb[1] as f32 / 255.0;
        let b = rgb[2] as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;

        if d <= f32::EPSILON {
            return Hsl { h: 0.0, s: 0.0, l };
        }

        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };

        let h = if max == r {
            ((g - b) / d).rem_euclid(6.0)
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl { h: h * 60.0, s, l }
    }
}

/// Lightness below which everything is black
const BLACK_LIGHTNESS: f32 = 0.1;
/// Lightness above which everything is white
const WHITE_LIGHTNESS: f32 = 0.93;
/// Saturation below which a pixel is treated as achromatic
const ACHROMATIC_SATURATION: f32 = 0.12;

/// Threshold pass shared by both classifiers: achromatic pixels and the
/// brown hue/lightness window. `None` means "fall through to nearest anchor".
fn classify_by_threshold(rgb: [u8; 3]) -> Option<ColorCategory> {
    let hsl = Hsl::from_rgb(rgb);

    if hsl.l < BLACK_LIGHTNESS {
        return Some(ColorCategory::Black);
    }
    if hsl.l > WHITE_LIGHTNESS {
        return Some(ColorCategory::White);
    }
    if hsl.s < ACHROMATIC_SATURATION {
        return Some(if hsl.l < 0.22 {
            ColorCategory::Black
        } else if hsl.l > 0.85 {
            ColorCategory::White
        } else {
            ColorCategory::Gray
        });
    }

    // Brown is a dark orange; nearest-anchor would call most of it red or orange
    if (10.0..=45.0).contains(&hsl.h) && (0.12..=0.45).contains(&hsl.l) && hsl.s >= 0.2 {
        return Some(ColorCategory::Brown);
    }

    None
}

/// Map an sRGB triple to its color category using RGB distance
pub fn classify_rgb(r: u8, g: u8, b: u8) -> ColorCategory {
    let rgb = [r, g, b];
    classify_by_threshold(rgb).unwrap_or_else(|| nearest_anchor_rgb(rgb))
}

/// Map an sRGB triple to its color category using Lab distance
///
/// Used for cluster representatives, where perceptual distance matters more
/// than raw channel distance.
pub fn classify_lab(rgb: [u8; 3]) -> ColorCategory {
    classify_by_threshold(rgb).unwrap_or_else(|| nearest_anchor_lab(Lab::from_rgb(rgb)))
}

fn nearest_anchor_rgb(rgb: [u8; 3]) -> ColorCategory {
    let distance = |anchor: [u8; 3]| -> i32 {
        (0..3)
            .map(|i| {
                let d = rgb[i] as i32 - anchor[i] as i32;
                d * d
            })
            .sum()
    };

    ColorCategory::ALL
        .iter()
        .copied()
        .min_by_key(|c| distance(c.anchor()))
        .unwrap_or(ColorCategory::Gray)
}

/// Extra reference points for the Lab matcher
///
/// A single anchor per category leaves gaps in Lab space: pure and navy
/// blues sit closer to the purple anchor, teal closer to gray.
const LAB_REFERENCES: &[([u8; 3], ColorCategory)] = &[
    ([255, 0, 0], ColorCategory::Red),
    ([139, 0, 0], ColorCategory::Red),
    ([255, 165, 0], ColorCategory::Orange),
    ([255, 255, 0], ColorCategory::Yellow),
    ([240, 230, 140], ColorCategory::Yellow),
    ([0, 255, 0], ColorCategory::Green),
    ([0, 100, 0], ColorCategory::Green),
    ([128, 128, 0], ColorCategory::Green),
    ([0, 0, 255], ColorCategory::Blue),
    ([0, 0, 128], ColorCategory::Blue),
    ([25, 25, 112], ColorCategory::Blue),
    ([0, 128, 128], ColorCategory::Blue),
    ([64, 224, 208], ColorCategory::Blue),
    ([135, 206, 235], ColorCategory::Blue),
    ([128, 0, 128], ColorCategory::Purple),
    ([75, 0, 130], ColorCategory::Purple),
    ([255, 192, 203], ColorCategory::Pink),
    ([255, 0, 255], ColorCategory::Pink),
    ([139, 69, 19], ColorCategory::Brown),
];

fn nearest_anchor_lab(lab: Lab) -> ColorCategory {
    ColorCategory::ALL
        .iter()
        .map(|c| (c.anchor(), *c))
        .chain(LAB_REFERENCES.iter().copied())
        .map(|(rgb, c)| (c, lab.distance_squared(&Lab::from_rgb(rgb))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
        .unwrap_or(ColorCategory::Gray)
}
