// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Built-in text measurement backend.
//!
//! Lays a block out as one centered paragraph per display line, wrapping
//! greedily at spaces, with glyph advances taken from a per-character
//! weight table. No glyph is ever broken across lines, so a word wider
//! than the viewport never fits.

use crate::song::block::display_lines;

use super::TextMeasure;

/// Average advance of a weight-1.0 glyph, in ems
pub const ADVANCE_EM: f64 = 0.55;
/// Advance of a space, in ems
pub const SPACE_EM: f64 = 0.28;
/// Line pitch, in ems
pub const LINE_HEIGHT_EM: f64 = 1.15;

/// Relative width of a glyph compared to an average letter.
///
/// Wide letters (W, M, Ш, щ) weigh more than 1.0, narrow ones (i, l, 1,
/// punctuation) less.
pub fn char_weight(c: char) -> f64 {
    match c {
        'W' => 1.5,
        'M' => 1.4,
        'm' | 'w' => 1.3,
        'i' => 0.7,
        'l' | 'j' => 0.6,
        't' | 'f' => 0.8,
        'r' => 0.9,

        'Ш' | 'М' => 1.4,
        'м' | 'ш' | 'ф' => 1.3,
        'щ' => 1.5,
        'й' => 0.8,
        'л' | 'т' | 'и' => 0.9,

        '1' => 0.8,
        '.' | ',' | ':' | ';' => 0.6,
        '!' => 0.7,
        _ => 1.0,
    }
}

/// Sum of glyph weights for a run of text
pub fn weighted_len(text: &str) -> f64 {
    text.chars().map(char_weight).sum()
}

/// Estimated layout of bold proportional text
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedLayout;

impl EstimatedLayout {
    /// Create the backend
    pub fn new() -> Self {
        Self
    }

    /// Number of wrapped lines needed at `font_size`, or None when a
    /// single word is wider than `width`
    pub fn wrapped_line_count(&self, text: &str, width: u32, font_size: u16) -> Option<usize> {
        let size = font_size as f64;
        let max_width = width as f64;
        let space = SPACE_EM * size;
        let mut count = 0;

        for line in display_lines(text) {
            let mut current = 0.0;
            let mut started = false;
            for word in line.split_whitespace() {
                let word_width = weighted_len(word) * ADVANCE_EM * size;
                if word_width > max_width {
                    return None;
                }
                if !started {
                    current = word_width;
                    started = true;
                } else if current + space + word_width <= max_width {
                    current += space + word_width;
                } else {
                    count += 1;
                    current = word_width;
                }
            }
            if started {
                count += 1;
            }
        }

        Some(count)
    }
}

impl TextMeasure for EstimatedLayout {
    fn fits(&self, text: &str, width: u32, height: u32, font_size: u16) -> bool {
        match self.wrapped_line_count(text, width, font_size) {
            Some(lines) => lines as f64 * LINE_HEIGHT_EM * font_size as f64 <= height as f64,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_weights() {
        assert_eq!(char_weight('W'), 1.5);
        assert_eq!(char_weight('щ'), 1.5);
        assert_eq!(char_weight('l'), 0.6);
        assert_eq!(char_weight('a'), 1.0);
        assert!((weighted_len("Wil") - 2.8).abs() < 1e-9);
    }

    #[test]
    fn test_short_line_fits() {
        let layout = EstimatedLayout::new();
        assert!(layout.fits("Hello", 1920, 1080, 100));
    }

    #[test]
    fn test_wraps_long_line() {
        let layout = EstimatedLayout::new();
        // 10 words of 5 glyphs at size 100: 275px each, 28px spaces
        let text = "aaaaa aaaaa aaaaa aaaaa aaaaa aaaaa aaaaa aaaaa aaaaa aaaaa";
        assert_eq!(layout.wrapped_line_count(text, 1920, 100), Some(2));
        assert_eq!(layout.wrapped_line_count(text, 10_000, 100), Some(1));
    }

    #[test]
    fn test_word_wider_than_viewport() {
        let layout = EstimatedLayout::new();
        assert_eq!(layout.wrapped_line_count("Supercalifragilistic", 200, 100), None);
        assert!(!layout.fits("Supercalifragilistic", 200, 10_000, 100));
    }

    #[test]
    fn test_height_limits_fit() {
        let layout = EstimatedLayout::new();
        let text = "one\ntwo\nthree\nfour";
        // four lines at 100px need 460px
        assert!(layout.fits(text, 1920, 461, 100));
        assert!(!layout.fits(text, 1920, 455, 100));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let layout = EstimatedLayout::new();
        assert_eq!(layout.wrapped_line_count("one\n\n\ntwo", 1920, 50), Some(2));
    }
}
