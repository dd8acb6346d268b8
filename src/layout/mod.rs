// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Font-fit solver.
//!
//! Finds the largest integer font size at which a block renders inside a
//! viewport without overflowing. Two algorithms are available:
//!
//! - **Measured**: binary search over `[floor, 200]` against a
//!   [`TextMeasure`] backend that answers "does this text fit at size S".
//!   Fit is assumed monotonically non-increasing in font size.
//! - **Heuristic**: a closed-form estimate from the weighted length of the
//!   longest line and the line count. Needs no layout backend.
//!
//! Results are pure functions of text and geometry.

pub mod measure;

pub use measure::EstimatedLayout;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::song::block::display_lines;

/// Smallest font size the solver returns for the main screen
pub const MIN_FONT_SIZE: u16 = 10;
/// Largest font size accepted anywhere in the engine
pub const MAX_FONT_SIZE: u16 = 1000;
/// Upper bound of the measured binary search
pub const MAX_SEARCH_SIZE: u16 = 200;
/// Smallest font size returned for the preview thumbnail
pub const MIN_PREVIEW_FONT_SIZE: u16 = 8;
/// Size used for blank text and placeholders
pub const DEFAULT_FONT_SIZE: u16 = 90;

/// Screen width the heuristic width formula was tuned for
const REFERENCE_WIDTH: f64 = 1920.0;
/// Bold glyphs of size 12 that span the reference width
const GLYPHS_PER_REFERENCE_WIDTH: f64 = 280.0;
const HEURISTIC_BASE_SIZE: f64 = 12.0;
const HEURISTIC_LINE_SPACING: f64 = 1.5;

/// Text measurement capability required by the measured algorithm
pub trait TextMeasure {
    /// Whether `text`, laid out at `font_size`, fits inside a single
    /// `width` x `height` page with no margins
    fn fits(&self, text: &str, width: u32, height: u32, font_size: u16) -> bool;
}

/// Target area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a new viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Area in square pixels
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Which fit algorithm a song uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStrategy {
    /// Binary search against a measurement backend
    #[default]
    Measured,
    /// Closed-form estimate
    Heuristic,
}

/// Largest size in `[floor, MAX_SEARCH_SIZE]` at which `text` fits.
///
/// Returns `floor` when nothing fits, and [`DEFAULT_FONT_SIZE`] for blank
/// text.
pub fn fit_measured(measure: &dyn TextMeasure, text: &str, viewport: Viewport, floor: u16) -> u16 {
    if text.trim().is_empty() {
        return DEFAULT_FONT_SIZE;
    }

    let fits = |size: u16| measure.fits(text, viewport.width, viewport.height, size);

    let mut lo = floor;
    let mut hi = MAX_SEARCH_SIZE.max(floor);
    if !fits(lo) {
        return floor;
    }

    // fits(lo) holds throughout; ties resolve upward
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    lo.min(MAX_FONT_SIZE)
}

/// Closed-form font size estimate.
///
/// The longest line's weighted length sets a width-bound size; if the
/// block has more lines than fit at 1.5 line spacing, the size shrinks
/// in proportion.
pub fn estimate(text: &str, viewport: Viewport, floor: u16) -> u16 {
    let lines = display_lines(text);
    let Some(longest) = lines.iter().max_by_key(|line| line.chars().count()) else {
        return DEFAULT_FONT_SIZE;
    };

    let weighted = measure::weighted_len(longest);
    if weighted <= 0.0 {
        return DEFAULT_FONT_SIZE;
    }

    let glyphs_across = viewport.width as f64 * GLYPHS_PER_REFERENCE_WIDTH / REFERENCE_WIDTH;
    let mut size = HEURISTIC_BASE_SIZE * glyphs_across / weighted;

    let max_lines = viewport.height as f64 / (size * HEURISTIC_LINE_SPACING);
    if max_lines > 0.0 && lines.len() as f64 > max_lines {
        size *= max_lines / lines.len() as f64;
    }

    (size as u16).clamp(floor, MAX_FONT_SIZE)
}

/// Font-fit solver bound to the main and preview geometry
pub struct FontSolver {
    measure: Box<dyn TextMeasure>,
    strategy: FitStrategy,
    viewport: Viewport,
    preview: Viewport,
}

impl fmt::Debug for FontSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSolver")
            .field("strategy", &self.strategy)
            .field("viewport", &self.viewport)
            .field("preview", &self.preview)
            .finish_non_exhaustive()
    }
}

impl FontSolver {
    /// Create a measured solver using the built-in [`EstimatedLayout`]
    pub fn new(viewport: Viewport, preview: Viewport) -> Self {
        Self {
            measure: Box::new(EstimatedLayout::new()),
            strategy: FitStrategy::Measured,
            viewport,
            preview,
        }
    }

    /// Create a solver from the engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.viewport.viewport(), config.preview.viewport())
            .with_strategy(config.fit_strategy)
    }

    /// Builder: replace the measurement backend
    pub fn with_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Builder: set strategy
    pub fn with_strategy(mut self, strategy: FitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Get strategy
    pub fn strategy(&self) -> FitStrategy {
        self.strategy
    }

    /// Get main viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Get preview viewport
    pub fn preview_viewport(&self) -> Viewport {
        self.preview
    }

    /// Replace geometry and strategy, keeping the backend
    pub fn reconfigure(&mut self, config: &EngineConfig) {
        self.viewport = config.viewport.viewport();
        self.preview = config.preview.viewport();
        self.strategy = config.fit_strategy;
    }

    /// Fit for the main screen
    pub fn fit(&self, text: &str) -> u16 {
        self.fit_in(text, self.viewport)
    }

    /// Fit for an arbitrary viewport, floored at [`MIN_FONT_SIZE`]
    pub fn fit_in(&self, text: &str, viewport: Viewport) -> u16 {
        self.solve(text, viewport, MIN_FONT_SIZE)
    }

    /// Heuristic estimate for the main screen, regardless of strategy
    pub fn estimate(&self, text: &str) -> u16 {
        estimate(text, self.viewport, MIN_FONT_SIZE)
    }

    /// Fit for the preview thumbnail, floored at [`MIN_PREVIEW_FONT_SIZE`]
    pub fn preview(&self, text: &str) -> u16 {
        self.solve(text, self.preview, MIN_PREVIEW_FONT_SIZE)
    }

    fn solve(&self, text: &str, viewport: Viewport, floor: u16) -> u16 {
        match self.strategy {
            FitStrategy::Measured => fit_measured(self.measure.as_ref(), text, viewport, floor),
            FitStrategy::Heuristic => estimate(text, viewport, floor),
        }
    }
}
