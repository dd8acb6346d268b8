// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Lyrics display engine.
//!
//! Loads a song file of unknown encoding, parses it into display blocks,
//! sizes each block to fill a target screen, and keeps split, merge and
//! refrain edits consistent with the navigation cursor until the song is
//! written back in the tagged dialect.

pub mod config;
pub mod error;
pub mod layout;
pub mod song;
pub mod text;

pub use config::EngineConfig;
pub use error::{ParseError, SongError};
pub use layout::{FitStrategy, FontSolver, TextMeasure, Viewport};
pub use song::{Block, BlockView, ScreenBlock, Song, SongMode, SongStatus};
pub use text::TextEncoding;
