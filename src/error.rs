// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for song loading, parsing and saving.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the tagged-dialect scanner
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The `@01` marker is present but no block could be extracted
    #[error("tagged song contains no complete @NN#FFF...$NN block")]
    NoBlocks,
    /// A block header was found without a closing `$NN`
    #[error("block @{ordinal} at byte {offset} has no closing $NN")]
    Unterminated {
        /// Two-digit ordinal from the header
        ordinal: String,
        /// Byte offset of the `@` that opened the block
        offset: usize,
    },
}

/// Errors raised while loading or saving a song
#[derive(Debug, Error)]
pub enum SongError {
    /// Neither lookup location holds the song file
    #[error("song {name:?} not found (tried {tried:?})")]
    NotFound {
        /// Name as supplied by the caller
        name: String,
        /// Paths checked, in order
        tried: Vec<PathBuf>,
    },
    /// The file exists but could not be read
    #[error("failed to read {path:?}: {source}")]
    Unreadable {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// The file was read but its block structure is inconsistent
    #[error("malformed song file: {0}")]
    Malformed(#[from] ParseError),
    /// Writing the tagged dialect failed
    #[error("failed to save {path:?}: {source}")]
    Save {
        /// Destination file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// The song has more blocks than the tagged dialect can number
    #[error("cannot save {count} blocks: the tagged format holds at most {max}")]
    TooManyBlocks {
        /// Blocks in the song
        count: usize,
        /// Largest writable block count
        max: usize,
    },
    /// Save requested on a song without blocks or without a file name
    #[error("nothing to save: song is empty")]
    EmptySong,
}

/// Result alias for song operations
pub type Result<T> = std::result::Result<T, SongError>;
