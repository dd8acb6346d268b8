// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Block parser for the two song file dialects.
//!
//! Tagged files delimit blocks with `@NN#FFF<text>$NN`, where `NN` is a
//! two-digit ordinal and `FFF` a three-digit font size. Any file without
//! the `@01` marker is freeform: paragraphs separated by blank lines.
//!
//! The tagged dialect is read by a byte scanner rather than a pattern
//! engine. All delimiters are ASCII, so every slice boundary it produces
//! is also a UTF-8 character boundary.

use crate::error::ParseError;

use super::block::Block;

/// Marker whose presence selects the tagged dialect
pub const TAGGED_MARKER: &str = "@01";

/// Length of `@NN#FFF`
const HEADER_LEN: usize = 7;
/// Length of `$NN`
const CLOSING_LEN: usize = 3;

/// File dialect of a song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SongMode {
    /// `@NN#FFF...$NN` blocks with explicit font sizes
    Tagged,
    /// Blank-line separated paragraphs, font sizes always computed
    #[default]
    Freeform,
}

/// Result of parsing a decoded song file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSong {
    /// Detected dialect
    pub mode: SongMode,
    /// Blocks in file order
    pub blocks: Vec<Block>,
}

/// Parse decoded file text, choosing the dialect by the `@01` marker.
///
/// Freeform paragraphs are returned unsplit; oversized ones are divided
/// by the caller once a font solver is available.
pub fn parse(text: &str) -> Result<ParsedSong, ParseError> {
    if text.contains(TAGGED_MARKER) {
        Ok(ParsedSong {
            mode: SongMode::Tagged,
            blocks: parse_tagged(text)?,
        })
    } else {
        Ok(ParsedSong {
            mode: SongMode::Freeform,
            blocks: parse_freeform(text),
        })
    }
}

/// Scan `@NN#FFF<text>$NN` blocks. Block text is captured verbatim.
pub fn parse_tagged(text: &str) -> Result<Vec<Block>, ParseError> {
    let bytes = text.as_bytes();
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_header(bytes, pos) {
        let body_start = start + HEADER_LEN;
        let Some(end) = find_closing(bytes, body_start) else {
            return Err(ParseError::Unterminated {
                ordinal: text[start + 1..start + 3].to_string(),
                offset: start,
            });
        };

        let mut block = Block::new(&text[body_start..end]);
        block.set_font_size(text[start + 4..start + 7].parse::<u16>().ok());
        blocks.push(block);

        pos = end + CLOSING_LEN;
    }

    if blocks.is_empty() {
        return Err(ParseError::NoBlocks);
    }
    Ok(blocks)
}

/// Split on blank lines (LF or CRLF) into trimmed, non-empty paragraphs
pub fn parse_freeform(text: &str) -> Vec<Block> {
    let normalized = text.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(|paragraph| {
            paragraph
                .trim()
                .lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|paragraph| !paragraph.is_empty())
        .map(Block::new)
        .collect()
}

fn is_digit(bytes: &[u8], index: usize) -> bool {
    bytes.get(index).is_some_and(u8::is_ascii_digit)
}

/// Find the next `@NN#FFF` at or after `from`
fn find_header(bytes: &[u8], from: usize) -> Option<usize> {
    (from..bytes.len()).find(|&i| {
        bytes[i] == b'@'
            && is_digit(bytes, i + 1)
            && is_digit(bytes, i + 2)
            && bytes.get(i + 3) == Some(&b'#')
            && (i + 4..i + 7).all(|j| is_digit(bytes, j))
    })
}

/// Find the next `$NN` at or after `from`
fn find_closing(bytes: &[u8], from: usize) -> Option<usize> {
    (from..bytes.len())
        .find(|&i| bytes[i] == b'$' && is_digit(bytes, i + 1) && is_digit(bytes, i + 2))
}
