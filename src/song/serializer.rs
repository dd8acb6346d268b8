// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tagged-dialect writer.
//!
//! Blocks are written back to back as `@NN#FFF<text>$NN` with no separator.
//! Unset font sizes are filled in from the solver. The font field is three
//! digits wide, so sizes are capped at 999 on write. Ordinals are two
//! digits wide, so songs of more than 99 blocks are refused on write.

use std::fs;
use std::path::Path;

use crate::error::{Result, SongError};
use crate::layout::FontSolver;

use super::block::Block;

/// Largest size representable in the `FFF` field
pub const MAX_WRITTEN_FONT_SIZE: u16 = 999;

/// Largest ordinal representable in the `NN` fields
pub const MAX_WRITTEN_BLOCKS: usize = 99;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Render blocks in the tagged dialect
pub fn to_tagged(blocks: &[Block], solver: &FontSolver) -> String {
    let mut out = String::new();
    for (index, block) in blocks.iter().enumerate() {
        let ordinal = index + 1;
        let size = block
            .font_size()
            .unwrap_or_else(|| solver.fit(block.text()))
            .min(MAX_WRITTEN_FONT_SIZE);
        out.push_str(&format!("@{:02}#{:03}{}${:02}", ordinal, size, block.text(), ordinal));
    }
    out
}

/// Write tagged text as UTF-8 with a byte-order mark
pub fn write_tagged(path: &Path, blocks: &[Block], solver: &FontSolver) -> Result<()> {
    if blocks.is_empty() {
        return Err(SongError::EmptySong);
    }
    if blocks.len() > MAX_WRITTEN_BLOCKS {
        return Err(SongError::TooManyBlocks {
            count: blocks.len(),
            max: MAX_WRITTEN_BLOCKS,
        });
    }

    let text = to_tagged(blocks, solver);
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(text.as_bytes());

    fs::write(path, bytes).map_err(|source| SongError::Save {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{TextMeasure, Viewport};
    use crate::song::parser::{parse, SongMode};
    use tempfile::tempdir;

    struct FixedMeasure;

    impl TextMeasure for FixedMeasure {
        fn fits(&self, _text: &str, _width: u32, _height: u32, font_size: u16) -> bool {
            font_size <= 72
        }
    }

    fn solver() -> FontSolver {
        FontSolver::new(Viewport::new(1920, 1080), Viewport::new(320, 180)).with_measure(FixedMeasure)
    }

    #[test]
    fn test_format() {
        let blocks = vec![
            Block::new("First\nline").with_font_size(60),
            Block::new("Second").with_font_size(5),
        ];
        assert_eq!(
            to_tagged(&blocks, &solver()),
            "@01#060First\nline$01@02#005Second$02"
        );
    }

    #[test]
    fn test_unset_size_is_computed() {
        let blocks = vec![Block::new("No size")];
        assert_eq!(to_tagged(&blocks, &solver()), "@01#072No size$01");
    }

    #[test]
    fn test_size_capped_to_three_digits() {
        let blocks = vec![Block::new("Huge").with_font_size(1000)];
        assert_eq!(to_tagged(&blocks, &solver()), "@01#999Huge$01");
    }

    #[test]
    fn test_output_parses_back() {
        let blocks = vec![
            Block::new("Amazing grace =>").with_font_size(80),
            Block::new("how sweet\n* * *").with_font_size(95),
        ];
        let parsed = parse(&to_tagged(&blocks, &solver())).unwrap();
        assert_eq!(parsed.mode, SongMode::Tagged);
        assert_eq!(parsed.blocks, blocks);
    }

    #[test]
    fn test_write_with_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_tagged(&path, &[Block::new("Слава").with_font_size(90)], &solver()).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
        assert_eq!(
            std::str::from_utf8(&bytes[3..]).unwrap(),
            "@01#090Слава$01"
        );
    }

    #[test]
    fn test_write_empty_song() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        assert!(matches!(
            write_tagged(&path, &[], &solver()),
            Err(SongError::EmptySong)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_too_many_blocks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut blocks: Vec<Block> = (1..=MAX_WRITTEN_BLOCKS)
            .map(|i| Block::new(format!("Block {}", i)).with_font_size(60))
            .collect();
        write_tagged(&path, &blocks, &solver()).unwrap();
        let written = fs::read(&path).unwrap();
        let reparsed = parse(std::str::from_utf8(&written[3..]).unwrap()).unwrap();
        assert_eq!(reparsed.blocks.len(), MAX_WRITTEN_BLOCKS);

        blocks.push(Block::new("One too many"));
        let result = write_tagged(&path, &blocks, &solver());
        assert!(matches!(result, Err(SongError::TooManyBlocks { count: 100, .. })));
        assert_eq!(fs::read(&path).unwrap(), written);
    }

    #[test]
    fn test_write_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        let result = write_tagged(&path, &[Block::new("x")], &solver());
        assert!(matches!(result, Err(SongError::Save { .. })));
    }
}
