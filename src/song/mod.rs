// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song block engine.
//!
//! A [`Song`] owns the ordered blocks of one lyrics file together with the
//! font solver for the current screen geometry and a navigation cursor.
//! Blocks are loaded once, then reshaped in place by splitting, merging and
//! refrain insertion, and finally written back in the tagged dialect.
//!
//! The last block always ends with the end marker between operations. Every
//! transformation strips it first and restores it before returning.

pub mod block;
pub mod cursor;
pub mod parser;
pub mod refrain;
pub mod serializer;
pub mod splitter;

pub use block::{Block, END_MARKER, SPLIT_MARKER};
pub use cursor::Cursor;
pub use parser::{ParsedSong, SongMode};

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Result, SongError};
use crate::layout::{FontSolver, DEFAULT_FONT_SIZE, MAX_FONT_SIZE};
use crate::text::{self, TextEncoding};

/// Text shown when the song has no blocks
pub const EMPTY_PLACEHOLDER: &str = "EMPTY";
/// Text shown once the cursor has moved past the last block
pub const END_PLACEHOLDER: &str = "END";

/// Outcome of loading a song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SongStatus {
    /// Loaded, blocks available
    Ready,
    /// Nothing loaded yet, or the file held no text
    #[default]
    Empty,
    /// No file under either lookup location
    NotFound,
    /// File exists but reading it failed
    Unreadable,
    /// Tagged file whose block structure could not be parsed
    Corrupted,
}

/// What the cursor currently points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockView<'a> {
    /// Song has no blocks
    Empty,
    /// Cursor is past the last block
    End,
    /// A block and its 1-based number
    Block { number: usize, block: &'a Block },
}

impl<'a> BlockView<'a> {
    /// Text to display, placeholders included
    pub fn text(&self) -> &'a str {
        match *self {
            BlockView::Empty => EMPTY_PLACEHOLDER,
            BlockView::End => END_PLACEHOLDER,
            BlockView::Block { block, .. } => block.text(),
        }
    }

    /// 1-based block number, if on a block
    pub fn number(&self) -> Option<usize> {
        match *self {
            BlockView::Block { number, .. } => Some(number),
            _ => None,
        }
    }

    /// Whether this is the end-of-song placeholder
    pub fn is_end(&self) -> bool {
        matches!(self, BlockView::End)
    }
}

/// A block ready to paint: display lines plus the size to paint them at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenBlock {
    /// Non-empty display lines
    pub lines: Vec<String>,
    /// Font size in points
    pub font_size: u16,
}

impl ScreenBlock {
    fn placeholder(text: &str) -> Self {
        Self {
            lines: vec![text.to_string()],
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    fn from_text(text: &str, font_size: u16) -> Self {
        Self {
            lines: block::display_lines(text)
                .into_iter()
                .map(str::to_string)
                .collect(),
            font_size,
        }
    }
}

/// Locate a song file.
///
/// Appends `.txt` unless the name already ends with it (any case), then
/// tries the name as given and finally `songs_dir/<file name>`.
pub fn resolve_song_path(name: &str, songs_dir: &Path) -> Result<PathBuf> {
    let not_found = |tried| SongError::NotFound {
        name: name.to_string(),
        tried,
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(not_found(Vec::new()));
    }

    let file_name = if name.to_ascii_lowercase().ends_with(".txt") {
        name.to_string()
    } else {
        format!("{}.txt", name)
    };

    let direct = PathBuf::from(&file_name);
    if direct.is_file() {
        return Ok(direct);
    }

    let mut tried = vec![direct.clone()];
    if let Some(base) = direct.file_name() {
        let in_songs_dir = songs_dir.join(base);
        if in_songs_dir.is_file() {
            return Ok(in_songs_dir);
        }
        tried.push(in_songs_dir);
    }
    Err(not_found(tried))
}

/// One loaded song and its display state
#[derive(Debug)]
pub struct Song {
    path: Option<PathBuf>,
    mode: SongMode,
    encoding: Option<TextEncoding>,
    blocks: Vec<Block>,
    cursor: Cursor,
    solver: FontSolver,
    font_size_for_split: u16,
    font_size_step: u16,
    status: SongStatus,
    load_error: Option<SongError>,
    dirty: bool,
}

impl Song {
    /// Empty song bound to the given configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_solver(config, FontSolver::from_config(config))
    }

    /// Empty song using a caller-supplied solver
    pub fn with_solver(config: &EngineConfig, solver: FontSolver) -> Self {
        Self {
            path: None,
            mode: SongMode::default(),
            encoding: None,
            blocks: Vec::new(),
            cursor: Cursor::Empty,
            solver,
            font_size_for_split: config.viewport.font_size_for_split,
            font_size_step: config.font_size_step,
            status: SongStatus::Empty,
            load_error: None,
            dirty: false,
        }
    }

    /// Load a song by name. Never fails: problems are reported through
    /// [`Song::status`] and [`Song::load_error`].
    pub fn open(name: &str, config: &EngineConfig) -> Self {
        Self::open_with_solver(name, config, FontSolver::from_config(config))
    }

    /// Load a song by name using a caller-supplied solver
    pub fn open_with_solver(name: &str, config: &EngineConfig, solver: FontSolver) -> Self {
        let mut song = Self::with_solver(config, solver);

        let path = match resolve_song_path(name, &config.songs_dir) {
            Ok(path) => path,
            Err(e) => {
                warn!(name, error = %e, "song not found");
                song.fail(SongStatus::NotFound, e);
                return song;
            }
        };
        song.path = Some(path.clone());

        match text::read_text(&path) {
            Ok((encoding, contents)) => {
                debug!(path = %path.display(), encoding = encoding.name(), "decoded song file");
                song.encoding = Some(encoding);
                song.load_text(&contents);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "song file unreadable");
                song.fail(SongStatus::Unreadable, e);
            }
        }

        if song.status == SongStatus::Ready {
            info!(
                path = %path.display(),
                mode = ?song.mode,
                blocks = song.blocks.len(),
                "song loaded"
            );
        }
        song
    }

    /// Build a song from already decoded text
    pub fn from_text(text: &str, config: &EngineConfig) -> Self {
        Self::from_text_with_solver(text, config, FontSolver::from_config(config))
    }

    /// Build a song from decoded text using a caller-supplied solver
    pub fn from_text_with_solver(text: &str, config: &EngineConfig, solver: FontSolver) -> Self {
        let mut song = Self::with_solver(config, solver);
        song.load_text(text);
        song
    }

    fn load_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            self.reset(SongStatus::Empty);
            return;
        }

        let parsed = match parser::parse(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "song file corrupted");
                self.mode = SongMode::Tagged;
                self.fail(SongStatus::Corrupted, e.into());
                return;
            }
        };

        self.mode = parsed.mode;
        self.blocks = match parsed.mode {
            SongMode::Tagged => parsed.blocks,
            SongMode::Freeform => parsed
                .blocks
                .iter()
                .flat_map(|b| splitter::split_if_oversized(&self.solver, self.font_size_for_split, b))
                .collect(),
        };

        if self.blocks.is_empty() {
            self.reset(SongStatus::Empty);
            return;
        }

        self.add_end_marker();
        self.status = SongStatus::Ready;
        self.load_error = None;
        self.dirty = self.mode == SongMode::Freeform;
        self.cursor = Cursor::first(self.blocks.len());
    }

    fn reset(&mut self, status: SongStatus) {
        self.blocks.clear();
        self.cursor = Cursor::Empty;
        self.status = status;
        self.dirty = false;
    }

    fn fail(&mut self, status: SongStatus, error: SongError) {
        self.reset(status);
        self.load_error = Some(error);
    }

    // Accessors

    /// Load outcome
    pub fn status(&self) -> SongStatus {
        self.status
    }

    /// Error behind a non-Ready status, if any
    pub fn load_error(&self) -> Option<&SongError> {
        self.load_error.as_ref()
    }

    /// Resolved file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File dialect
    pub fn mode(&self) -> SongMode {
        self.mode
    }

    /// Encoding the file was decoded with
    pub fn encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }

    /// All blocks in order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the song has no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Cursor state
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the cursor has moved past the last block
    pub fn is_end(&self) -> bool {
        self.cursor.is_end()
    }

    /// Cursor position in the `[0, count + 1]` scheme
    pub fn cursor_position(&self) -> usize {
        self.cursor.number(self.blocks.len())
    }

    /// Current block number, never past the last block (0 when empty)
    pub fn current_block_number(&self) -> usize {
        self.cursor_position().min(self.blocks.len())
    }

    /// Split threshold in effect
    pub fn font_size_for_split(&self) -> u16 {
        self.font_size_for_split
    }

    /// Solver in use
    pub fn solver(&self) -> &FontSolver {
        &self.solver
    }

    /// Apply new geometry, threshold and step. Stored sizes are kept.
    pub fn reconfigure(&mut self, config: &EngineConfig) {
        self.solver.reconfigure(config);
        self.font_size_for_split = config.viewport.font_size_for_split;
        self.font_size_step = config.font_size_step;
        debug!(
            width = config.viewport.width,
            height = config.viewport.height,
            threshold = self.font_size_for_split,
            "song reconfigured"
        );
    }

    // Navigation

    fn view(&self) -> BlockView<'_> {
        match self.cursor {
            Cursor::Empty => BlockView::Empty,
            Cursor::PastEnd => BlockView::End,
            Cursor::Positioned(number) => match self.blocks.get(number - 1) {
                Some(block) => BlockView::Block { number, block },
                None => BlockView::Empty,
            },
        }
    }

    /// Move to the first block
    pub fn first(&mut self) -> BlockView<'_> {
        self.cursor = Cursor::first(self.blocks.len());
        self.view()
    }

    /// Block under the cursor, without moving
    pub fn current(&self) -> BlockView<'_> {
        self.view()
    }

    /// Advance one block; past the last block yields the end placeholder
    pub fn next(&mut self) -> BlockView<'_> {
        self.cursor = self.cursor.next(self.blocks.len());
        self.view()
    }

    /// Step back one block, stopping at the first
    pub fn previous(&mut self) -> BlockView<'_> {
        self.cursor = self.cursor.previous(self.blocks.len());
        self.view()
    }

    /// Jump to a 1-based block number
    pub fn go_to(&mut self, number: usize) -> BlockView<'_> {
        self.cursor = Cursor::goto(number, self.blocks.len());
        self.view()
    }

    // Display

    /// Current block at its stored size, computing and caching it if unset
    pub fn main_screen(&mut self) -> ScreenBlock {
        let Cursor::Positioned(number) = self.cursor else {
            return self.placeholder();
        };
        let Some(block) = self.blocks.get_mut(number - 1) else {
            return ScreenBlock::placeholder(EMPTY_PLACEHOLDER);
        };

        let size = match block.font_size() {
            Some(size) => size,
            None => {
                let size = self.solver.fit(block.text());
                block.set_font_size(Some(size));
                size
            }
        };
        ScreenBlock::from_text(block.text(), size)
    }

    /// Current block sized for the operator preview
    pub fn preview(&self) -> ScreenBlock {
        match self.view() {
            BlockView::Block { block, .. } => {
                ScreenBlock::from_text(block.text(), self.solver.preview(block.text()))
            }
            _ => self.placeholder(),
        }
    }

    fn placeholder(&self) -> ScreenBlock {
        match self.cursor {
            Cursor::PastEnd => ScreenBlock::placeholder(END_PLACEHOLDER),
            _ => ScreenBlock::placeholder(EMPTY_PLACEHOLDER),
        }
    }

    // Font size controls

    /// Stored size of the current block (0 when empty or unset)
    pub fn block_font_size(&self) -> u16 {
        self.current_index()
            .and_then(|i| self.blocks[i].font_size())
            .unwrap_or(0)
    }

    /// Solver fit for the current block, or the default size when empty
    pub fn calculate_font_size(&self) -> u16 {
        match self.current_index() {
            Some(i) => self.solver.fit(self.blocks[i].text()),
            None => DEFAULT_FONT_SIZE,
        }
    }

    /// Store an explicit size for the current block
    pub fn set_block_font_size(&mut self, size: u16) -> bool {
        let Some(index) = self.current_index() else {
            return false;
        };
        self.blocks[index].set_font_size(Some(size.min(MAX_FONT_SIZE)));
        self.dirty = true;
        true
    }

    /// Shift the current block's size by `delta`.
    ///
    /// The result is capped at [`MAX_FONT_SIZE`]; a change that would reach
    /// zero or below is refused and the old size returned.
    pub fn adjust_font_size(&mut self, delta: i32) -> Option<u16> {
        let base = self.effective_font_size()?;
        let target = i32::from(base).saturating_add(delta);
        if target <= 0 {
            return Some(base);
        }
        let size = target.min(i32::from(MAX_FONT_SIZE)) as u16;
        if size != base {
            self.set_block_font_size(size);
        }
        Some(size)
    }

    /// Raise the current block's size by the configured step
    pub fn increase_font_size(&mut self) -> Option<u16> {
        self.adjust_font_size(i32::from(self.font_size_step))
    }

    /// Lower the current block's size by the configured step
    pub fn decrease_font_size(&mut self) -> Option<u16> {
        self.adjust_font_size(-i32::from(self.font_size_step))
    }

    /// Replace the current block's stored size with a fresh fit
    pub fn recalculate_font_size(&mut self) -> Option<u16> {
        let index = self.current_index()?;
        let size = self.solver.fit(self.blocks[index].text());
        self.blocks[index].set_font_size(Some(size));
        self.dirty = true;
        Some(size)
    }

    fn current_index(&self) -> Option<usize> {
        self.current_block_number().checked_sub(1)
    }

    fn effective_font_size(&self) -> Option<u16> {
        let index = self.current_index()?;
        let block = &self.blocks[index];
        Some(block.font_size().unwrap_or_else(|| self.solver.fit(block.text())))
    }

    // Transformations

    fn remove_end_marker(&mut self) {
        if let Some(last) = self.blocks.last_mut() {
            let stripped = block::strip_end_marker(last.text()).to_string();
            last.set_text(stripped);
        }
    }

    fn add_end_marker(&mut self) {
        if let Some(last) = self.blocks.last_mut() {
            let marked = block::with_end_marker(last.text());
            last.set_text(marked);
        }
    }

    /// Run `f` with the end marker removed, then restore it and the cursor.
    ///
    /// A last block that `f` left untouched gets its original text back.
    fn transform<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let marked = self.blocks.last().map(|b| b.text().to_string());
        self.remove_end_marker();
        let stripped = self.blocks.last().map(|b| b.text().to_string());

        let result = f(self);

        let untouched = stripped.is_some() && self.blocks.last().map(Block::text) == stripped.as_deref();
        match (untouched, marked) {
            (true, Some(text)) => {
                if let Some(last) = self.blocks.last_mut() {
                    last.set_text(text);
                }
            }
            _ => self.add_end_marker(),
        }
        self.cursor = self.cursor.clamp(self.blocks.len());
        result
    }

    /// Split every block whose fit is below the threshold.
    ///
    /// Does nothing if any block is already split. Returns the number of
    /// blocks split.
    pub fn split_large_blocks_if_needed(&mut self) -> usize {
        if self.blocks.is_empty() {
            return 0;
        }
        let split = self.transform(|song| {
            splitter::split_large_blocks(&song.solver, song.font_size_for_split, &mut song.blocks)
        });
        if split > 0 {
            self.dirty = true;
            debug!(split, blocks = self.blocks.len(), "split oversized blocks");
        }
        split
    }

    /// Merge every split pair. Returns the number of merges.
    pub fn undo_split_blocks(&mut self) -> usize {
        if self.blocks.is_empty() {
            return 0;
        }
        let merged = self.transform(|song| splitter::undo_split_all(&song.solver, &mut song.blocks));
        if merged > 0 {
            self.dirty = true;
            debug!(merged, blocks = self.blocks.len(), "merged split blocks");
        }
        merged
    }

    /// Merge the split pair starting at 1-based `number`.
    ///
    /// No-op unless `number` is a split head with a following block.
    pub fn undo_split_for_block(&mut self, number: usize) -> bool {
        if number == 0 || number > self.blocks.len() {
            return false;
        }
        let merged =
            self.transform(|song| splitter::undo_split_at(&song.solver, &mut song.blocks, number - 1));
        if merged {
            self.dirty = true;
            debug!(number, "merged split block");
        }
        merged
    }

    /// Insert refrain copies after verses. Returns false for songs with
    /// fewer than two blocks.
    ///
    /// Calling this twice does not duplicate refrains already in place.
    pub fn insert_refrain(&mut self) -> bool {
        if self.blocks.len() < 2 {
            return false;
        }
        let inserted = self.transform(|song| refrain::insert_refrain(&mut song.blocks));
        if inserted > 0 {
            self.dirty = true;
        }
        debug!(inserted, blocks = self.blocks.len(), "inserted refrain");
        true
    }

    // Persistence

    /// Song rendered in the tagged dialect
    pub fn to_tagged(&self) -> String {
        serializer::to_tagged(&self.blocks, &self.solver)
    }

    /// Write back to the file the song was loaded from
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(SongError::EmptySong)?;
        self.save_as(&path)
    }

    /// Write to `path`, which becomes the song's path on success.
    ///
    /// On failure nothing in memory changes.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Err(e) = serializer::write_tagged(path, &self.blocks, &self.solver) {
            warn!(path = %path.display(), error = %e, "save failed");
            return Err(e);
        }

        info!(path = %path.display(), blocks = self.blocks.len(), "song saved");
        self.path = Some(path.to_path_buf());
        self.mode = SongMode::Tagged;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{TextMeasure, Viewport};

    /// Fit is min(200 / lines, 2000 / longest line) over 2000x200
    struct GridMeasure;

    impl TextMeasure for GridMeasure {
        fn fits(&self, text: &str, width: u32, height: u32, font_size: u16) -> bool {
            let lines = block::display_lines(text);
            let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            let size = font_size as u32;
            lines.len() as u32 * size <= height && longest as u32 * size <= width
        }
    }

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.viewport.width = 2000;
        config.viewport.height = 200;
        config.viewport.font_size_for_split = 40;
        config
    }

    fn song(text: &str) -> Song {
        let config = config();
        let solver = FontSolver::from_config(&config).with_measure(GridMeasure);
        Song::from_text_with_solver(text, &config, solver)
    }

    fn texts(song: &Song) -> Vec<&str> {
        song.blocks().iter().map(Block::text).collect()
    }

    fn lines(count: usize) -> String {
        (1..=count)
            .map(|i| format!("line number {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_tagged_load() {
        let song = song("@01#060Verse one$01@02#072Refrain$02");
        assert_eq!(song.status(), SongStatus::Ready);
        assert_eq!(song.mode(), SongMode::Tagged);
        assert_eq!(texts(&song), vec!["Verse one", "Refrain\n* * *"]);
        assert_eq!(song.blocks()[0].font_size(), Some(60));
        assert_eq!(song.cursor(), Cursor::Positioned(1));
        assert!(!song.is_dirty());
    }

    #[test]
    fn test_freeform_load() {
        let song = song("Amazing grace\nhow sweet\n\nI once was lost\nbut now am found");
        assert_eq!(song.mode(), SongMode::Freeform);
        assert_eq!(
            texts(&song),
            vec![
                "Amazing grace\nhow sweet",
                "I once was lost\nbut now am found\n* * *"
            ]
        );
        assert!(song.is_dirty());
        assert!(song.blocks().iter().all(|b| b.font_size().is_some()));
    }

    #[test]
    fn test_freeform_oversized_paragraph_split_on_load() {
        let song = song(&lines(8));
        assert_eq!(song.block_count(), 2);
        assert!(song.blocks()[0].is_split_head());
        assert!(song.blocks()[1].has_end_marker());
    }

    #[test]
    fn test_blank_text_is_empty() {
        let song = song(" \n\n ");
        assert_eq!(song.status(), SongStatus::Empty);
        assert!(song.load_error().is_none());
        assert_eq!(song.current(), BlockView::Empty);
    }

    #[test]
    fn test_corrupted_tagged_file() {
        let song = song("@01#040One$01@02#040Two");
        assert_eq!(song.status(), SongStatus::Corrupted);
        assert!(song.is_empty());
        assert!(matches!(song.load_error(), Some(SongError::Malformed(_))));
    }

    #[test]
    fn test_navigation() {
        let mut song = song("@01#050A$01@02#050B$02");
        assert_eq!(song.current().number(), Some(1));
        assert_eq!(song.next().number(), Some(2));

        let end = song.next();
        assert!(end.is_end());
        assert_eq!(end.text(), END_PLACEHOLDER);
        assert_eq!(song.cursor_position(), 3);
        assert!(song.next().is_end());
        assert_eq!(song.current_block_number(), 2);

        assert_eq!(song.previous().number(), Some(2));
        assert_eq!(song.previous().number(), Some(1));
        assert_eq!(song.previous().number(), Some(1));
        assert_eq!(song.go_to(2).text(), "B\n* * *");
        assert_eq!(song.first().text(), "A");
    }

    #[test]
    fn test_empty_navigation() {
        let mut song = Song::new(&config());
        assert_eq!(song.first(), BlockView::Empty);
        assert_eq!(song.next().text(), EMPTY_PLACEHOLDER);
        assert_eq!(song.previous(), BlockView::Empty);
        assert_eq!(song.main_screen().lines, vec![EMPTY_PLACEHOLDER]);
    }

    #[test]
    fn test_main_screen_caches_fit() {
        let mut song = song("@01#000One\ntwo$01");
        assert_eq!(song.blocks()[0].font_size(), None);

        let screen = song.main_screen();
        assert_eq!(screen.lines, vec!["One", "two", "* * *"]);
        assert_eq!(screen.font_size, 66);
        assert_eq!(song.blocks()[0].font_size(), Some(66));
    }

    #[test]
    fn test_main_screen_at_end() {
        let mut song = song("@01#050A$01");
        song.next();
        let screen = song.main_screen();
        assert_eq!(screen.lines, vec![END_PLACEHOLDER]);
        assert_eq!(screen.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_preview_uses_preview_geometry() {
        let song = song("@01#050Alpha beta$01");
        let preview = song.preview();
        assert_eq!(preview.lines, vec!["Alpha beta", "* * *"]);
        // 320 / 10 glyphs
        assert_eq!(preview.font_size, 32);
    }

    #[test]
    fn test_font_controls() {
        let mut song = song("@01#050A$01@02#004B$02");
        assert_eq!(song.block_font_size(), 50);
        assert_eq!(song.increase_font_size(), Some(55));
        assert_eq!(song.decrease_font_size(), Some(50));
        assert!(song.is_dirty());

        song.next();
        assert_eq!(song.decrease_font_size(), Some(4));
        assert_eq!(song.block_font_size(), 4);

        assert!(song.set_block_font_size(5000));
        assert_eq!(song.block_font_size(), MAX_FONT_SIZE);
        assert_eq!(song.increase_font_size(), Some(MAX_FONT_SIZE));

        assert_eq!(song.recalculate_font_size(), Some(100));
        assert_eq!(song.adjust_font_size(-99), Some(1));
        assert_eq!(song.adjust_font_size(-1), Some(1));
    }

    #[test]
    fn test_adjust_font_size_extreme_delta() {
        let mut song = song("@01#050A$01");
        assert_eq!(song.adjust_font_size(i32::MIN), Some(50));
        assert_eq!(song.block_font_size(), 50);
        assert_eq!(song.adjust_font_size(i32::MAX), Some(MAX_FONT_SIZE));
        assert_eq!(song.block_font_size(), MAX_FONT_SIZE);
    }

    #[test]
    fn test_split_and_undo_restore_text() {
        let original = format!("@01#030{}$01@02#100Short$02", lines(8));
        let mut song = song(&original);

        assert_eq!(song.split_large_blocks_if_needed(), 1);
        assert_eq!(song.block_count(), 3);
        assert!(song.blocks()[0].is_split_head());
        assert!(song.blocks()[2].has_end_marker());
        assert!(song.is_dirty());

        assert_eq!(song.split_large_blocks_if_needed(), 0);
        assert_eq!(song.block_count(), 3);

        assert_eq!(song.undo_split_blocks(), 1);
        assert_eq!(texts(&song), vec![lines(8).as_str(), "Short\n* * *"]);
    }

    #[test]
    fn test_split_last_block_keeps_single_end_marker() {
        let mut song = song(&format!("@01#100Intro$01@02#030{}$02", lines(8)));
        assert_eq!(song.split_large_blocks_if_needed(), 1);

        let last = song.blocks().last().unwrap().text();
        assert!(last.ends_with("line number 8\n* * *"));
        assert!(!song.blocks()[1].has_end_marker());
    }

    #[test]
    fn test_undo_split_for_block() {
        let mut song = song(&format!("@01#030{}$01@02#100Short$02", lines(8)));
        song.split_large_blocks_if_needed();

        assert!(!song.undo_split_for_block(0));
        assert!(!song.undo_split_for_block(2));
        assert!(!song.undo_split_for_block(9));
        assert!(song.undo_split_for_block(1));
        assert_eq!(song.block_count(), 2);
        assert_eq!(song.blocks()[0].font_size(), Some(25));
    }

    #[test]
    fn test_noop_transform_keeps_text() {
        let original = "@01#050A\r\nB$01@02#050C\r\nD\r\n* * *\r\n$02";
        let mut song = song(original);
        assert_eq!(song.to_tagged(), original);

        assert!(!song.undo_split_for_block(1));
        assert_eq!(song.undo_split_blocks(), 0);
        assert_eq!(song.split_large_blocks_if_needed(), 0);
        assert_eq!(song.to_tagged(), original);
        assert!(!song.is_dirty());
    }

    #[test]
    fn test_split_keeps_crlf_end_marker() {
        let verse = lines(8).replace('\n', "\r\n");
        let mut song = song(&format!("@01#100Intro$01@02#030{}\r\n* * *$02", verse));
        assert_eq!(song.split_large_blocks_if_needed(), 1);
        assert!(song.blocks()[2].text().ends_with("line number 8\r\n* * *"));

        assert_eq!(song.undo_split_blocks(), 1);
        assert_eq!(song.blocks()[1].text(), format!("{}\r\n* * *", verse));
    }

    #[test]
    fn test_refrain_after_split_verse_keeps_pairs() {
        let chorus = (1..=8)
            .map(|i| format!("chorus line {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let mut song = song(&format!("{}\n\n{}\n\nShort verse", lines(8), chorus));
        assert_eq!(song.block_count(), 5);
        assert!(song.blocks()[0].is_split_head());
        assert!(song.blocks()[2].is_split_head());

        assert!(song.insert_refrain());
        assert_eq!(song.block_count(), 7);
        assert!(!song.blocks()[1].text().starts_with("chorus"));
        assert_eq!(song.blocks()[4].text(), "Short verse");
        assert!(song.blocks()[5].is_split_head());

        assert!(song.undo_split_for_block(1));
        assert_eq!(song.blocks()[0].text(), lines(8));
    }

    #[test]
    fn test_cursor_clamped_after_merge() {
        let mut song = song(&format!("@01#100Intro$01@02#030{}$02", lines(8)));
        song.split_large_blocks_if_needed();
        song.go_to(3);

        song.undo_split_blocks();
        assert_eq!(song.cursor(), Cursor::Positioned(2));
    }

    #[test]
    fn test_insert_refrain() {
        let mut song = song("@01#050V1$01@02#050R$02@03#050V2$03");
        assert!(song.insert_refrain());
        assert_eq!(texts(&song), vec!["V1", "R", "V2", "R\n* * *"]);

        assert!(song.insert_refrain());
        assert_eq!(song.block_count(), 4);
    }

    #[test]
    fn test_insert_refrain_too_short() {
        let mut song = song("@01#050Only$01");
        assert!(!song.insert_refrain());
        assert!(!song.is_dirty());
    }

    #[test]
    fn test_to_tagged() {
        let song = song("@01#050A$01@02#060B$02");
        assert_eq!(song.to_tagged(), "@01#050A$01@02#060B\n* * *$02");
    }

    #[test]
    fn test_save_without_path() {
        let mut song = song("@01#050A$01");
        assert!(matches!(song.save(), Err(SongError::EmptySong)));
    }

    #[test]
    fn test_resolve_blank_name() {
        let result = resolve_song_path("  ", Path::new("songs"));
        assert!(matches!(result, Err(SongError::NotFound { tried, .. }) if tried.is_empty()));
    }

    #[test]
    fn test_reconfigure() {
        let mut song = song("@01#000Alpha beta$01");
        let mut config = config();
        config.viewport.width = 500;
        config.viewport.font_size_for_split = 12;
        song.reconfigure(&config);

        assert_eq!(song.font_size_for_split(), 12);
        assert_eq!(song.solver().viewport(), Viewport::new(500, 200));
        assert_eq!(song.calculate_font_size(), 50);
    }
}
