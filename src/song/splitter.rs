// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Splitting of oversized blocks and the inverse merge.
//!
//! A block whose fit falls below the split threshold is divided by line
//! count into two blocks. The first half carries the split marker on its
//! last line; the block right after it is its continuation. Merging strips
//! the marker and joins the pair with the block's own line break, so blank
//! lines and CRLF endings survive a split and merge.
//!
//! Halves of one or two lines that still do not fit get their oversized
//! lines bisected at the space nearest the middle, at most once per line.
//! That bisection is not undone by a merge.

use crate::layout::FontSolver;

use super::block::{line_separator, Block, SPLIT_MARKER};

/// A line plus whether it was already produced by a bisection
#[derive(Debug, Clone)]
struct Line {
    text: String,
    bisected: bool,
}

impl Line {
    fn original(text: String) -> Self {
        Self {
            text,
            bisected: false,
        }
    }

    fn bisected(text: String) -> Self {
        Self {
            text,
            bisected: true,
        }
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn join(lines: &[Line], separator: &str) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Number of non-blank lines
fn content_len(lines: &[Line]) -> usize {
    lines.iter().filter(|line| !line.is_blank()).count()
}

/// Index where the second half starts: right after the last non-blank
/// line of the first half. Needs at least two non-blank lines.
fn split_point(lines: &[Line]) -> usize {
    let content: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.is_blank())
        .map(|(index, _)| index)
        .collect();
    content[content.len() / 2 - 1] + 1
}

/// Split a line at the space closest to its middle character.
///
/// Ties go to the later space. Returns None when the line has no interior
/// space.
pub fn bisect_line(line: &str) -> Option<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mid = chars.len() / 2;

    let split_at = (0..=mid.max(chars.len() - mid)).find_map(|distance| {
        let after = mid + distance;
        if after < chars.len() && chars[after] == ' ' {
            return Some(after);
        }
        let before = mid.checked_sub(distance)?;
        (chars.get(before) == Some(&' ')).then_some(before)
    })?;

    let first: String = chars[..split_at].iter().collect();
    let second: String = chars[split_at..].iter().collect();
    let (first, second) = (first.trim().to_string(), second.trim().to_string());
    if first.is_empty() || second.is_empty() {
        return None;
    }
    Some((first, second))
}

/// Bisect every not-yet-bisected line whose own fit is below `threshold`
fn bisect_oversized(solver: &FontSolver, threshold: u16, lines: Vec<Line>) -> Vec<Line> {
    let mut out = Vec::with_capacity(lines.len() + 2);
    for line in lines {
        if !line.bisected && solver.fit(&line.text) < threshold {
            if let Some((first, second)) = bisect_line(&line.text) {
                out.push(Line::bisected(first));
                out.push(Line::bisected(second));
                continue;
            }
        }
        out.push(line);
    }
    out
}

/// Split a block in two if its fit is below `threshold`.
///
/// A block that fits is returned as is, with its fit cached when no font
/// size was stored. Otherwise both halves get freshly computed sizes.
pub fn split_if_oversized(solver: &FontSolver, threshold: u16, block: &Block) -> Vec<Block> {
    let fit = solver.fit(block.text());
    if fit >= threshold {
        let mut unchanged = block.clone();
        if unchanged.font_size().is_none() {
            unchanged.set_font_size(Some(fit));
        }
        return vec![unchanged];
    }

    let separator = line_separator(block.text());
    let mut lines: Vec<Line> = block
        .text()
        .split(separator)
        .map(|line| Line::original(line.to_string()))
        .collect();
    if content_len(&lines) < 2 {
        lines = bisect_oversized(solver, threshold, lines);
    }
    if content_len(&lines) < 2 {
        let mut unchanged = block.clone();
        unchanged.set_font_size(Some(fit));
        return vec![unchanged];
    }

    let second_lines = lines.split_off(split_point(&lines));
    let mut halves = [lines, second_lines];
    for half in halves.iter_mut() {
        if content_len(half) <= 2 && solver.fit(&join(half, separator)) < threshold {
            *half = bisect_oversized(solver, threshold, std::mem::take(half));
        }
    }

    let [first, second] = halves;
    let first_text = format!("{}{}", join(&first, separator), SPLIT_MARKER);
    let second_text = join(&second, separator);

    vec![
        Block::new(first_text.as_str()).with_font_size(solver.fit(&first_text)),
        Block::new(second_text.as_str()).with_font_size(solver.fit(&second_text)),
    ]
}

/// Split every oversized block.
///
/// Does nothing when any block already carries the split marker, since a
/// previous pass has run. Returns the number of blocks that were split.
pub fn split_large_blocks(solver: &FontSolver, threshold: u16, blocks: &mut Vec<Block>) -> usize {
    if blocks.iter().any(Block::is_split_head) {
        return 0;
    }

    let mut split = 0;
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks.drain(..) {
        let parts = split_if_oversized(solver, threshold, &block);
        if parts.len() > 1 {
            split += 1;
        }
        out.extend(parts);
    }
    *blocks = out;
    split
}

/// Merge the split head at `index` with its continuation.
///
/// Returns false (and leaves the blocks alone) when `index` is not a split
/// head or has no following block.
pub fn undo_split_at(solver: &FontSolver, blocks: &mut Vec<Block>, index: usize) -> bool {
    if index + 1 >= blocks.len() || !blocks[index].is_split_head() {
        return false;
    }

    let continuation = blocks.remove(index + 1);
    let head = blocks[index].text_without_split_marker();
    let separator = if head.contains("\r\n") {
        "\r\n"
    } else {
        line_separator(continuation.text())
    };
    let merged = format!("{}{}{}", head, separator, continuation.text());
    let size = solver.fit(&merged);

    let head = &mut blocks[index];
    head.set_text(merged);
    head.set_font_size(Some(size));
    true
}

/// Merge every split pair. Returns the number of merges.
pub fn undo_split_all(solver: &FontSolver, blocks: &mut Vec<Block>) -> usize {
    let mut merged = 0;
    let mut index = 0;
    while index < blocks.len() {
        if undo_split_at(solver, blocks, index) {
            merged += 1;
        }
        index += 1;
    }
    merged
}
