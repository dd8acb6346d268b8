// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Navigation cursor over a song's blocks.

/// Position of the cursor. Block numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Song has no blocks
    #[default]
    Empty,
    /// On block `k`, `1 <= k <= count`
    Positioned(usize),
    /// One past the last block
    PastEnd,
}

impl Cursor {
    /// Cursor on the first block, or Empty
    pub fn first(count: usize) -> Self {
        if count == 0 {
            Cursor::Empty
        } else {
            Cursor::Positioned(1)
        }
    }

    /// Advance one block. Moving off the last block enters PastEnd;
    /// PastEnd stays put.
    pub fn next(self, count: usize) -> Self {
        match self {
            Cursor::Empty => Cursor::first(count),
            Cursor::Positioned(k) if k < count => Cursor::Positioned(k + 1),
            Cursor::Positioned(_) | Cursor::PastEnd => Cursor::PastEnd,
        }
    }

    /// Step back one block, stopping at the first
    pub fn previous(self, count: usize) -> Self {
        match self {
            Cursor::Empty => Cursor::first(count),
            Cursor::Positioned(k) => Cursor::Positioned(k.saturating_sub(1).max(1)),
            Cursor::PastEnd if count > 0 => Cursor::Positioned(count),
            Cursor::PastEnd => Cursor::Empty,
        }
    }

    /// Re-validate against a changed block count
    pub fn clamp(self, count: usize) -> Self {
        match self {
            _ if count == 0 => Cursor::Empty,
            Cursor::Empty => Cursor::Positioned(1),
            Cursor::Positioned(k) if k > count => Cursor::Positioned(count),
            other => other,
        }
    }

    /// Jump to block `k`, clamped into range
    pub fn goto(k: usize, count: usize) -> Self {
        if count == 0 {
            Cursor::Empty
        } else if k > count {
            Cursor::PastEnd
        } else {
            Cursor::Positioned(k.max(1))
        }
    }

    /// Number in the public `[0, count + 1]` scheme
    pub fn number(self, count: usize) -> usize {
        match self {
            Cursor::Empty => 0,
            Cursor::Positioned(k) => k,
            Cursor::PastEnd => count + 1,
        }
    }

    /// Whether the cursor is past the last block
    pub fn is_end(self) -> bool {
        self == Cursor::PastEnd
    }
}
