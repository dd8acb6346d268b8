// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! A single displayable block of song text.

/// Trailing token on the first half of a split block
pub const SPLIT_MARKER: &str = " =>";

/// Line appended to the last block of a song
pub const END_MARKER: &str = "* * *";

/// One verse, refrain instance or split fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Text, possibly spanning several lines
    text: String,
    /// Stored font size (None = compute on demand)
    font_size: Option<u16>,
}

impl Block {
    /// Create a block without a stored font size
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: None,
        }
    }

    /// Builder: set font size. Zero is treated as unset.
    pub fn with_font_size(mut self, size: u16) -> Self {
        self.set_font_size(Some(size));
        self
    }

    /// Get text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Get stored font size
    pub fn font_size(&self) -> Option<u16> {
        self.font_size
    }

    /// Set stored font size
    pub fn set_font_size(&mut self, size: Option<u16>) {
        self.font_size = size.filter(|&s| s > 0);
    }

    /// Whether this block is the first half of a split pair
    pub fn is_split_head(&self) -> bool {
        self.text.ends_with(SPLIT_MARKER)
    }

    /// Text with the split marker removed, if present
    pub fn text_without_split_marker(&self) -> &str {
        self.text.strip_suffix(SPLIT_MARKER).unwrap_or(&self.text)
    }

    /// Whether the text ends with a run of `*` groups
    pub fn has_end_marker(&self) -> bool {
        strip_end_marker(&self.text).len() != self.text.trim_end().len()
    }

    /// Non-empty display lines. `#`, CR and LF all break lines.
    pub fn display_lines(&self) -> Vec<&str> {
        display_lines(&self.text)
    }
}

/// Split text into non-empty display lines
pub fn display_lines(text: &str) -> Vec<&str> {
    text.split(&['#', '\r', '\n'][..])
        .filter(|line| !line.is_empty())
        .collect()
}

/// Line break used by `text`: CRLF if it has any, otherwise LF
pub fn line_separator(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Remove a trailing run of `*` groups (and surrounding whitespace)
pub fn strip_end_marker(text: &str) -> &str {
    let mut rest = text.trim_end();
    while let Some(stripped) = rest.strip_suffix('*') {
        rest = stripped.trim_end_matches('*').trim_end();
    }
    rest
}

/// Append the end marker unless the text already ends with one
pub fn with_end_marker(text: &str) -> String {
    if strip_end_marker(text).len() != text.trim_end().len() {
        return text.to_string();
    }
    format!("{}{}{}", text.trim_end(), line_separator(text), END_MARKER)
}
