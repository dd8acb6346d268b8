// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Byte-order-mark detection and decoding of song files.
//!
//! Only the first bytes of a file are inspected. Files without a
//! recognised mark are decoded with Windows-1251, a fixed table, so the
//! result never depends on the locale of the host.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1251};

use crate::error::{Result, SongError};

/// Number of leading bytes inspected for a byte-order mark
pub const SNIFF_LEN: usize = 5;

/// Text encoding of a song file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 with `EF BB BF`
    Utf8,
    /// UTF-16 big-endian with `FE FF`
    Utf16Be,
    /// UTF-32 big-endian with `00 00 FE FF`
    Utf32,
    /// UTF-7 with `2B 2F 76`
    Utf7,
    /// UTF-16 little-endian with `FF FE`
    Utf16Le,
    /// No mark: legacy Cyrillic code page (Windows-1251)
    Cyrillic,
}

impl TextEncoding {
    /// Match the leading bytes against the known byte-order marks.
    ///
    /// The checks run in a fixed order; bytes past the end of `head`
    /// simply fail to match.
    pub fn sniff(head: &[u8]) -> Self {
        if head.starts_with(&[0xEF, 0xBB, 0xBF]) {
            TextEncoding::Utf8
        } else if head.starts_with(&[0xFE, 0xFF]) {
            TextEncoding::Utf16Be
        } else if head.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
            TextEncoding::Utf32
        } else if head.starts_with(&[0x2B, 0x2F, 0x76]) {
            TextEncoding::Utf7
        } else if head.starts_with(&[0xFF, 0xFE]) {
            TextEncoding::Utf16Le
        } else {
            TextEncoding::Cyrillic
        }
    }

    /// Length of the byte-order mark for this encoding
    pub fn bom_len(&self) -> usize {
        match self {
            TextEncoding::Utf8 => 3,
            TextEncoding::Utf16Be | TextEncoding::Utf16Le => 2,
            TextEncoding::Utf32 => 4,
            // The UTF-7 mark is decoded as U+FEFF and dropped afterwards
            TextEncoding::Utf7 => 0,
            TextEncoding::Cyrillic => 0,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Utf32 => "UTF-32BE",
            TextEncoding::Utf7 => "UTF-7",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Cyrillic => "windows-1251",
        }
    }

    /// Decode a whole file body. Malformed sequences become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let body = bytes.get(self.bom_len()..).unwrap_or(&[]);
        let text = match self {
            TextEncoding::Utf8 => UTF_8.decode_without_bom_handling(body).0.into_owned(),
            TextEncoding::Utf16Be => UTF_16BE.decode_without_bom_handling(body).0.into_owned(),
            TextEncoding::Utf16Le => UTF_16LE.decode_without_bom_handling(body).0.into_owned(),
            TextEncoding::Utf32 => decode_utf32_be(body),
            TextEncoding::Utf7 => decode_utf7(body),
            TextEncoding::Cyrillic => WINDOWS_1251.decode_without_bom_handling(body).0.into_owned(),
        };
        match text.strip_prefix('\u{FEFF}') {
            Some(rest) => rest.to_string(),
            None => text,
        }
    }
}

/// Detect the encoding of a file from its first bytes
pub fn detect<P: AsRef<Path>>(path: P) -> Result<TextEncoding> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| SongError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut head = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match file.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(SongError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    Ok(TextEncoding::sniff(&head[..filled]))
}

/// Read a whole file and decode it with the detected encoding
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<(TextEncoding, String)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| SongError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let encoding = TextEncoding::sniff(&bytes[..bytes.len().min(SNIFF_LEN)]);
    Ok((encoding, encoding.decode(&bytes)))
}

fn decode_utf32_be(bytes: &[u8]) -> String {
    bytes
        .chunks(4)
        .map(|chunk| {
            if chunk.len() < 4 {
                return char::REPLACEMENT_CHARACTER;
            }
            let value = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}

fn base64_value(byte: u8) -> Option<u32> {
    match byte {
        b'A'..=b'Z' => Some((byte - b'A') as u32),
        b'a'..=b'z' => Some((byte - b'a') as u32 + 26),
        b'0'..=b'9' => Some((byte - b'0') as u32 + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// RFC 2152 decoder. Shifted runs are modified base64 of UTF-16 code units.
fn decode_utf7(bytes: &[u8]) -> String {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if byte != b'+' {
            units.push(byte as u16);
            i += 1;
            continue;
        }

        i += 1;
        if bytes.get(i) == Some(&b'-') {
            units.push(b'+' as u16);
            i += 1;
            continue;
        }

        let mut bits: u32 = 0;
        let mut bit_count: u32 = 0;
        while let Some(value) = bytes.get(i).and_then(|&b| base64_value(b)) {
            bits = (bits << 6) | value;
            bit_count += 6;
            if bit_count >= 16 {
                bit_count -= 16;
                units.push((bits >> bit_count) as u16);
                bits &= (1 << bit_count) - 1;
            }
            i += 1;
        }
        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
    }

    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_byte_order_marks() {
        assert_eq!(TextEncoding::sniff(&[0xEF, 0xBB, 0xBF, b'a', b'b']), TextEncoding::Utf8);
        assert_eq!(TextEncoding::sniff(&[0xFE, 0xFF, 0x00, 0x41, 0x00]), TextEncoding::Utf16Be);
        assert_eq!(TextEncoding::sniff(&[0x00, 0x00, 0xFE, 0xFF, 0x00]), TextEncoding::Utf32);
        assert_eq!(TextEncoding::sniff(b"+/v8-"), TextEncoding::Utf7);
        assert_eq!(TextEncoding::sniff(&[0xFF, 0xFE, 0x41, 0x00, 0x42]), TextEncoding::Utf16Le);
    }

    #[test]
    fn test_sniff_falls_back_to_cyrillic() {
        assert_eq!(TextEncoding::sniff(b"@01#0"), TextEncoding::Cyrillic);
        assert_eq!(TextEncoding::sniff(&[]), TextEncoding::Cyrillic);
        assert_eq!(TextEncoding::sniff(&[0xEF, 0xBB]), TextEncoding::Cyrillic);
    }

    #[test]
    fn test_decode_cyrillic_fallback() {
        // "Слава" in Windows-1251
        let bytes = [0xD1, 0xEB, 0xE0, 0xE2, 0xE0];
        assert_eq!(TextEncoding::Cyrillic.decode(&bytes), "Слава");
    }

    #[test]
    fn test_decode_utf8_strips_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Аллилуйя".as_bytes());
        assert_eq!(TextEncoding::Utf8.decode(&bytes), "Аллилуйя");
    }

    #[test]
    fn test_decode_utf16_variants() {
        let le = [0xFF, 0xFE, b'H', 0x00, b'i', 0x00];
        assert_eq!(TextEncoding::Utf16Le.decode(&le), "Hi");

        let be = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(TextEncoding::Utf16Be.decode(&be), "Hi");
    }

    #[test]
    fn test_decode_utf32() {
        let bytes = [0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00, 0x04, 0x10, 0x00, 0x00, 0x00, 0x21];
        assert_eq!(TextEncoding::Utf32.decode(&bytes), "А!");
    }

    #[test]
    fn test_decode_utf7() {
        assert_eq!(TextEncoding::Utf7.decode(b"+/v8-Hi Mom -+Jjo--!"), "Hi Mom -\u{263A}-!");
        assert_eq!(TextEncoding::Utf7.decode(b"+/v8-1 +- 1"), "1 + 1");
    }

    #[test]
    fn test_detect_reads_file_head() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.txt");
        fs::write(&path, [0xFF, 0xFE, b'a', 0x00]).unwrap();

        assert_eq!(detect(&path).unwrap(), TextEncoding::Utf16Le);
    }

    #[test]
    fn test_detect_missing_file_is_unreadable() {
        let dir = tempdir().unwrap();
        let result = detect(dir.path().join("missing.txt"));
        assert!(matches!(result, Err(SongError::Unreadable { .. })));
    }

    #[test]
    fn test_read_text_short_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.txt");
        fs::write(&path, b"ab").unwrap();

        let (encoding, text) = read_text(&path).unwrap();
        assert_eq!(encoding, TextEncoding::Cyrillic);
        assert_eq!(text, "ab");
    }
}
