// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song file text handling.

pub mod encoding;

pub use encoding::{detect, read_text, TextEncoding};
