//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Outbound line canonicalization and inbound text decoding

/// Canonicalizes line endings for the wire: every `\n` becomes `\r\n`,
/// existing `\r\n` pairs pass through, and an isolated `\r` is preserved.
/// Runs of consecutive `\r` collapse to one.
pub fn ensure_crlf(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    let mut prev_was_cr = false;
    for ch in input.chars() {
        match ch {
            '\r' => {
                if !prev_was_cr {
                    out.push('\r');
                }
                prev_was_cr = true;
            }
            '\n' => {
                if !prev_was_cr {
                    out.push('\r');
                }
                out.push('\n');
                prev_was_cr = false;
            }
            ch => {
                out.push(ch);
                prev_was_cr = false;
            }
        }
    }
    out
}

/// The character encoding used to decode inbound lines.
///
/// Fixed at engine construction. Decoding is lossy in the skip sense:
/// undecodable bytes are dropped, never replaced with a substitute
/// character.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextEncoding {
    /// UTF-8, the sensible default
    #[default]
    Utf8,
    /// Strict 7-bit ASCII; high bytes are dropped
    Ascii,
    /// ISO-8859-1; every byte maps to a character
    Latin1,
}

impl TextEncoding {
    /// Decodes bytes, silently skipping anything invalid in this encoding.
    pub fn decode_lossy(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => {
                let mut out = String::with_capacity(bytes.len());
                for chunk in bytes.utf8_chunks() {
                    out.push_str(chunk.valid());
                }
                out
            }
            TextEncoding::Ascii => bytes
                .iter()
                .filter(|byte| byte.is_ascii())
                .map(|byte| *byte as char)
                .collect(),
            TextEncoding::Latin1 => bytes.iter().map(|byte| *byte as char).collect(),
        }
    }
}
