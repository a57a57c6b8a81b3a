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

//! # MCCP Stream Transformers
//!
//! Byte-level transformer pipelines for the mudlink engine. MCCP2 compresses
//! the server-to-client direction and MCCP3 decompresses the client-to-server
//! direction; both activate mid-stream, so the transformers here operate on
//! owned byte chunks rather than wrapping a whole `AsyncRead`/`AsyncWrite`.
//!
//! The engine keeps two ordered chains: every outbound chunk passes through
//! each installed [`OutboundTransform`] in insertion order before leaving the
//! engine, and every inbound read passes through each [`InboundTransform`]
//! before entering the parse buffer.
//!
//! ## Wire compatibility
//!
//! [`ZlibDeflater`] ends every write with a zlib sync flush, which is what
//! MUD clients expect from an MCCP2 stream: each chunk the server sends is
//! decodable the moment it arrives, with no buffered tail. [`ZlibInflater`]
//! consumes a stream produced the same way, reports the zlib stream end so
//! its owner can uninstall it, and passes any bytes after the stream end
//! through untouched.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use thiserror::Error;

/// Output buffer growth increment for the zlib loops.
const CHUNK: usize = 4096;

/// Result type for transformer operations
pub type TransformResult<T> = std::result::Result<T, TransformError>;

/// Errors raised by a stream transformer.
///
/// A transformer must never drop bytes silently: a failure here is reported
/// to the owning option handler, which disables itself and notifies the peer.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The outbound compressor rejected its input
    #[error("compression failed: {0}")]
    Compress(String),

    /// The inbound decompressor could not make sense of the stream
    #[error("decompression failed: {0}")]
    Decompress(String),
}

/// A stateful transformer applied to bytes leaving the engine.
pub trait OutboundTransform: Send {
    /// Transforms one outbound chunk, returning the bytes to put on the wire.
    fn transform_out(&mut self, input: &[u8]) -> TransformResult<Vec<u8>>;
}

/// A stateful transformer applied to bytes arriving from the transport.
pub trait InboundTransform: Send {
    /// Transforms one inbound chunk.
    fn transform_in(&mut self, input: &[u8]) -> TransformResult<Inflated>;
}

/// The outcome of one inbound transformation.
#[derive(Debug, PartialEq, Eq)]
pub struct Inflated {
    /// The transformed bytes, ready for the parse buffer
    pub bytes: Vec<u8>,
    /// True once the underlying stream terminated; the owner should
    /// uninstall the transformer. Bytes past the terminator are passed
    /// through raw in `bytes`.
    pub finished: bool,
}

///
/// The MCCP2 outbound compressor: a level-9 zlib deflate context that sync
/// flushes after every write, so the receiving client can inflate each chunk
/// as it arrives.
///
pub struct ZlibDeflater {
    ctx: Compress,
}

impl ZlibDeflater {
    /// Creates a fresh compression context at the maximum level, as MCCP
    /// servers conventionally do.
    pub fn new() -> ZlibDeflater {
        ZlibDeflater {
            ctx: Compress::new(Compression::best(), true),
        }
    }
}

impl Default for ZlibDeflater {
    fn default() -> Self {
        ZlibDeflater::new()
    }
}

impl OutboundTransform for ZlibDeflater {
    fn transform_out(&mut self, input: &[u8]) -> TransformResult<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() + 64);
        let mut consumed = 0usize;
        loop {
            if out.len() == out.capacity() {
                out.reserve(CHUNK);
            }
            let before_in = self.ctx.total_in();
            self.ctx
                .compress_vec(&input[consumed..], &mut out, FlushCompress::Sync)
                .map_err(|err| TransformError::Compress(err.to_string()))?;
            consumed += usize::try_from(self.ctx.total_in() - before_in)
                .map_err(|err| TransformError::Compress(err.to_string()))?;
            // The sync flush is complete once all input is consumed and
            // deflate still had spare output room.
            if consumed >= input.len() && out.len() < out.capacity() {
                return Ok(out);
            }
        }
    }
}

///
/// The MCCP3 inbound decompressor: an incremental zlib inflate context fed
/// from socket reads (and, at activation, from the residue of the parse
/// buffer).
///
pub struct ZlibInflater {
    ctx: Decompress,
    finished: bool,
}

impl ZlibInflater {
    /// Creates a fresh decompression context expecting a zlib header.
    pub fn new() -> ZlibInflater {
        ZlibInflater {
            ctx: Decompress::new(true),
            finished: false,
        }
    }

    /// True once the peer terminated its compressed stream.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total compressed bytes consumed and plain bytes produced so far.
    pub fn totals(&self) -> (u64, u64) {
        (self.ctx.total_in(), self.ctx.total_out())
    }
}

impl Default for ZlibInflater {
    fn default() -> Self {
        ZlibInflater::new()
    }
}

impl InboundTransform for ZlibInflater {
    fn transform_in(&mut self, input: &[u8]) -> TransformResult<Inflated> {
        if self.finished {
            // Stream already over; hand bytes through untouched.
            return Ok(Inflated {
                bytes: input.to_vec(),
                finished: true,
            });
        }
        let mut out = Vec::with_capacity(input.len().saturating_mul(2).max(64));
        let mut consumed = 0usize;
        while consumed < input.len() {
            if out.len() == out.capacity() {
                out.reserve(CHUNK);
            }
            let before_in = self.ctx.total_in();
            let before_out = self.ctx.total_out();
            let status = self
                .ctx
                .decompress_vec(&input[consumed..], &mut out, FlushDecompress::None)
                .map_err(|err| TransformError::Decompress(err.to_string()))?;
            let used = usize::try_from(self.ctx.total_in() - before_in)
                .map_err(|err| TransformError::Decompress(err.to_string()))?;
            let produced = usize::try_from(self.ctx.total_out() - before_out)
                .map_err(|err| TransformError::Decompress(err.to_string()))?;
            consumed += used;
            if status == Status::StreamEnd {
                self.finished = true;
                // Anything after the zlib trailer is plain again.
                out.extend_from_slice(&input[consumed..]);
                return Ok(Inflated {
                    bytes: out,
                    finished: true,
                });
            }
            if used == 0 && produced == 0 && out.len() < out.capacity() {
                // Inflate wants more input than we have; a partial chunk is
                // normal for a streaming peer.
                break;
            }
        }
        Ok(Inflated {
            bytes: out,
            finished: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inflate_all(inflater: &mut ZlibInflater, chunks: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(inflater.transform_in(chunk).expect("inflate ok").bytes);
        }
        out
    }

    #[test]
    fn each_write_is_immediately_decodable() {
        let mut deflater = ZlibDeflater::new();
        let mut inflater = ZlibInflater::new();

        // Sync flush means the client sees each chunk whole, without waiting
        // for later writes.
        let first = deflater.transform_out(b"You wake up.\r\n").unwrap();
        assert_eq!(inflate_all(&mut inflater, &[&first]), b"You wake up.\r\n");

        let second = deflater.transform_out(b"It is dark here.\r\n").unwrap();
        assert_eq!(
            inflate_all(&mut inflater, &[&second]),
            b"It is dark here.\r\n"
        );
    }

    #[test]
    fn empty_write_still_produces_a_flush_marker() {
        let mut deflater = ZlibDeflater::new();
        let out = deflater.transform_out(b"").unwrap();
        // The first write carries the zlib header plus the empty sync block.
        assert!(!out.is_empty());
        let mut inflater = ZlibInflater::new();
        assert_eq!(inflate_all(&mut inflater, &[&out]), b"");
    }

    #[test]
    fn inflater_handles_split_input() {
        let mut deflater = ZlibDeflater::new();
        let wire = deflater
            .transform_out(b"a longer line of repetitive text text text text")
            .unwrap();
        let mut inflater = ZlibInflater::new();
        let mid = wire.len() / 2;
        let out = inflate_all(&mut inflater, &[&wire[..mid], &wire[mid..]]);
        assert_eq!(out, b"a longer line of repetitive text text text text");
        assert!(!inflater.is_finished());
    }

    #[test]
    fn stream_end_reports_finished_and_passes_trailing_bytes() {
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"the end").unwrap();
        let mut wire = encoder.finish().unwrap();
        wire.extend_from_slice(b"plain tail");

        let mut inflater = ZlibInflater::new();
        let result = inflater.transform_in(&wire).unwrap();
        assert!(result.finished);
        assert_eq!(result.bytes, b"the endplain tail");
        assert!(inflater.is_finished());

        // Further chunks pass through raw.
        let more = inflater.transform_in(b"more").unwrap();
        assert_eq!(more.bytes, b"more");
        assert!(more.finished);
    }

    #[test]
    fn garbage_input_is_an_error() {
        let mut inflater = ZlibInflater::new();
        assert!(inflater.transform_in(&[0x00, 0x01, 0x02, 0x03]).is_err());
    }

    #[test]
    fn large_payload_round_trips() {
        let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        let mut deflater = ZlibDeflater::new();
        let wire = deflater.transform_out(&payload).unwrap();
        let mut inflater = ZlibInflater::new();
        let out = inflate_all(&mut inflater, &[&wire]);
        assert_eq!(out, payload);
    }
}
