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

use crate::{CodecError, TelnetFrame, consts, parser};
use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Default ceiling on an unterminated subnegotiation before the decoder
/// gives up on the stream.
pub const DEFAULT_MAX_SUBNEGOTIATION_LEN: usize = 64 * 1024;

/// A [`tokio_util::codec`] adapter over the incremental frame parser, for
/// hosts that drive a socket with `Framed<TcpStream, TelnetCodec>` rather
/// than owning the parse buffer themselves.
///
/// The protocol engine does not use this type: it calls [`parser::parse`]
/// directly because MCCP3 activation must replace the parse buffer
/// mid-stream, which `Framed` ownership would prevent.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use mudlink_telnetcodec::{TelnetCodec, TelnetFrame, TelnetOption};
/// use tokio_util::codec::Decoder;
///
/// let mut codec = TelnetCodec::new();
/// let mut input = BytesMut::from(&[0xFF, 0xFD, 3][..]); // IAC DO SGA
/// let frame = codec.decode(&mut input).unwrap();
/// assert_eq!(frame, Some(TelnetFrame::Do(TelnetOption::SuppressGoAhead)));
/// ```
#[derive(Debug)]
pub struct TelnetCodec {
    max_subnegotiation_len: usize,
}

impl TelnetCodec {
    /// Creates a codec with the default subnegotiation size limit.
    pub fn new() -> TelnetCodec {
        TelnetCodec::default()
    }

    /// Creates a codec with a custom ceiling on unterminated
    /// subnegotiations.
    pub fn with_max_subnegotiation_len(limit: usize) -> TelnetCodec {
        TelnetCodec {
            max_subnegotiation_len: limit,
        }
    }
}

impl Default for TelnetCodec {
    fn default() -> Self {
        TelnetCodec {
            max_subnegotiation_len: DEFAULT_MAX_SUBNEGOTIATION_LEN,
        }
    }
}

impl Decoder for TelnetCodec {
    type Item = TelnetFrame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetFrame>, Self::Error> {
        let (consumed, frame) = parser::parse(&src[..]);
        if let Some(frame) = frame {
            src.advance(consumed);
            return Ok(Some(frame));
        }
        // A peer that opens IAC SB and never sends IAC SE would otherwise
        // grow the buffer forever.
        if src.len() > self.max_subnegotiation_len.max(2)
            && src.starts_with(&[consts::IAC, consts::SB])
        {
            let option = src[2];
            warn!(
                option,
                limit = self.max_subnegotiation_len,
                "unterminated subnegotiation exceeded limit"
            );
            return Err(CodecError::SubnegotiationOverflow {
                option,
                limit: self.max_subnegotiation_len,
            });
        }
        Ok(None)
    }
}

impl Encoder<TelnetFrame> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.serialize(dst);
        Ok(())
    }
}
