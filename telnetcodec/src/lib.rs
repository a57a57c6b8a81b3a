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

//! # Mudlink Telnet Frame Codec
//!
//! The wire layer of the mudlink engine: it turns raw bytes into
//! [`TelnetFrame`] values and frames back into bytes, and nothing else.
//! Option negotiation policy, capability tracking, and compression live in
//! `mudlink-engine`; this crate only understands the RFC 854 framing rules.
//!
//! ## Frames
//!
//! The Telnet stream decomposes into four frame kinds:
//!
//! - **Data**: contiguous application bytes, with `IAC IAC` unescaped to a
//!   single `0xFF`
//! - **Command**: `IAC <cmd>` two-byte sequences such as `NOP` or `GA`
//! - **Negotiation**: `IAC <WILL|WONT|DO|DONT> <option>`
//! - **Subnegotiation**: `IAC SB <option> <payload> IAC SE` with escaped
//!   payload bytes
//!
//! ## Two ways in
//!
//! [`parser::parse`] is a pure incremental function over a borrowed buffer:
//! `(bytes) -> (consumed, frame?)`. The protocol engine drives it directly
//! because it must own the buffer (MCCP3 replaces the buffer's contents when
//! compression starts mid-stream).
//!
//! [`TelnetCodec`] wraps the same parser in the
//! [`tokio_util::codec::Decoder`]/[`Encoder`](tokio_util::codec::Encoder)
//! traits for hosts that want `Framed<TcpStream, TelnetCodec>` without an
//! engine.
//!
//! ```
//! use mudlink_telnetcodec::{TelnetFrame, TelnetOption, parser};
//!
//! let wire = [0xFFu8, 0xFB, 86]; // IAC WILL MCCP2
//! let (consumed, frame) = parser::parse(&wire);
//! assert_eq!(consumed, 3);
//! assert_eq!(frame, Some(TelnetFrame::Will(TelnetOption::MCCP2)));
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod codec;
pub mod consts;
mod frame;
mod options;
pub mod parser;
mod result;

pub use self::codec::{DEFAULT_MAX_SUBNEGOTIATION_LEN, TelnetCodec};
pub use self::frame::{NegotiationVerb, TelnetFrame};
pub use self::options::TelnetOption;
pub use self::result::{CodecError, CodecResult};

#[cfg(test)]
mod tests {
    use super::{TelnetFrame, TelnetOption, consts, parser};
    use bytes::Bytes;

    #[test]
    fn frames_survive_serialize_then_parse() {
        let frames = vec![
            TelnetFrame::Data(Bytes::from_static(b"look north")),
            TelnetFrame::Data(Bytes::from_static(&[consts::IAC])),
            TelnetFrame::Command(consts::NOP),
            TelnetFrame::Will(TelnetOption::GMCP),
            TelnetFrame::Dont(TelnetOption::Unknown(200)),
            TelnetFrame::Subnegotiate(TelnetOption::Charset, Bytes::from_static(b"\x02utf-8")),
        ];
        for frame in frames {
            let wire = frame.to_bytes();
            let (consumed, parsed) = parser::parse(&wire);
            assert_eq!(consumed, wire.len(), "consumed full wire form");
            assert_eq!(parsed, Some(frame));
        }
    }
}
