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

use crate::{TelnetOption, consts};
use bytes::{BufMut, Bytes, BytesMut};

///
/// One parsed unit of the Telnet stream.
///
/// Everything a peer can say decomposes into application data, a two-byte
/// command, a three-byte negotiation, or an `IAC SB … IAC SE` subnegotiation
/// block. Payload bytes held here are already unescaped: a literal `0xFF`
/// appears once, never as the doubled `IAC IAC` wire form.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetFrame {
    /// A contiguous run of application bytes containing no command sequence
    Data(Bytes),
    /// `IAC <command>` where the command is not a negotiation verb or SB
    Command(u8),
    /// `IAC WILL <option>`
    Will(TelnetOption),
    /// `IAC WONT <option>`
    Wont(TelnetOption),
    /// `IAC DO <option>`
    Do(TelnetOption),
    /// `IAC DONT <option>`
    Dont(TelnetOption),
    /// `IAC SB <option> <payload> IAC SE` with the payload unescaped
    Subnegotiate(TelnetOption, Bytes),
}

/// The four option negotiation verbs of [RFC855](https://tools.ietf.org/html/rfc855).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NegotiationVerb {
    /// Sender offers to perform the option
    Will,
    /// Sender refuses to perform the option
    Wont,
    /// Sender asks the peer to perform the option
    Do,
    /// Sender asks the peer to stop performing the option
    Dont,
}

impl NegotiationVerb {
    /// Returns the wire byte for this verb.
    pub fn to_u8(self) -> u8 {
        match self {
            NegotiationVerb::Will => consts::WILL,
            NegotiationVerb::Wont => consts::WONT,
            NegotiationVerb::Do => consts::DO,
            NegotiationVerb::Dont => consts::DONT,
        }
    }

    /// Maps a wire byte to a verb, if it is one.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            consts::WILL => Some(NegotiationVerb::Will),
            consts::WONT => Some(NegotiationVerb::Wont),
            consts::DO => Some(NegotiationVerb::Do),
            consts::DONT => Some(NegotiationVerb::Dont),
            _ => None,
        }
    }
}

impl std::fmt::Display for NegotiationVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationVerb::Will => write!(f, "WILL"),
            NegotiationVerb::Wont => write!(f, "WONT"),
            NegotiationVerb::Do => write!(f, "DO"),
            NegotiationVerb::Dont => write!(f, "DONT"),
        }
    }
}

impl TelnetFrame {
    /// Builds the negotiation frame for a verb and option pair.
    pub fn negotiate(verb: NegotiationVerb, option: TelnetOption) -> TelnetFrame {
        match verb {
            NegotiationVerb::Will => TelnetFrame::Will(option),
            NegotiationVerb::Wont => TelnetFrame::Wont(option),
            NegotiationVerb::Do => TelnetFrame::Do(option),
            NegotiationVerb::Dont => TelnetFrame::Dont(option),
        }
    }

    /// The option a negotiation or subnegotiation frame refers to.
    pub fn option(&self) -> Option<TelnetOption> {
        match self {
            TelnetFrame::Will(option)
            | TelnetFrame::Wont(option)
            | TelnetFrame::Do(option)
            | TelnetFrame::Dont(option)
            | TelnetFrame::Subnegotiate(option, _) => Some(*option),
            TelnetFrame::Data(_) | TelnetFrame::Command(_) => None,
        }
    }

    /// Number of bytes [`TelnetFrame::serialize`] will append, escaping
    /// included.
    pub fn wire_len(&self) -> usize {
        match self {
            TelnetFrame::Data(data) => data.len() + count_iac(data),
            TelnetFrame::Command(_) => 2,
            TelnetFrame::Will(_)
            | TelnetFrame::Wont(_)
            | TelnetFrame::Do(_)
            | TelnetFrame::Dont(_) => 3,
            TelnetFrame::Subnegotiate(_, payload) => 5 + payload.len() + count_iac(payload),
        }
    }

    /// Appends the wire form of this frame to `dst`.
    ///
    /// Any `0xFF` inside data or a subnegotiation payload is doubled to
    /// `IAC IAC` so the result parses back to an identical frame.
    pub fn serialize(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_len());
        match self {
            TelnetFrame::Data(data) => {
                put_escaped(dst, data);
            }
            TelnetFrame::Command(command) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(*command);
            }
            TelnetFrame::Will(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::WILL);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Wont(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::WONT);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Do(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::DO);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Dont(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::DONT);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Subnegotiate(option, payload) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SB);
                dst.put_u8(option.to_u8());
                put_escaped(dst, payload);
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SE);
            }
        }
    }

    /// Serializes into a fresh buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.wire_len());
        self.serialize(&mut dst);
        dst.freeze()
    }
}

fn count_iac(bytes: &[u8]) -> usize {
    bytes.iter().filter(|byte| **byte == consts::IAC).count()
}

fn put_escaped(dst: &mut BytesMut, bytes: &[u8]) {
    for byte in bytes {
        if *byte == consts::IAC {
            dst.put_u8(consts::IAC);
        }
        dst.put_u8(*byte);
    }
}
