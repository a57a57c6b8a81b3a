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

//! Telnet wire constants
//!
//! Byte values for the Telnet command channel ([RFC854]) and the subset of
//! option codes this engine negotiates, plus the per-option subnegotiation
//! verbs it speaks.
//!
//! [RFC854]: https://tools.ietf.org/html/rfc854

/// Null byte
pub const NUL: u8 = 0;
/// Line Feed
pub const LF: u8 = 10;
/// Carriage Return
pub const CR: u8 = 13;
/// End of Record command [RFC885](https://tools.ietf.org/html/rfc885)
pub const EOR: u8 = 239;
/// Subnegotiation End
pub const SE: u8 = 240;
/// No Operation
pub const NOP: u8 = 241;
/// Go Ahead
pub const GA: u8 = 249;
/// Subnegotiation Begin
pub const SB: u8 = 250;
/// Sender wants to enable an option on its side
pub const WILL: u8 = 251;
/// Sender refuses (or disables) an option on its side
pub const WONT: u8 = 252;
/// Sender wants the peer to enable an option
pub const DO: u8 = 253;
/// Sender wants the peer to disable an option
pub const DONT: u8 = 254;
/// Interpret As Command
pub const IAC: u8 = 255;

/// Telnet option codes negotiated by MUD servers and clients.
pub mod option {
    /// Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    pub const SGA: u8 = 3;
    /// Terminal Type [RFC1091](https://tools.ietf.org/html/rfc1091), carrier
    /// for the [MTTS](https://tintin.mudhalla.net/protocols/mtts/) extension
    pub const TTYPE: u8 = 24;
    /// End of Record option [RFC885](https://tools.ietf.org/html/rfc885)
    pub const EOR: u8 = 25;
    /// Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    pub const NAWS: u8 = 31;
    /// Linemode [RFC1184](https://tools.ietf.org/html/rfc1184)
    pub const LINEMODE: u8 = 34;
    /// Mud New-Environ Standard [MNES](https://tintin.mudhalla.net/protocols/mnes/)
    pub const MNES: u8 = 39;
    /// Charset [RFC2066](https://tools.ietf.org/html/rfc2066)
    pub const CHARSET: u8 = 42;
    /// Mud Server Data Protocol [MSDP](https://tintin.mudhalla.net/protocols/msdp/)
    pub const MSDP: u8 = 69;
    /// Mud Server Status Protocol [MSSP](https://tintin.mudhalla.net/protocols/mssp/)
    pub const MSSP: u8 = 70;
    /// Mud Client Compression Protocol v2 [MCCP](https://tintin.mudhalla.net/protocols/mccp/)
    pub const MCCP2: u8 = 86;
    /// Mud Client Compression Protocol v3, the client-to-server reverse stream
    pub const MCCP3: u8 = 87;
    /// MUD eXtension Protocol [MXP](https://www.zuggsoft.com/zmud/mxp.htm)
    pub const MXP: u8 = 91;
    /// Generic Mud Communication Protocol [GMCP](https://tintin.mudhalla.net/protocols/gmcp/)
    pub const GMCP: u8 = 201;
}

/// Terminal Type subnegotiation verbs [RFC1091](https://tools.ietf.org/html/rfc1091)
pub mod ttype {
    /// The peer reports its terminal type
    pub const IS: u8 = 0;
    /// Ask the peer to report its terminal type
    pub const SEND: u8 = 1;
}

/// Charset subnegotiation verbs [RFC2066](https://tools.ietf.org/html/rfc2066)
pub mod charset {
    /// Offer a space-delimited list of character sets
    pub const REQUEST: u8 = 1;
    /// The peer accepted one of the offered character sets
    pub const ACCEPTED: u8 = 2;
    /// The peer rejected every offered character set
    pub const REJECTED: u8 = 3;
}

/// MSSP key/value pair markers
pub mod mssp {
    /// Prefixes a variable name
    pub const VAR: u8 = 1;
    /// Prefixes a variable value
    pub const VAL: u8 = 2;
}
