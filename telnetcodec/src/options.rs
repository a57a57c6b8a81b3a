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

use crate::consts;
use std::fmt::Formatter;

///
/// The Telnet options this engine knows how to negotiate. MUDs use a small,
/// stable subset of the [IANA registry](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
/// plus a family of community extensions; anything else passes through as
/// [`TelnetOption::Unknown`] and receives the polite refusal.
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// [`consts::option::SGA`] Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead,
    /// [`consts::option::TTYPE`] Terminal Type [RFC1091](https://tools.ietf.org/html/rfc1091),
    /// probed in stages per the [MTTS](https://tintin.mudhalla.net/protocols/mtts/) extension
    TerminalType,
    /// [`consts::option::EOR`] End of Record [RFC885](https://tools.ietf.org/html/rfc885)
    EndOfRecord,
    /// [`consts::option::NAWS`] Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    NAWS,
    /// [`consts::option::LINEMODE`] Linemode [RFC1184](https://tools.ietf.org/html/rfc1184)
    Linemode,
    /// [`consts::option::MNES`] Mud New-Environ Standard
    MNES,
    /// [`consts::option::CHARSET`] Charset [RFC2066](https://tools.ietf.org/html/rfc2066)
    Charset,
    /// [`consts::option::MSDP`] Mud Server Data Protocol
    MSDP,
    /// [`consts::option::MSSP`] Mud Server Status Protocol
    MSSP,
    /// [`consts::option::MCCP2`] Mud Client Compression Protocol v2 (server to client)
    MCCP2,
    /// [`consts::option::MCCP3`] Mud Client Compression Protocol v3 (client to server)
    MCCP3,
    /// [`consts::option::MXP`] MUD eXtension Protocol
    MXP,
    /// [`consts::option::GMCP`] Generic Mud Communication Protocol
    GMCP,
    /// Any option code without dedicated handling
    Unknown(u8),
}

impl TelnetOption {
    /// Returns the wire code for this option.
    pub fn to_u8(self) -> u8 {
        match self {
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::TerminalType => consts::option::TTYPE,
            TelnetOption::EndOfRecord => consts::option::EOR,
            TelnetOption::NAWS => consts::option::NAWS,
            TelnetOption::Linemode => consts::option::LINEMODE,
            TelnetOption::MNES => consts::option::MNES,
            TelnetOption::Charset => consts::option::CHARSET,
            TelnetOption::MSDP => consts::option::MSDP,
            TelnetOption::MSSP => consts::option::MSSP,
            TelnetOption::MCCP2 => consts::option::MCCP2,
            TelnetOption::MCCP3 => consts::option::MCCP3,
            TelnetOption::MXP => consts::option::MXP,
            TelnetOption::GMCP => consts::option::GMCP,
            TelnetOption::Unknown(byte) => byte,
        }
    }

    /// Maps a wire code to the matching option, or [`TelnetOption::Unknown`]
    /// for any code without a named variant.
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::TTYPE => TelnetOption::TerminalType,
            consts::option::EOR => TelnetOption::EndOfRecord,
            consts::option::NAWS => TelnetOption::NAWS,
            consts::option::LINEMODE => TelnetOption::Linemode,
            consts::option::MNES => TelnetOption::MNES,
            consts::option::CHARSET => TelnetOption::Charset,
            consts::option::MSDP => TelnetOption::MSDP,
            consts::option::MSSP => TelnetOption::MSSP,
            consts::option::MCCP2 => TelnetOption::MCCP2,
            consts::option::MCCP3 => TelnetOption::MCCP3,
            consts::option::MXP => TelnetOption::MXP,
            consts::option::GMCP => TelnetOption::GMCP,
            byte => TelnetOption::Unknown(byte),
        }
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::SuppressGoAhead => write!(f, "SuppressGoAhead"),
            TelnetOption::TerminalType => write!(f, "TerminalType"),
            TelnetOption::EndOfRecord => write!(f, "EndOfRecord"),
            TelnetOption::NAWS => write!(f, "NAWS"),
            TelnetOption::Linemode => write!(f, "Linemode"),
            TelnetOption::MNES => write!(f, "MNES"),
            TelnetOption::Charset => write!(f, "Charset"),
            TelnetOption::MSDP => write!(f, "MSDP"),
            TelnetOption::MSSP => write!(f, "MSSP"),
            TelnetOption::MCCP2 => write!(f, "MCCP2"),
            TelnetOption::MCCP3 => write!(f, "MCCP3"),
            TelnetOption::MXP => write!(f, "MXP"),
            TelnetOption::GMCP => write!(f, "GMCP"),
            TelnetOption::Unknown(option) => write!(f, "Unknown({option})"),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        Self::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_round_trips_through_wire_code() {
        for byte in 0..=u8::MAX {
            assert_eq!(TelnetOption::from_u8(byte).to_u8(), byte);
        }
    }

    #[test]
    fn known_codes_map_to_named_variants() {
        assert_eq!(TelnetOption::from_u8(3), TelnetOption::SuppressGoAhead);
        assert_eq!(TelnetOption::from_u8(24), TelnetOption::TerminalType);
        assert_eq!(TelnetOption::from_u8(31), TelnetOption::NAWS);
        assert_eq!(TelnetOption::from_u8(42), TelnetOption::Charset);
        assert_eq!(TelnetOption::from_u8(86), TelnetOption::MCCP2);
        assert_eq!(TelnetOption::from_u8(87), TelnetOption::MCCP3);
        assert_eq!(TelnetOption::from_u8(201), TelnetOption::GMCP);
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(TelnetOption::from_u8(99), TelnetOption::Unknown(99));
        assert_eq!(format!("{}", TelnetOption::Unknown(99)), "Unknown(99)");
    }
}
