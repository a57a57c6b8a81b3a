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

//! Observable client capabilities
//!
//! A per-connection record of what negotiation has revealed about the
//! connected client. The engine exposes it read-only; every mutation flows
//! through [`CapabilityChange`] values applied by the engine's
//! `change_capabilities` path, which fires the host's per-change callback.

use serde::{Deserialize, Serialize};

/// How much color the client can render.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ColorDepth {
    /// No color support detected
    #[default]
    None,
    /// Basic 16-color ANSI
    Ansi,
    /// 256-color xterm palette
    Xterm256,
    /// 24-bit truecolor
    TrueColor,
}

///
/// Everything the engine has learned about the connected client.
///
/// Defaults describe the most conservative client imaginable: a 78x24
/// ASCII terminal with no color and no protocol extensions. Negotiation and
/// MTTS probing upgrade fields from there.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ClientCapabilities {
    /// Client program name, from MTTS stage one
    pub client_name: String,
    /// Client program version, from MTTS stage one
    pub client_version: String,
    /// Negotiated character encoding name
    pub encoding: String,
    /// Detected color support
    pub color: ColorDepth,
    /// Terminal width in columns
    pub width: u16,
    /// Terminal height in rows
    pub height: u16,
    /// Client negotiated MCCP2 (server-to-client compression)
    pub mccp2: bool,
    /// The MCCP2 compressed stream is live
    pub mccp2_enabled: bool,
    /// Client negotiated MCCP3 (client-to-server compression)
    pub mccp3: bool,
    /// The MCCP3 compressed stream is live
    pub mccp3_enabled: bool,
    /// Client speaks GMCP
    pub gmcp: bool,
    /// Client speaks MSDP
    pub msdp: bool,
    /// Client accepted MSSP status broadcasts
    pub mssp: bool,
    /// Client supports the Mud Server Link Protocol
    pub mslp: bool,
    /// Client answered the terminal-type probe
    pub mtts: bool,
    /// Client reports window size changes
    pub naws: bool,
    /// Suppress Go Ahead is in effect
    pub sga: bool,
    /// Linemode negotiated
    pub linemode: bool,
    /// Client needs an explicit line terminator after prompts
    pub force_endline: bool,
    /// Client is a screen reader
    pub screen_reader: bool,
    /// Client supports mouse tracking
    pub mouse_tracking: bool,
    /// Terminal is VT100-compatible
    pub vt100: bool,
    /// Client honors OSC color palette sequences
    pub osc_color_palette: bool,
    /// Connection arrives through a proxy
    pub proxy: bool,
    /// Client supports the Mud New-Environ Standard
    pub mnes: bool,
    /// Client can upgrade to TLS
    pub tls_support: bool,
}

impl Default for ClientCapabilities {
    fn default() -> Self {
        ClientCapabilities {
            client_name: "UNKNOWN".to_string(),
            client_version: "UNKNOWN".to_string(),
            encoding: "ascii".to_string(),
            color: ColorDepth::None,
            width: 78,
            height: 24,
            mccp2: false,
            mccp2_enabled: false,
            mccp3: false,
            mccp3_enabled: false,
            gmcp: false,
            msdp: false,
            mssp: false,
            mslp: false,
            mtts: false,
            naws: false,
            sga: false,
            linemode: false,
            force_endline: false,
            screen_reader: false,
            mouse_tracking: false,
            vt100: false,
            osc_color_palette: false,
            proxy: false,
            mnes: false,
            tls_support: false,
        }
    }
}

///
/// One mutation of the capability record.
///
/// Handlers and the application never write capability fields directly;
/// they submit changes through the engine, which applies each one and fires
/// the `capability_changed` callback per change, in order.
///
#[derive(Clone, Debug, PartialEq)]
pub enum CapabilityChange {
    /// Set the client program name
    ClientName(String),
    /// Set the client program version
    ClientVersion(String),
    /// Set the negotiated encoding name
    Encoding(String),
    /// Set the detected color depth
    Color(ColorDepth),
    /// Set the terminal width
    Width(u16),
    /// Set the terminal height
    Height(u16),
    /// Set the MCCP2 negotiation flag
    Mccp2(bool),
    /// Set whether the MCCP2 stream is live
    Mccp2Enabled(bool),
    /// Set the MCCP3 negotiation flag
    Mccp3(bool),
    /// Set whether the MCCP3 stream is live
    Mccp3Enabled(bool),
    /// Set the GMCP flag
    Gmcp(bool),
    /// Set the MSDP flag
    Msdp(bool),
    /// Set the MSSP flag
    Mssp(bool),
    /// Set the MSLP flag
    Mslp(bool),
    /// Set the MTTS flag
    Mtts(bool),
    /// Set the NAWS flag
    Naws(bool),
    /// Set the SGA flag
    Sga(bool),
    /// Set the Linemode flag
    Linemode(bool),
    /// Set the forced line terminator flag
    ForceEndline(bool),
    /// Set the screen reader flag
    ScreenReader(bool),
    /// Set the mouse tracking flag
    MouseTracking(bool),
    /// Set the VT100 flag
    Vt100(bool),
    /// Set the OSC color palette flag
    OscColorPalette(bool),
    /// Set the proxy flag
    Proxy(bool),
    /// Set the MNES flag
    Mnes(bool),
    /// Set the TLS support flag
    TlsSupport(bool),
}

impl CapabilityChange {
    /// The capability field this change targets.
    pub fn key(&self) -> &'static str {
        match self {
            CapabilityChange::ClientName(_) => "client_name",
            CapabilityChange::ClientVersion(_) => "client_version",
            CapabilityChange::Encoding(_) => "encoding",
            CapabilityChange::Color(_) => "color",
            CapabilityChange::Width(_) => "width",
            CapabilityChange::Height(_) => "height",
            CapabilityChange::Mccp2(_) => "mccp2",
            CapabilityChange::Mccp2Enabled(_) => "mccp2_enabled",
            CapabilityChange::Mccp3(_) => "mccp3",
            CapabilityChange::Mccp3Enabled(_) => "mccp3_enabled",
            CapabilityChange::Gmcp(_) => "gmcp",
            CapabilityChange::Msdp(_) => "msdp",
            CapabilityChange::Mssp(_) => "mssp",
            CapabilityChange::Mslp(_) => "mslp",
            CapabilityChange::Mtts(_) => "mtts",
            CapabilityChange::Naws(_) => "naws",
            CapabilityChange::Sga(_) => "sga",
            CapabilityChange::Linemode(_) => "linemode",
            CapabilityChange::ForceEndline(_) => "force_endline",
            CapabilityChange::ScreenReader(_) => "screen_reader",
            CapabilityChange::MouseTracking(_) => "mouse_tracking",
            CapabilityChange::Vt100(_) => "vt100",
            CapabilityChange::OscColorPalette(_) => "osc_color_palette",
            CapabilityChange::Proxy(_) => "proxy",
            CapabilityChange::Mnes(_) => "mnes",
            CapabilityChange::TlsSupport(_) => "tls_support",
        }
    }

    /// Writes this change into the record.
    pub fn apply(&self, capabilities: &mut ClientCapabilities) {
        match self {
            CapabilityChange::ClientName(value) => capabilities.client_name = value.clone(),
            CapabilityChange::ClientVersion(value) => capabilities.client_version = value.clone(),
            CapabilityChange::Encoding(value) => capabilities.encoding = value.clone(),
            CapabilityChange::Color(value) => capabilities.color = *value,
            CapabilityChange::Width(value) => capabilities.width = *value,
            CapabilityChange::Height(value) => capabilities.height = *value,
            CapabilityChange::Mccp2(value) => capabilities.mccp2 = *value,
            CapabilityChange::Mccp2Enabled(value) => capabilities.mccp2_enabled = *value,
            CapabilityChange::Mccp3(value) => capabilities.mccp3 = *value,
            CapabilityChange::Mccp3Enabled(value) => capabilities.mccp3_enabled = *value,
            CapabilityChange::Gmcp(value) => capabilities.gmcp = *value,
            CapabilityChange::Msdp(value) => capabilities.msdp = *value,
            CapabilityChange::Mssp(value) => capabilities.mssp = *value,
            CapabilityChange::Mslp(value) => capabilities.mslp = *value,
            CapabilityChange::Mtts(value) => capabilities.mtts = *value,
            CapabilityChange::Naws(value) => capabilities.naws = *value,
            CapabilityChange::Sga(value) => capabilities.sga = *value,
            CapabilityChange::Linemode(value) => capabilities.linemode = *value,
            CapabilityChange::ForceEndline(value) => capabilities.force_endline = *value,
            CapabilityChange::ScreenReader(value) => capabilities.screen_reader = *value,
            CapabilityChange::MouseTracking(value) => capabilities.mouse_tracking = *value,
            CapabilityChange::Vt100(value) => capabilities.vt100 = *value,
            CapabilityChange::OscColorPalette(value) => capabilities.osc_color_palette = *value,
            CapabilityChange::Proxy(value) => capabilities.proxy = *value,
            CapabilityChange::Mnes(value) => capabilities.mnes = *value,
            CapabilityChange::TlsSupport(value) => capabilities.tls_support = *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_plain_terminal() {
        let caps = ClientCapabilities::default();
        assert_eq!(caps.client_name, "UNKNOWN");
        assert_eq!(caps.encoding, "ascii");
        assert_eq!(caps.color, ColorDepth::None);
        assert_eq!((caps.width, caps.height), (78, 24));
        assert!(!caps.gmcp && !caps.mccp2 && !caps.naws);
    }

    #[test]
    fn color_depth_orders_by_capability() {
        assert!(ColorDepth::TrueColor > ColorDepth::Xterm256);
        assert!(ColorDepth::Xterm256 > ColorDepth::Ansi);
        assert!(ColorDepth::Ansi > ColorDepth::None);
        assert_eq!(ColorDepth::Ansi.max(ColorDepth::Xterm256), ColorDepth::Xterm256);
    }

    #[test]
    fn changes_apply_to_their_fields() {
        let mut caps = ClientCapabilities::default();
        CapabilityChange::Width(120).apply(&mut caps);
        CapabilityChange::Encoding("utf-8".into()).apply(&mut caps);
        CapabilityChange::Gmcp(true).apply(&mut caps);
        assert_eq!(caps.width, 120);
        assert_eq!(caps.encoding, "utf-8");
        assert!(caps.gmcp);
    }

    #[test]
    fn change_keys_match_record_fields() {
        assert_eq!(CapabilityChange::ScreenReader(true).key(), "screen_reader");
        assert_eq!(CapabilityChange::Color(ColorDepth::Ansi).key(), "color");
        assert_eq!(CapabilityChange::Mccp3Enabled(true).key(), "mccp3_enabled");
    }

    #[test]
    fn record_serializes_for_host_introspection() {
        let caps = ClientCapabilities::default();
        let json = serde_json::to_string(&caps).unwrap();
        let back: ClientCapabilities = serde_json::from_str(&json).unwrap();
        assert_eq!(back, caps);
    }
}
