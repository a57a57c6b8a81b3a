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

//! Terminal Type with the [MTTS](https://tintin.mudhalla.net/protocols/mtts/)
//! staged probe
//!
//! RFC 1091 defines a single request/reply; MTTS overloads repeated `SEND`
//! probes so the reply changes meaning per round:
//!
//! 1. client name (and optionally version, space-separated)
//! 2. terminal type
//! 3. an `MTTS <bitmask>` feature word
//!
//! A client that repeats its previous answer does not speak MTTS; probing
//! stops there.

use crate::capabilities::{CapabilityChange, ColorDepth};
use crate::error::EngineResult;
use crate::handler::{EngineContext, OptionConfig, TelnetOptionHandler};
use async_trait::async_trait;
use bytes::Bytes;
use mudlink_telnetcodec::{TelnetOption, consts};

/// Clients known to render the 256-color xterm palette regardless of what
/// their terminal type claims.
const XTERM256_CLIENTS: [&str; 8] = [
    "ATLANTIS",
    "CMUD",
    "KILDCLIENT",
    "MUDLET",
    "MUSHCLIENT",
    "PUTTY",
    "POTATO",
    "TINYFUGUE",
];

/// MTTS bitmask bits, LSB first.
const MTTS_ANSI: u32 = 1;
const MTTS_VT100: u32 = 2;
const MTTS_UTF8: u32 = 4;
const MTTS_XTERM256: u32 = 8;
const MTTS_MOUSE_TRACKING: u32 = 16;
const MTTS_OSC_COLOR_PALETTE: u32 = 32;
const MTTS_SCREEN_READER: u32 = 64;
const MTTS_PROXY: u32 = 128;
const MTTS_TRUECOLOR: u32 = 256;
const MTTS_MNES: u32 = 512;
const MTTS_MSLP: u32 = 1024;
const MTTS_TLS: u32 = 2048;

/// The staged terminal-type prober.
#[derive(Clone, Debug, Default)]
pub struct MttsOption {
    requests: u8,
    last_reply: String,
}

impl MttsOption {
    fn send_probe(&mut self, ctx: &mut EngineContext<'_>) {
        self.requests += 1;
        ctx.send_subnegotiate(Bytes::from_static(&[consts::ttype::SEND]));
    }

    /// Stage one: `<client_name> [<client_version>]`.
    async fn handle_name(&self, reply: &str, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        let (name, version) = match reply.split_once(' ') {
            Some((name, version)) => (name, Some(version)),
            None => (reply, None),
        };
        let mut changes = vec![CapabilityChange::ClientName(name.to_string())];
        if let Some(version) = version {
            changes.push(CapabilityChange::ClientVersion(version.to_string()));
        }

        // Anything that answers an MTTS probe renders at least basic ANSI.
        let mut color = ColorDepth::Ansi;
        let upper = name.to_uppercase();
        if XTERM256_CLIENTS.contains(&upper.as_str()) {
            color = ColorDepth::Xterm256;
        } else if upper == "BEIP" {
            color = ColorDepth::TrueColor;
        }

        let current = ctx.capabilities().color;
        let color = current.max(color);
        if color != current {
            changes.push(CapabilityChange::Color(color));
        }
        ctx.change_capabilities(&changes).await
    }

    /// Stage two: the terminal type, e.g. `XTERM-256COLOR` or `VT100`.
    async fn handle_terminal(&self, reply: &str, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        let first = reply.split_once('-').map_or(reply, |(first, _)| first);
        let upper = first.to_uppercase();

        let current = ctx.capabilities().color;
        let mut color = current;
        if color < ColorDepth::Xterm256
            && (upper.ends_with("-256COLOR")
                || (upper.ends_with("XTERM") && !upper.ends_with("-COLOR")))
        {
            color = ColorDepth::Xterm256;
        }

        let mut changes = Vec::new();
        match upper.as_str() {
            "DUMB" | "ANSI" => {}
            "VT100" => changes.push(CapabilityChange::Vt100(true)),
            "XTERM" => color = color.max(ColorDepth::Xterm256),
            _ => {}
        }

        if color != current {
            changes.push(CapabilityChange::Color(color));
        }
        if changes.is_empty() {
            return Ok(());
        }
        ctx.change_capabilities(&changes).await
    }

    /// Stage three: `MTTS <bitmask>`.
    async fn handle_bitmask(&self, reply: &str, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        let Some(rest) = reply.strip_prefix("MTTS ") else {
            return Ok(());
        };
        let Ok(bits) = rest.trim().parse::<u32>() else {
            return Ok(());
        };

        let current = ctx.capabilities().color;
        let mut color = current;
        let mut changes = Vec::new();

        if bits & MTTS_ANSI != 0 {
            color = color.max(ColorDepth::Ansi);
        }
        if bits & MTTS_VT100 != 0 {
            changes.push(CapabilityChange::Vt100(true));
        }
        if bits & MTTS_UTF8 != 0 {
            changes.push(CapabilityChange::Encoding("utf-8".to_string()));
        }
        if bits & MTTS_XTERM256 != 0 {
            color = color.max(ColorDepth::Xterm256);
        }
        if bits & MTTS_MOUSE_TRACKING != 0 {
            changes.push(CapabilityChange::MouseTracking(true));
        }
        if bits & MTTS_OSC_COLOR_PALETTE != 0 {
            changes.push(CapabilityChange::OscColorPalette(true));
        }
        if bits & MTTS_SCREEN_READER != 0 {
            changes.push(CapabilityChange::ScreenReader(true));
        }
        if bits & MTTS_PROXY != 0 {
            changes.push(CapabilityChange::Proxy(true));
        }
        if bits & MTTS_TRUECOLOR != 0 {
            color = color.max(ColorDepth::TrueColor);
        }
        if bits & MTTS_MNES != 0 {
            changes.push(CapabilityChange::Mnes(true));
        }
        if bits & MTTS_MSLP != 0 {
            changes.push(CapabilityChange::Mslp(true));
        }
        if bits & MTTS_TLS != 0 {
            changes.push(CapabilityChange::TlsSupport(true));
        }

        if color != current {
            changes.push(CapabilityChange::Color(color));
        }
        ctx.change_capabilities(&changes).await
    }
}

#[async_trait]
impl TelnetOptionHandler for MttsOption {
    fn option(&self) -> TelnetOption {
        TelnetOption::TerminalType
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_remote: true,
            start_remote: true,
            ..OptionConfig::default()
        }
    }

    async fn on_remote_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.change_capabilities(&[CapabilityChange::Mtts(true)])
            .await?;
        self.send_probe(ctx);
        Ok(())
    }

    async fn on_receive_subnegotiate(
        &mut self,
        payload: Bytes,
        ctx: &mut EngineContext<'_>,
    ) -> EngineResult<()> {
        if payload.is_empty() || payload[0] != consts::ttype::IS {
            return Ok(());
        }
        let reply = String::from_utf8_lossy(&payload[1..]).into_owned();

        if reply == self.last_reply {
            // The client is cycling a single terminal type; it does not
            // speak staged MTTS.
            ctx.complete();
            return Ok(());
        }
        self.last_reply.clone_from(&reply);

        match self.requests {
            1 => {
                self.handle_name(&reply, ctx).await?;
                self.send_probe(ctx);
            }
            2 => {
                self.handle_terminal(&reply, ctx).await?;
                self.send_probe(ctx);
            }
            3 => {
                self.handle_bitmask(&reply, ctx).await?;
                ctx.complete();
            }
            _ => {}
        }
        Ok(())
    }
}
