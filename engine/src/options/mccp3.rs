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

//! Mud Client Compression Protocol v3: client-to-server compression
//!
//! The reverse of MCCP2. Once the server offers `WILL MCCP3` and the client
//! answers `DO`, the client may at any point send `IAC SB MCCP3 IAC SE` and
//! switch its own output to a zlib stream. The activation boundary cuts
//! through the middle of an already-received read: everything after the
//! announcement, including bytes already sitting in the parse buffer, is
//! compressed. The handler therefore inflates the buffer residue in place
//! before installing the inflater for subsequent reads.

use crate::capabilities::CapabilityChange;
use crate::error::EngineResult;
use crate::handler::{EngineContext, OptionConfig, TelnetOptionHandler};
use async_trait::async_trait;
use bytes::Bytes;
use mudlink_compress::{InboundTransform, Inflated, ZlibInflater};
use mudlink_telnetcodec::{NegotiationVerb, TelnetOption};
use tracing::{debug, warn};

/// MCCP3 negotiation, mid-buffer activation, and failure recovery.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mccp3Option;

#[async_trait]
impl TelnetOptionHandler for Mccp3Option {
    fn option(&self) -> TelnetOption {
        TelnetOption::MCCP3
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_local: true,
            start_local: true,
            ..OptionConfig::default()
        }
    }

    async fn on_local_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.change_capabilities(&[CapabilityChange::Mccp3(true)])
            .await?;
        ctx.complete();
        Ok(())
    }

    async fn on_receive_subnegotiate(
        &mut self,
        _payload: Bytes,
        ctx: &mut EngineContext<'_>,
    ) -> EngineResult<()> {
        if ctx.capabilities().mccp3_enabled {
            return Ok(());
        }
        ctx.change_capabilities(&[CapabilityChange::Mccp3Enabled(true)])
            .await?;

        let mut inflater = ZlibInflater::new();
        // Everything already buffered past the announcement is compressed;
        // inflate it back into the parse buffer the dispatch loop reads.
        let residue = {
            let buffer = ctx.parse_buffer_mut();
            buffer.split().freeze()
        };
        match inflater.transform_in(&residue) {
            Ok(Inflated { bytes, finished }) => {
                ctx.parse_buffer_mut().extend_from_slice(&bytes);
                if finished {
                    debug!("MCCP3 stream ended within its first read");
                    ctx.change_capabilities(&[CapabilityChange::Mccp3Enabled(false)])
                        .await?;
                } else {
                    ctx.install_inbound(Box::new(inflater));
                }
            }
            Err(err) => {
                warn!(error = %err, "MCCP3 stream failed to start, refusing the option");
                ctx.change_capabilities(&[CapabilityChange::Mccp3Enabled(false)])
                    .await?;
                ctx.send_negotiate(NegotiationVerb::Wont);
            }
        }
        Ok(())
    }

    async fn on_inbound_end(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.change_capabilities(&[CapabilityChange::Mccp3Enabled(false)])
            .await
    }

    async fn on_inbound_error(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.change_capabilities(&[CapabilityChange::Mccp3Enabled(false)])
            .await?;
        ctx.send_negotiate(NegotiationVerb::Wont);
        Ok(())
    }
}
