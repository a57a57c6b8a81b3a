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

//! Mud Client Compression Protocol v2: server-to-client compression
//!
//! After the client accepts with `DO MCCP2`, the server announces the
//! switchover with an empty subnegotiation. Everything up to and including
//! that announcement travels uncompressed; every byte after it is a zlib
//! stream. The handler installs the compressor from its send-side hook, at
//! the moment the announcement actually leaves the engine, which is what
//! makes the boundary exact.

use crate::capabilities::CapabilityChange;
use crate::error::EngineResult;
use crate::handler::{EngineContext, OptionConfig, TelnetOptionHandler};
use async_trait::async_trait;
use bytes::Bytes;
use mudlink_compress::ZlibDeflater;
use mudlink_telnetcodec::TelnetOption;
use tracing::debug;

/// MCCP2 negotiation and compressor installation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mccp2Option;

#[async_trait]
impl TelnetOptionHandler for Mccp2Option {
    fn option(&self) -> TelnetOption {
        TelnetOption::MCCP2
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_local: true,
            start_local: true,
            ..OptionConfig::default()
        }
    }

    async fn on_local_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.change_capabilities(&[CapabilityChange::Mccp2(true)])
            .await?;
        ctx.complete();
        // The empty subnegotiation announces that compression starts right
        // after it.
        ctx.send_subnegotiate(Bytes::new());
        Ok(())
    }

    async fn on_send_subnegotiate(
        &mut self,
        _payload: &Bytes,
        ctx: &mut EngineContext<'_>,
    ) -> EngineResult<()> {
        if !ctx.capabilities().mccp2_enabled {
            debug!("MCCP2 announcement sent, compressing from next frame");
            ctx.change_capabilities(&[CapabilityChange::Mccp2Enabled(true)])
                .await?;
            ctx.install_outbound(Box::new(ZlibDeflater::new()));
        }
        Ok(())
    }
}
