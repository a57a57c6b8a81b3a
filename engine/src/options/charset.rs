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

use crate::capabilities::CapabilityChange;
use crate::error::EngineResult;
use crate::handler::{EngineContext, OptionConfig, TelnetOptionHandler};
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use mudlink_telnetcodec::{TelnetOption, consts};
use tracing::debug;

/// Charset negotiation [RFC2066](https://tools.ietf.org/html/rfc2066).
///
/// Both sides are supported and started. On the first enable from either
/// side the handler sends one `REQUEST` carrying the space-delimited offer
/// `ascii utf-8`; whichever side enables first wins, the other enable is a
/// no-op. An `ACCEPTED` reply stores the chosen name in
/// `capabilities.encoding` and settles the completion signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharsetOption {
    requested: bool,
}

fn request_payload() -> Bytes {
    let mut payload = BytesMut::with_capacity(14);
    payload.put_u8(consts::charset::REQUEST);
    payload.extend_from_slice(b" ascii utf-8");
    payload.freeze()
}

impl CharsetOption {
    fn request_once(&mut self, ctx: &EngineContext<'_>) {
        if !self.requested {
            self.requested = true;
            ctx.send_subnegotiate(request_payload());
        }
    }
}

#[async_trait]
impl TelnetOptionHandler for CharsetOption {
    fn option(&self) -> TelnetOption {
        TelnetOption::Charset
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_local: true,
            support_remote: true,
            start_local: true,
            start_remote: true,
        }
    }

    async fn on_local_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        self.request_once(ctx);
        Ok(())
    }

    async fn on_remote_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        self.request_once(ctx);
        Ok(())
    }

    async fn on_receive_subnegotiate(
        &mut self,
        payload: Bytes,
        ctx: &mut EngineContext<'_>,
    ) -> EngineResult<()> {
        if payload.len() < 2 {
            return Ok(());
        }
        match payload[0] {
            consts::charset::ACCEPTED => {
                let encoding = String::from_utf8_lossy(&payload[1..]).into_owned();
                ctx.change_capabilities(&[CapabilityChange::Encoding(encoding)])
                    .await?;
                ctx.complete();
            }
            verb => {
                debug!(verb, "ignoring charset subnegotiation verb");
            }
        }
        Ok(())
    }
}
