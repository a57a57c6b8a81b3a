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
use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use mudlink_telnetcodec::TelnetOption;
use tracing::debug;

/// Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073).
///
/// The client reports its terminal dimensions as two big-endian 16-bit
/// words, once at enable and again on every resize. Each valid report
/// updates `width`/`height` in the capability record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NawsOption;

/// Decodes the 4-byte NAWS payload into `(width, height)`.
fn decode_window_size(payload: &[u8]) -> Option<(u16, u16)> {
    if payload.len() != 4 {
        return None;
    }
    Some((
        BigEndian::read_u16(&payload[0..2]),
        BigEndian::read_u16(&payload[2..4]),
    ))
}

#[async_trait]
impl TelnetOptionHandler for NawsOption {
    fn option(&self) -> TelnetOption {
        TelnetOption::NAWS
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_remote: true,
            start_remote: true,
            ..OptionConfig::default()
        }
    }

    async fn on_remote_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.change_capabilities(&[CapabilityChange::Naws(true)])
            .await?;
        ctx.complete();
        Ok(())
    }

    async fn on_receive_subnegotiate(
        &mut self,
        payload: Bytes,
        ctx: &mut EngineContext<'_>,
    ) -> EngineResult<()> {
        let Some((width, height)) = decode_window_size(&payload) else {
            debug!(len = payload.len(), "ignoring NAWS payload of wrong length");
            return Ok(());
        };
        ctx.change_capabilities(&[
            CapabilityChange::Width(width),
            CapabilityChange::Height(height),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_bytes_decode_big_endian() {
        assert_eq!(decode_window_size(&[0x00, 0x50, 0x00, 0x18]), Some((80, 24)));
        assert_eq!(decode_window_size(&[0x01, 0x00, 0x00, 0x40]), Some((256, 64)));
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        assert_eq!(decode_window_size(&[]), None);
        assert_eq!(decode_window_size(&[0x00, 0x50]), None);
        assert_eq!(decode_window_size(&[0x00, 0x50, 0x00, 0x18, 0x00]), None);
    }
}
