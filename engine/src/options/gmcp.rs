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

//! Generic Mud Communication Protocol
//!
//! A GMCP payload is the UTF-8 package name, optionally followed by one
//! space and a JSON document: `Char.Vitals {"hp":100}`. Inbound messages
//! surface through the host's `gmcp` callback; a payload whose JSON fails
//! to parse arrives with `data = None`.

use crate::capabilities::CapabilityChange;
use crate::error::EngineResult;
use crate::handler::{EngineContext, OptionConfig, TelnetOptionHandler};
use crate::json::JsonCodec;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use mudlink_telnetcodec::TelnetOption;
use serde_json::Value;

/// GMCP negotiation and message decoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct GmcpOption;

/// Builds a GMCP subnegotiation payload: `package [" " json]`.
pub fn encode_gmcp(package: &str, data: Option<&Value>, json: &dyn JsonCodec) -> Bytes {
    let mut out = BytesMut::with_capacity(package.len() + 16);
    out.extend_from_slice(package.as_bytes());
    if let Some(value) = data {
        out.extend_from_slice(b" ");
        out.extend_from_slice(json.dumps(value).as_bytes());
    }
    out.freeze()
}

#[async_trait]
impl TelnetOptionHandler for GmcpOption {
    fn option(&self) -> TelnetOption {
        TelnetOption::GMCP
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_local: true,
            start_local: true,
            ..OptionConfig::default()
        }
    }

    async fn on_local_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.change_capabilities(&[CapabilityChange::Gmcp(true)])
            .await?;
        ctx.complete();
        Ok(())
    }

    async fn on_receive_subnegotiate(
        &mut self,
        payload: Bytes,
        ctx: &mut EngineContext<'_>,
    ) -> EngineResult<()> {
        let text = String::from_utf8_lossy(&payload);
        let (package, data) = match text.split_once(' ') {
            Some((package, json_text)) => {
                (package.to_string(), ctx.json().loads(json_text).ok())
            }
            None => (text.to_string(), None),
        };
        ctx.emit_gmcp(package, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::SerdeJson;
    use serde_json::json;

    #[test]
    fn command_only_payload_has_no_space() {
        let wire = encode_gmcp("Core.Ping", None, &SerdeJson);
        assert_eq!(&wire[..], b"Core.Ping");
    }

    #[test]
    fn data_is_appended_after_one_space() {
        let value = json!({"client": "mudlink"});
        let wire = encode_gmcp("Core.Hello", Some(&value), &SerdeJson);
        assert_eq!(&wire[..], br#"Core.Hello {"client":"mudlink"}"#);
    }
}
