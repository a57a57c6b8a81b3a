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

//! Mud Server Status Protocol
//!
//! Key/value server advertisement: each pair is encoded as
//! `0x01 <key> 0x02 <value>`, concatenated in the order given.

use crate::capabilities::CapabilityChange;
use crate::error::EngineResult;
use crate::handler::{EngineContext, OptionConfig, TelnetOptionHandler};
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use mudlink_telnetcodec::{TelnetOption, consts};

/// MSSP negotiation. The payloads themselves go out through
/// [`TelnetEngine::send_mssp`](crate::TelnetEngine::send_mssp) once the
/// client accepts.
#[derive(Clone, Copy, Debug, Default)]
pub struct MsspOption;

/// Encodes MSSP pairs as `VAR key VAL value` runs, in iteration order.
pub fn encode_mssp<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Bytes {
    let mut out = BytesMut::new();
    for (key, value) in pairs {
        out.put_u8(consts::mssp::VAR);
        out.extend_from_slice(key.as_ref().as_bytes());
        out.put_u8(consts::mssp::VAL);
        out.extend_from_slice(value.as_ref().as_bytes());
    }
    out.freeze()
}

#[async_trait]
impl TelnetOptionHandler for MsspOption {
    fn option(&self) -> TelnetOption {
        TelnetOption::MSSP
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_local: true,
            start_local: true,
            ..OptionConfig::default()
        }
    }

    async fn on_local_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.complete();
        ctx.change_capabilities(&[CapabilityChange::Mssp(true)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_encode_with_var_val_markers() {
        let wire = encode_mssp(&[("NAME", "Moonshadow"), ("PLAYERS", "17")]);
        let mut expected = vec![consts::mssp::VAR];
        expected.extend_from_slice(b"NAME");
        expected.push(consts::mssp::VAL);
        expected.extend_from_slice(b"Moonshadow");
        expected.push(consts::mssp::VAR);
        expected.extend_from_slice(b"PLAYERS");
        expected.push(consts::mssp::VAL);
        expected.extend_from_slice(b"17");
        assert_eq!(&wire[..], &expected[..]);
    }

    #[test]
    fn empty_pair_list_encodes_empty() {
        let wire = encode_mssp::<&str, &str>(&[]);
        assert!(wire.is_empty());
    }
}
