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

use crate::handler::{OptionConfig, TelnetOptionHandler};
use async_trait::async_trait;
use mudlink_telnetcodec::TelnetOption;

/// Linemode [RFC1184](https://tools.ietf.org/html/rfc1184).
///
/// Declared and negotiable so clients that insist on it get a clean
/// handshake; this engine attaches no further semantics.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinemodeOption;

#[async_trait]
impl TelnetOptionHandler for LinemodeOption {
    fn option(&self) -> TelnetOption {
        TelnetOption::Linemode
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_local: true,
            start_local: true,
            ..OptionConfig::default()
        }
    }
}

/// End of Record [RFC885](https://tools.ietf.org/html/rfc885).
///
/// Negotiable on both sides but never offered in the opening salvo: a peer
/// that volunteers EOR gets an accepting reply and the completion handle
/// settles, with no further semantics attached. Absent a peer offer, only
/// the host's negotiation timeout resolves its handle.
#[derive(Clone, Copy, Debug, Default)]
pub struct EorOption;

#[async_trait]
impl TelnetOptionHandler for EorOption {
    fn option(&self) -> TelnetOption {
        TelnetOption::EndOfRecord
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_local: true,
            support_remote: true,
            ..OptionConfig::default()
        }
    }
}
