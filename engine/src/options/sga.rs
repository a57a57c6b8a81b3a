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

/// Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858).
///
/// Offered at startup; the default hooks do everything this option needs
/// (the completion signal settles on the first DO or DONT).
#[derive(Clone, Copy, Debug, Default)]
pub struct SgaOption;

#[async_trait]
impl TelnetOptionHandler for SgaOption {
    fn option(&self) -> TelnetOption {
        TelnetOption::SuppressGoAhead
    }

    fn config(&self) -> OptionConfig {
        OptionConfig {
            support_local: true,
            start_local: true,
            ..OptionConfig::default()
        }
    }
}
