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

//! Concrete option handlers
//!
//! One module per negotiable option. [`standard_options`] assembles the
//! full set a MUD server typically runs with; hosts that want a narrower
//! surface pass their own list to
//! [`EngineConfig`](crate::EngineConfig).

mod charset;
pub mod gmcp;
mod linemode;
mod mccp2;
mod mccp3;
pub mod mssp;
mod mtts;
mod naws;
mod sga;

pub use self::charset::CharsetOption;
pub use self::gmcp::GmcpOption;
pub use self::linemode::{EorOption, LinemodeOption};
pub use self::mccp2::Mccp2Option;
pub use self::mccp3::Mccp3Option;
pub use self::mssp::MsspOption;
pub use self::mtts::MttsOption;
pub use self::naws::NawsOption;
pub use self::sga::SgaOption;

use crate::handler::TelnetOptionHandler;

/// The full handler set, in the order the opening salvo fires.
pub fn standard_options() -> Vec<Box<dyn TelnetOptionHandler>> {
    vec![
        Box::new(SgaOption::default()),
        Box::new(NawsOption::default()),
        Box::new(CharsetOption::default()),
        Box::new(MttsOption::default()),
        Box::new(MsspOption::default()),
        Box::new(Mccp2Option::default()),
        Box::new(Mccp3Option::default()),
        Box::new(GmcpOption::default()),
        Box::new(LinemodeOption::default()),
        Box::new(EorOption::default()),
    ]
}
