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

//! # Mudlink Telnet Engine
//!
//! A transport-agnostic, per-connection MUD Telnet engine. The host owns
//! the socket; the engine owns everything the bytes mean:
//!
//! - incremental frame parsing with IAC escaping and `SB … SE` blocks
//! - the per-option WILL/WONT/DO/DONT negotiation dance, with one-shot
//!   completion signals the host can wait on under a timeout
//! - a pluggable option handler set: SGA, NAWS, CHARSET, MTTS terminal
//!   probing, MSSP, GMCP, MCCP2/MCCP3 compression, LINEMODE, EOR
//! - dynamic compression pipelines, installed mid-stream when MCCP
//!   activates
//! - inbound line assembly and outbound CR/LF canonicalization
//!
//! ## Shape of a host
//!
//! One task feeds socket reads into [`TelnetEngine::receive_data`]; one
//! task drains [`TelnetEngine::next_output`] into the socket writer; the
//! [`SessionEvents`] callbacks deliver lines, commands, capability changes
//! and GMCP messages to the application. The engine holds no locks and
//! presumes cooperative single-task access; a multi-threaded host
//! serializes externally.
//!
//! ```no_run
//! use mudlink_engine::{EngineConfig, SessionEvents, TelnetEngine};
//! use std::time::Duration;
//!
//! # async fn run() -> mudlink_engine::EngineResult<()> {
//! let mut engine = TelnetEngine::new(EngineConfig::new());
//!
//! // Kick off negotiation and give clients a moment to answer.
//! let handles = engine.start();
//! let settle = async {
//!     for handle in &handles {
//!         handle.wait().await;
//!     }
//! };
//! let _ = tokio::time::timeout(Duration::from_secs(3), settle).await;
//!
//! engine.send_line("Welcome, traveler.");
//! # Ok(())
//! # }
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod capabilities;
mod engine;
mod error;
mod events;
mod handler;
mod json;
pub mod options;
mod signal;
mod text;

pub use self::capabilities::{CapabilityChange, ClientCapabilities, ColorDepth};
pub use self::engine::{EngineConfig, TelnetEngine};
pub use self::error::{CallbackError, EngineError, EngineResult};
pub use self::events::{NullEvents, SessionEvents};
pub use self::handler::{
    EngineContext, OptionConfig, OptionPerspective, OptionSideState, TelnetOptionHandler,
};
pub use self::json::{JsonCodec, SerdeJson};
pub use self::options::standard_options;
pub use self::signal::NegotiationHandle;
pub use self::text::{TextEncoding, ensure_crlf};

pub use mudlink_telnetcodec::{NegotiationVerb, TelnetFrame, TelnetOption};
