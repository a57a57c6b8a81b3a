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

//! Session event callbacks

use crate::capabilities::CapabilityChange;
use crate::error::CallbackError;
use async_trait::async_trait;
use serde_json::Value;

///
/// Host callbacks for events the engine surfaces from the inbound stream.
///
/// All methods are async (they may suspend), have default implementations
/// that do nothing, and fire in the order events were parsed. An error
/// returned here propagates out of the `receive_data` call that triggered
/// it; the engine itself stays consistent and usable.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use mudlink_engine::{CallbackError, SessionEvents};
///
/// struct Echo;
///
/// #[async_trait]
/// impl SessionEvents for Echo {
///     async fn line(&mut self, line: String) -> Result<(), CallbackError> {
///         println!("client said: {line}");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SessionEvents: Send {
    /// A complete inbound line, terminator stripped and decoded.
    async fn line(&mut self, _line: String) -> Result<(), CallbackError> {
        Ok(())
    }

    /// A two-byte Telnet command arrived (for example `NOP` or `GA`).
    async fn command(&mut self, _command: u8) -> Result<(), CallbackError> {
        Ok(())
    }

    /// One capability was mutated. Fires once per change, before any event
    /// that depends on the new value.
    async fn capability_changed(&mut self, _change: &CapabilityChange) -> Result<(), CallbackError> {
        Ok(())
    }

    /// A decoded GMCP message. `data` is `None` when the payload carried no
    /// JSON or the JSON failed to parse.
    async fn gmcp(&mut self, _package: String, _data: Option<Value>) -> Result<(), CallbackError> {
        Ok(())
    }
}

/// A [`SessionEvents`] implementation that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEvents;

#[async_trait]
impl SessionEvents for NullEvents {}
