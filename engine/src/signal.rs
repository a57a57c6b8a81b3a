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

use tokio_util::sync::CancellationToken;

///
/// A one-shot, level-triggered completion signal for option negotiation.
///
/// Each option handler owns one; it fires when the option's initial
/// handshake settles (accepted, rejected, or complete by the handler's own
/// criteria). Once set it stays set, so any number of waiters resolve no
/// matter when they start waiting, and a host that cancels its wait can
/// safely come back later. Clones share the same underlying state.
///
/// Hosts typically gather the handles returned by
/// [`TelnetEngine::start`](crate::TelnetEngine::start) and wait on all of
/// them under a timeout, since many MUD clients simply ignore options they
/// do not speak.
///
#[derive(Clone, Debug, Default)]
pub struct NegotiationHandle {
    token: CancellationToken,
}

impl NegotiationHandle {
    /// Creates an unset handle.
    pub fn new() -> NegotiationHandle {
        NegotiationHandle::default()
    }

    /// Marks negotiation as settled. Idempotent.
    pub fn set(&self) {
        self.token.cancel();
    }

    /// True once negotiation has settled.
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the handle is set. Resolves immediately if it already is.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}
