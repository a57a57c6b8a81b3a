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

//! The option handler plugin model
//!
//! Every negotiable option is a [`TelnetOptionHandler`]: a small state
//! machine plus a subnegotiation codec. The engine owns one [`OptionSlot`]
//! per registered handler, tracking both negotiation sides and the
//! completion signal, and drives the WILL/WONT/DO/DONT dance itself; the
//! handler only hears about the transitions it cares about.
//!
//! Handlers never hold a reference back to the engine. Every hook receives
//! an [`EngineContext`] borrowed for the duration of the call, which is how
//! handlers enqueue frames, mutate capabilities, and install stream
//! transformers.

use crate::capabilities::{CapabilityChange, ClientCapabilities};
use crate::engine::EngineCore;
use crate::error::{EngineError, EngineResult};
use crate::json::JsonCodec;
use crate::signal::NegotiationHandle;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use mudlink_compress::{InboundTransform, OutboundTransform};
use mudlink_telnetcodec::{NegotiationVerb, TelnetFrame, TelnetOption};
use serde_json::Value;

/// What a handler supports and which sides it proactively offers at
/// [`TelnetEngine::start`](crate::TelnetEngine::start).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OptionConfig {
    /// This engine can perform the option (peer may send DO)
    pub support_local: bool,
    /// The peer may perform the option (peer may send WILL)
    pub support_remote: bool,
    /// Offer `WILL <option>` in the opening salvo
    pub start_local: bool,
    /// Offer `DO <option>` in the opening salvo
    pub start_remote: bool,
}

/// Negotiation state of one side of one option.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OptionSideState {
    /// The side is in effect
    pub enabled: bool,
    /// An offer is in flight and no reply has arrived
    pub negotiating: bool,
}

/// Both sides of one option: what this engine performs (`local`) and what
/// the peer performs (`remote`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OptionPerspective {
    /// The side this engine performs
    pub local: OptionSideState,
    /// The side the peer performs
    pub remote: OptionSideState,
}

///
/// The capabilities an option handler hook can reach while it runs.
///
/// A context borrows the engine for exactly one hook invocation; handlers
/// hold no engine reference between calls.
///
pub struct EngineContext<'a> {
    core: &'a mut EngineCore,
    option: TelnetOption,
    signal: NegotiationHandle,
}

impl<'a> EngineContext<'a> {
    pub(crate) fn new(
        core: &'a mut EngineCore,
        option: TelnetOption,
        signal: NegotiationHandle,
    ) -> EngineContext<'a> {
        EngineContext {
            core,
            option,
            signal,
        }
    }

    /// The option this hook runs on behalf of.
    pub fn option(&self) -> TelnetOption {
        self.option
    }

    /// Read access to the capability record.
    pub fn capabilities(&self) -> &ClientCapabilities {
        &self.core.capabilities
    }

    /// Marks this option's negotiation as settled.
    pub fn complete(&self) {
        self.signal.set();
    }

    /// Enqueues `IAC <verb> <option>` for this handler's option.
    pub fn send_negotiate(&self, verb: NegotiationVerb) {
        self.core.enqueue(TelnetFrame::negotiate(verb, self.option));
    }

    /// Enqueues `IAC SB <option> <payload> IAC SE`.
    pub fn send_subnegotiate(&self, payload: Bytes) {
        self.core
            .enqueue(TelnetFrame::Subnegotiate(self.option, payload));
    }

    /// Applies capability changes in order, firing the host callback per
    /// change.
    pub async fn change_capabilities(
        &mut self,
        changes: &[CapabilityChange],
    ) -> EngineResult<()> {
        self.core.change_capabilities(changes).await
    }

    /// Fires the host's GMCP callback.
    pub async fn emit_gmcp(&mut self, package: String, data: Option<Value>) -> EngineResult<()> {
        self.core
            .events
            .gmcp(package, data)
            .await
            .map_err(EngineError::Callback)
    }

    /// The JSON codec configured on the engine.
    pub fn json(&self) -> &dyn JsonCodec {
        &*self.core.json
    }

    /// Appends a transformer to the outbound (compression) chain, owned by
    /// this handler's option.
    pub fn install_outbound(&mut self, transform: Box<dyn OutboundTransform>) {
        self.core.install_outbound(self.option, transform);
    }

    /// Appends a transformer to the inbound (decompression) chain, owned by
    /// this handler's option.
    pub fn install_inbound(&mut self, transform: Box<dyn InboundTransform>) {
        self.core.install_inbound(self.option, transform);
    }

    /// Mutable access to the engine's parse buffer.
    ///
    /// Only MCCP3 has business here: its activation must decompress the
    /// not-yet-parsed residue in place. The dispatch loop re-reads the
    /// buffer length every iteration, so replacing the contents mid-loop is
    /// safe.
    pub fn parse_buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.core.in_buffer
    }
}

///
/// One negotiable Telnet option: a dual-side state machine plus whatever
/// subnegotiation protocol the option speaks.
///
/// Default method bodies give the common behavior: enables and rejects
/// settle the completion signal, everything else is a no-op. Handlers with
/// a staged protocol of their own (MTTS, CHARSET) override the enable hooks
/// and settle the signal when their protocol terminates.
///
#[async_trait]
pub trait TelnetOptionHandler: Send {
    /// The option this handler negotiates.
    fn option(&self) -> TelnetOption;

    /// Support flags and start-up behavior.
    fn config(&self) -> OptionConfig;

    /// A subnegotiation for this option arrived.
    async fn on_receive_subnegotiate(
        &mut self,
        _payload: Bytes,
        _ctx: &mut EngineContext<'_>,
    ) -> EngineResult<()> {
        Ok(())
    }

    /// A negotiation frame for this option is about to leave the engine.
    async fn on_send_negotiate(
        &mut self,
        _verb: NegotiationVerb,
        _ctx: &mut EngineContext<'_>,
    ) -> EngineResult<()> {
        Ok(())
    }

    /// A subnegotiation for this option is about to leave the engine. This
    /// is the MCCP2 activation point.
    async fn on_send_subnegotiate(
        &mut self,
        _payload: &Bytes,
        _ctx: &mut EngineContext<'_>,
    ) -> EngineResult<()> {
        Ok(())
    }

    /// The peer agreed that this engine performs the option.
    async fn on_local_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.complete();
        Ok(())
    }

    /// The peer asked this engine to stop performing the option.
    async fn on_local_disable(&mut self, _ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// The peer now performs the option.
    async fn on_remote_enable(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.complete();
        Ok(())
    }

    /// The peer stopped performing the option.
    async fn on_remote_disable(&mut self, _ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// The peer refused this engine's `WILL` offer.
    async fn on_local_reject(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.complete();
        Ok(())
    }

    /// The peer refused this engine's `DO` offer.
    async fn on_remote_reject(&mut self, ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        ctx.complete();
        Ok(())
    }

    /// An inbound transformer owned by this option reached its end of
    /// stream and was uninstalled.
    async fn on_inbound_end(&mut self, _ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// An inbound transformer owned by this option failed and was
    /// uninstalled.
    async fn on_inbound_error(&mut self, _ctx: &mut EngineContext<'_>) -> EngineResult<()> {
        Ok(())
    }
}

///
/// A registered handler with its negotiation state and completion signal.
/// The engine keeps slots in registration order, which fixes the order of
/// the opening salvo.
///
pub(crate) struct OptionSlot {
    pub(crate) option: TelnetOption,
    pub(crate) config: OptionConfig,
    pub(crate) state: OptionPerspective,
    pub(crate) signal: NegotiationHandle,
    pub(crate) handler: Box<dyn TelnetOptionHandler>,
}

impl OptionSlot {
    pub(crate) fn new(handler: Box<dyn TelnetOptionHandler>) -> OptionSlot {
        OptionSlot {
            option: handler.option(),
            config: handler.config(),
            state: OptionPerspective::default(),
            signal: NegotiationHandle::new(),
            handler,
        }
    }

    /// Emits this option's part of the opening salvo.
    pub(crate) fn start(&mut self, core: &mut EngineCore) {
        if self.config.start_local {
            core.enqueue(TelnetFrame::Will(self.option));
            self.state.local.negotiating = true;
        }
        if self.config.start_remote {
            core.enqueue(TelnetFrame::Do(self.option));
            self.state.remote.negotiating = true;
        }
    }

    /// Runs the dual-side verb table for a negotiation frame from the peer.
    pub(crate) async fn receive_negotiate(
        &mut self,
        verb: NegotiationVerb,
        core: &mut EngineCore,
    ) -> EngineResult<()> {
        match verb {
            NegotiationVerb::Will => {
                if !self.config.support_remote {
                    core.enqueue(TelnetFrame::Dont(self.option));
                    return Ok(());
                }
                if !self.state.remote.enabled {
                    self.state.remote.enabled = true;
                    if !self.state.remote.negotiating {
                        core.enqueue(TelnetFrame::Do(self.option));
                    }
                    let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
                    self.handler.on_remote_enable(&mut ctx).await?;
                    self.state.remote.negotiating = false;
                }
            }
            NegotiationVerb::Do => {
                if !self.config.support_local {
                    core.enqueue(TelnetFrame::Wont(self.option));
                    return Ok(());
                }
                if !self.state.local.enabled {
                    self.state.local.enabled = true;
                    if !self.state.local.negotiating {
                        core.enqueue(TelnetFrame::Will(self.option));
                    }
                    let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
                    self.handler.on_local_enable(&mut ctx).await?;
                    self.state.local.negotiating = false;
                }
            }
            NegotiationVerb::Wont => {
                if !self.config.support_remote {
                    return Ok(());
                }
                if self.state.remote.enabled {
                    self.state.remote.enabled = false;
                    let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
                    self.handler.on_remote_disable(&mut ctx).await?;
                }
                if self.state.remote.negotiating {
                    self.state.remote.negotiating = false;
                    let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
                    self.handler.on_remote_reject(&mut ctx).await?;
                }
            }
            NegotiationVerb::Dont => {
                if !self.config.support_local {
                    return Ok(());
                }
                if self.state.local.enabled {
                    self.state.local.enabled = false;
                    let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
                    self.handler.on_local_disable(&mut ctx).await?;
                }
                if self.state.local.negotiating {
                    self.state.local.negotiating = false;
                    let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
                    self.handler.on_local_reject(&mut ctx).await?;
                }
            }
        }
        Ok(())
    }

    pub(crate) async fn receive_subnegotiate(
        &mut self,
        payload: Bytes,
        core: &mut EngineCore,
    ) -> EngineResult<()> {
        let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
        self.handler.on_receive_subnegotiate(payload, &mut ctx).await
    }

    pub(crate) async fn sent_negotiate(
        &mut self,
        verb: NegotiationVerb,
        core: &mut EngineCore,
    ) -> EngineResult<()> {
        let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
        self.handler.on_send_negotiate(verb, &mut ctx).await
    }

    pub(crate) async fn sent_subnegotiate(
        &mut self,
        payload: &Bytes,
        core: &mut EngineCore,
    ) -> EngineResult<()> {
        let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
        self.handler.on_send_subnegotiate(payload, &mut ctx).await
    }

    pub(crate) async fn inbound_finished(&mut self, core: &mut EngineCore) -> EngineResult<()> {
        let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
        self.handler.on_inbound_end(&mut ctx).await
    }

    pub(crate) async fn inbound_failed(&mut self, core: &mut EngineCore) -> EngineResult<()> {
        let mut ctx = EngineContext::new(core, self.option, self.signal.clone());
        self.handler.on_inbound_error(&mut ctx).await
    }
}
