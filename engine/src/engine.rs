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

use crate::capabilities::{CapabilityChange, ClientCapabilities};
use crate::error::{EngineError, EngineResult};
use crate::events::{NullEvents, SessionEvents};
use crate::handler::{OptionSlot, TelnetOptionHandler};
use crate::json::{JsonCodec, SerdeJson};
use crate::options::{gmcp, mssp, standard_options};
use crate::signal::NegotiationHandle;
use crate::text::{TextEncoding, ensure_crlf};
use bytes::{Buf, Bytes, BytesMut};
use mudlink_compress::{InboundTransform, Inflated, OutboundTransform};
use mudlink_telnetcodec::{NegotiationVerb, TelnetFrame, TelnetOption, parser};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Construction parameters for a [`TelnetEngine`].
///
/// The default configuration registers [`standard_options`], swallows every
/// event, decodes inbound text as UTF-8, and encodes GMCP with `serde_json`.
pub struct EngineConfig {
    /// Initial capability record
    pub capabilities: ClientCapabilities,
    /// Option handlers, in the order their opening salvo should fire
    pub handlers: Vec<Box<dyn TelnetOptionHandler>>,
    /// Host callbacks
    pub events: Box<dyn SessionEvents>,
    /// Encoding for inbound line decoding
    pub text_encoding: TextEncoding,
    /// JSON codec for GMCP payloads
    pub json: Box<dyn JsonCodec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            capabilities: ClientCapabilities::default(),
            handlers: standard_options(),
            events: Box::new(NullEvents),
            text_encoding: TextEncoding::default(),
            json: Box::new(SerdeJson),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> EngineConfig {
        EngineConfig::default()
    }

    /// Replaces the registered option handlers.
    pub fn with_handlers(mut self, handlers: Vec<Box<dyn TelnetOptionHandler>>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Sets the host event callbacks.
    pub fn with_events(mut self, events: impl SessionEvents + 'static) -> Self {
        self.events = Box::new(events);
        self
    }

    /// Sets the initial capability record.
    pub fn with_capabilities(mut self, capabilities: ClientCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the inbound text encoding.
    pub fn with_text_encoding(mut self, encoding: TextEncoding) -> Self {
        self.text_encoding = encoding;
        self
    }

    /// Replaces the GMCP JSON codec.
    pub fn with_json(mut self, json: impl JsonCodec + 'static) -> Self {
        self.json = Box::new(json);
        self
    }
}

pub(crate) struct InboundEntry {
    pub(crate) option: TelnetOption,
    pub(crate) transform: Box<dyn InboundTransform>,
}

pub(crate) struct OutboundEntry {
    pub(crate) option: TelnetOption,
    pub(crate) transform: Box<dyn OutboundTransform>,
}

/// Everything handler hooks may touch, split from the slot list so a hook
/// can borrow the core while its own slot stays borrowed by the dispatcher.
pub(crate) struct EngineCore {
    pub(crate) capabilities: ClientCapabilities,
    pub(crate) events: Box<dyn SessionEvents>,
    pub(crate) json: Box<dyn JsonCodec>,
    pub(crate) text_encoding: TextEncoding,
    pub(crate) in_buffer: BytesMut,
    pub(crate) app_data: BytesMut,
    pub(crate) out_tx: mpsc::UnboundedSender<TelnetFrame>,
    pub(crate) in_chain: Vec<InboundEntry>,
    pub(crate) out_chain: Vec<OutboundEntry>,
}

impl EngineCore {
    /// Queues a frame for the output stream. Infallible: the engine owns
    /// the receiving half for its whole lifetime.
    pub(crate) fn enqueue(&self, frame: TelnetFrame) {
        self.out_tx.send(frame).ok();
    }

    pub(crate) async fn change_capabilities(
        &mut self,
        changes: &[CapabilityChange],
    ) -> EngineResult<()> {
        for change in changes {
            change.apply(&mut self.capabilities);
            self.events
                .capability_changed(change)
                .await
                .map_err(EngineError::Callback)?;
        }
        Ok(())
    }

    pub(crate) fn install_inbound(
        &mut self,
        option: TelnetOption,
        transform: Box<dyn InboundTransform>,
    ) {
        self.in_chain.push(InboundEntry { option, transform });
    }

    pub(crate) fn install_outbound(
        &mut self,
        option: TelnetOption,
        transform: Box<dyn OutboundTransform>,
    ) {
        self.out_chain.push(OutboundEntry { option, transform });
    }
}

///
/// A per-connection MUD Telnet protocol engine.
///
/// The engine owns no socket. A host feeds raw reads into
/// [`receive_data`](TelnetEngine::receive_data) and drains
/// [`next_output`](TelnetEngine::next_output) into its writer. Everything
/// between (frame parsing, option negotiation, capability tracking, MCCP
/// compression, line assembly) happens in here and surfaces through
/// [`SessionEvents`].
///
/// The engine is single-task cooperative: it holds no locks, and a host
/// that touches it from several tasks must serialize access itself.
///
/// # Example
///
/// ```no_run
/// use mudlink_engine::{EngineConfig, TelnetEngine};
///
/// # async fn example(socket_bytes: &[u8]) -> mudlink_engine::EngineResult<()> {
/// let mut engine = TelnetEngine::new(EngineConfig::new());
/// let handles = engine.start();
/// // feed socket reads:
/// engine.receive_data(socket_bytes).await?;
/// // drain what the engine wants to send:
/// while let Some(_chunk) = engine.try_next_output().await? {
///     // write the chunk to the socket
/// }
/// # let _ = handles;
/// # Ok(())
/// # }
/// ```
pub struct TelnetEngine {
    core: EngineCore,
    slots: Vec<OptionSlot>,
    out_rx: mpsc::UnboundedReceiver<TelnetFrame>,
}

impl TelnetEngine {
    /// Builds an engine from a configuration.
    pub fn new(config: EngineConfig) -> TelnetEngine {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        TelnetEngine {
            core: EngineCore {
                capabilities: config.capabilities,
                events: config.events,
                json: config.json,
                text_encoding: config.text_encoding,
                in_buffer: BytesMut::new(),
                app_data: BytesMut::new(),
                out_tx,
                in_chain: Vec::new(),
                out_chain: Vec::new(),
            },
            slots: config.handlers.into_iter().map(OptionSlot::new).collect(),
            out_rx,
        }
    }

    /// Fires the opening WILL/DO salvo and returns one completion handle
    /// per registered handler, in registration order.
    ///
    /// Hosts should wait on the handles under a timeout: clients that do
    /// not speak an option often ignore the offer entirely, in which case
    /// only the timeout resolves the wait.
    pub fn start(&mut self) -> Vec<NegotiationHandle> {
        for slot in &mut self.slots {
            slot.start(&mut self.core);
        }
        self.slots.iter().map(|slot| slot.signal.clone()).collect()
    }

    /// The completion handle for one option, if a handler is registered.
    pub fn negotiation_handle(&self, option: TelnetOption) -> Option<NegotiationHandle> {
        self.slots
            .iter()
            .find(|slot| slot.option == option)
            .map(|slot| slot.signal.clone())
    }

    /// Read access to the capability record.
    pub fn capabilities(&self) -> &ClientCapabilities {
        &self.core.capabilities
    }

    /// True if this engine currently performs `option`.
    pub fn is_enabled_local(&self, option: TelnetOption) -> bool {
        self.slots
            .iter()
            .find(|slot| slot.option == option)
            .is_some_and(|slot| slot.state.local.enabled)
    }

    /// True if the peer currently performs `option`.
    pub fn is_enabled_remote(&self, option: TelnetOption) -> bool {
        self.slots
            .iter()
            .find(|slot| slot.option == option)
            .is_some_and(|slot| slot.state.remote.enabled)
    }

    /// Bytes sitting in the parse buffer awaiting a complete frame.
    ///
    /// Also returned by [`receive_data`](TelnetEngine::receive_data); a
    /// host enforcing backpressure should watch this number.
    pub fn buffered_input(&self) -> usize {
        self.core.in_buffer.len()
    }

    /// Feeds raw bytes from the transport into the engine.
    ///
    /// The bytes pass through the inbound transformer chain (MCCP3), land
    /// in the parse buffer, and every complete frame is dispatched before
    /// the call returns. Returns the residual parse buffer size.
    pub async fn receive_data(&mut self, data: &[u8]) -> EngineResult<usize> {
        let mut incoming = data.to_vec();
        let mut index = 0;
        loop {
            let (option, outcome) = match self.core.in_chain.get_mut(index) {
                None => break,
                Some(entry) => (entry.option, entry.transform.transform_in(&incoming)),
            };
            match outcome {
                Ok(Inflated { bytes, finished }) => {
                    incoming = bytes;
                    if finished {
                        self.core.in_chain.remove(index);
                        self.notify_inbound_end(option).await?;
                    } else {
                        index += 1;
                    }
                }
                Err(err) => {
                    warn!(%option, error = %err, "inbound transformer failed, uninstalling");
                    self.core.in_chain.remove(index);
                    self.notify_inbound_error(option).await?;
                    return Ok(self.core.in_buffer.len());
                }
            }
        }

        self.core.in_buffer.extend_from_slice(&incoming);

        // MCCP3 activation may replace the buffer inside dispatch, so the
        // length is re-read from the buffer on every pass.
        loop {
            let (consumed, frame) = parser::parse(&self.core.in_buffer);
            let Some(frame) = frame else { break };
            self.core.in_buffer.advance(consumed);
            self.dispatch(frame).await?;
        }

        Ok(self.core.in_buffer.len())
    }

    /// Waits for the next queued frame, serializes it through the outbound
    /// transformer chain, and returns the wire bytes.
    ///
    /// Frames come out in enqueue order; this is a single-consumer stream.
    /// `Ok(None)` means the engine was torn down.
    pub async fn next_output(&mut self) -> EngineResult<Option<Bytes>> {
        match self.out_rx.recv().await {
            Some(frame) => Ok(Some(self.encode_outgoing(frame).await?)),
            None => Ok(None),
        }
    }

    /// Like [`next_output`](TelnetEngine::next_output) but returns
    /// `Ok(None)` immediately when nothing is queued.
    pub async fn try_next_output(&mut self) -> EngineResult<Option<Bytes>> {
        match self.out_rx.try_recv() {
            Ok(frame) => Ok(Some(self.encode_outgoing(frame).await?)),
            Err(_) => Ok(None),
        }
    }

    /// Canonicalizes line endings and queues the text as application data.
    ///
    /// No terminator is appended; use [`send_line`](TelnetEngine::send_line)
    /// for that. Any `0xFF` byte is escaped during serialization.
    pub fn send_text(&mut self, text: &str) {
        let converted = ensure_crlf(text);
        self.core
            .enqueue(TelnetFrame::Data(Bytes::from(converted.into_bytes())));
    }

    /// [`send_text`](TelnetEngine::send_text) with a guaranteed trailing
    /// newline.
    pub fn send_line(&mut self, text: &str) {
        if text.ends_with('\n') {
            self.send_text(text);
        } else {
            let mut line = text.to_string();
            line.push('\n');
            self.send_text(&line);
        }
    }

    /// Queues a GMCP message, if the client negotiated GMCP. A no-op
    /// otherwise.
    pub fn send_gmcp(&mut self, package: &str, data: Option<&Value>) {
        if !self.core.capabilities.gmcp {
            debug!(package, "dropping GMCP message, client did not negotiate GMCP");
            return;
        }
        let payload = gmcp::encode_gmcp(package, data, &*self.core.json);
        self.core
            .enqueue(TelnetFrame::Subnegotiate(TelnetOption::GMCP, payload));
    }

    /// Queues an MSSP status broadcast, if the client negotiated MSSP and
    /// the pair list is non-empty.
    pub fn send_mssp<K: AsRef<str>, V: AsRef<str>>(&mut self, pairs: &[(K, V)]) {
        if !self.core.capabilities.mssp || pairs.is_empty() {
            return;
        }
        self.core.enqueue(TelnetFrame::Subnegotiate(
            TelnetOption::MSSP,
            mssp::encode_mssp(pairs),
        ));
    }

    /// Applies capability changes in order, firing the host callback for
    /// each.
    pub async fn change_capabilities(&mut self, changes: &[CapabilityChange]) -> EngineResult<()> {
        self.core.change_capabilities(changes).await
    }

    async fn dispatch(&mut self, frame: TelnetFrame) -> EngineResult<()> {
        match frame {
            TelnetFrame::Data(data) => self.handle_data(&data).await,
            TelnetFrame::Command(command) => self
                .core
                .events
                .command(command)
                .await
                .map_err(EngineError::Callback),
            TelnetFrame::Will(option) => self.handle_negotiate(NegotiationVerb::Will, option).await,
            TelnetFrame::Wont(option) => self.handle_negotiate(NegotiationVerb::Wont, option).await,
            TelnetFrame::Do(option) => self.handle_negotiate(NegotiationVerb::Do, option).await,
            TelnetFrame::Dont(option) => self.handle_negotiate(NegotiationVerb::Dont, option).await,
            TelnetFrame::Subnegotiate(option, payload) => {
                match self.slots.iter_mut().find(|slot| slot.option == option) {
                    Some(slot) => slot.receive_subnegotiate(payload, &mut self.core).await,
                    None => {
                        debug!(%option, "dropping subnegotiation for unhandled option");
                        Ok(())
                    }
                }
            }
        }
    }

    async fn handle_negotiate(
        &mut self,
        verb: NegotiationVerb,
        option: TelnetOption,
    ) -> EngineResult<()> {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.option == option) {
            return slot.receive_negotiate(verb, &mut self.core).await;
        }
        // Nobody registered for it: the polite refusal.
        match verb {
            NegotiationVerb::Will => self.core.enqueue(TelnetFrame::Dont(option)),
            NegotiationVerb::Do => self.core.enqueue(TelnetFrame::Wont(option)),
            NegotiationVerb::Wont | NegotiationVerb::Dont => {
                debug!(%verb, %option, "ignoring refusal for unhandled option");
            }
        }
        Ok(())
    }

    async fn handle_data(&mut self, data: &[u8]) -> EngineResult<()> {
        self.core.app_data.extend_from_slice(data);
        while let Some(newline) = self
            .core
            .app_data
            .iter()
            .position(|byte| *byte == b'\n')
        {
            let mut line = self.core.app_data.split_to(newline + 1);
            while line.last().is_some_and(|byte| matches!(*byte, b'\r' | b'\n')) {
                line.truncate(line.len() - 1);
            }
            let text = self.core.text_encoding.decode_lossy(&line);
            self.core
                .events
                .line(text)
                .await
                .map_err(EngineError::Callback)?;
        }
        Ok(())
    }

    async fn encode_outgoing(&mut self, frame: TelnetFrame) -> EngineResult<Bytes> {
        let mut wire = BytesMut::with_capacity(frame.wire_len());
        frame.serialize(&mut wire);
        let mut encoded = wire.to_vec();
        for entry in &mut self.core.out_chain {
            let option = entry.option;
            encoded = match entry.transform.transform_out(&encoded) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(%option, error = %err, "outbound transformer failed");
                    return Err(EngineError::Transform(err));
                }
            };
        }
        // Send-side hooks run after the bytes are final: a transformer
        // installed here first applies to the next frame, which is how the
        // MCCP2 activation subnegotiation itself stays uncompressed.
        match &frame {
            TelnetFrame::Will(option) => {
                self.notify_sent_negotiate(NegotiationVerb::Will, *option)
                    .await?;
            }
            TelnetFrame::Wont(option) => {
                self.notify_sent_negotiate(NegotiationVerb::Wont, *option)
                    .await?;
            }
            TelnetFrame::Do(option) => {
                self.notify_sent_negotiate(NegotiationVerb::Do, *option)
                    .await?;
            }
            TelnetFrame::Dont(option) => {
                self.notify_sent_negotiate(NegotiationVerb::Dont, *option)
                    .await?;
            }
            TelnetFrame::Subnegotiate(option, payload) => {
                let (option, payload) = (*option, payload.clone());
                if let Some(slot) = self.slots.iter_mut().find(|slot| slot.option == option) {
                    slot.sent_subnegotiate(&payload, &mut self.core).await?;
                }
            }
            TelnetFrame::Data(_) | TelnetFrame::Command(_) => {}
        }
        Ok(Bytes::from(encoded))
    }

    async fn notify_sent_negotiate(
        &mut self,
        verb: NegotiationVerb,
        option: TelnetOption,
    ) -> EngineResult<()> {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.option == option) {
            slot.sent_negotiate(verb, &mut self.core).await?;
        }
        Ok(())
    }

    async fn notify_inbound_end(&mut self, option: TelnetOption) -> EngineResult<()> {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.option == option) {
            slot.inbound_finished(&mut self.core).await?;
        }
        Ok(())
    }

    async fn notify_inbound_error(&mut self, option: TelnetOption) -> EngineResult<()> {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.option == option) {
            slot.inbound_failed(&mut self.core).await?;
        }
        Ok(())
    }
}
