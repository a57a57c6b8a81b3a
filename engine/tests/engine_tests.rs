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

//! End-to-end engine scenarios
//!
//! Each test drives a full engine against scripted peer bytes and checks
//! the outbound wire, the capability record, and the events surfaced to
//! the host.

use async_trait::async_trait;
use mudlink_compress::{InboundTransform, OutboundTransform, ZlibDeflater, ZlibInflater};
use mudlink_engine::options::{CharsetOption, Mccp2Option, Mccp3Option};
use mudlink_engine::{
    CallbackError, CapabilityChange, ColorDepth, EngineConfig, SessionEvents, TelnetEngine,
    TelnetOption,
};
use mudlink_telnetcodec::consts;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Line(String),
    Command(u8),
    Capability(CapabilityChange),
    Gmcp(String, Option<Value>),
}

/// A [`SessionEvents`] sink the test keeps a handle on.
#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn lines(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                Event::Line(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SessionEvents for Recorder {
    async fn line(&mut self, line: String) -> Result<(), CallbackError> {
        self.events.lock().unwrap().push(Event::Line(line));
        Ok(())
    }

    async fn command(&mut self, command: u8) -> Result<(), CallbackError> {
        self.events.lock().unwrap().push(Event::Command(command));
        Ok(())
    }

    async fn capability_changed(&mut self, change: &CapabilityChange) -> Result<(), CallbackError> {
        self.events
            .lock()
            .unwrap()
            .push(Event::Capability(change.clone()));
        Ok(())
    }

    async fn gmcp(&mut self, package: String, data: Option<Value>) -> Result<(), CallbackError> {
        self.events.lock().unwrap().push(Event::Gmcp(package, data));
        Ok(())
    }
}

fn standard_engine(recorder: &Recorder) -> TelnetEngine {
    TelnetEngine::new(EngineConfig::new().with_events(recorder.clone()))
}

async fn drain(engine: &mut TelnetEngine) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = engine.try_next_output().await.expect("encode output") {
        out.extend_from_slice(&chunk);
    }
    out
}

fn negotiate(verb: u8, option: u8) -> Vec<u8> {
    vec![consts::IAC, verb, option]
}

fn subnegotiate(option: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![consts::IAC, consts::SB, option];
    out.extend_from_slice(payload);
    out.extend_from_slice(&[consts::IAC, consts::SE]);
    out
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

// ============================================================================
// Scenario S1: NAWS
// ============================================================================

#[tokio::test]
async fn naws_reports_window_size() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);

    engine
        .receive_data(&negotiate(consts::WILL, consts::option::NAWS))
        .await
        .unwrap();
    let out = drain(&mut engine).await;
    assert!(contains(&out, &[consts::IAC, consts::DO, consts::option::NAWS]));
    assert!(engine.capabilities().naws);
    assert!(engine.is_enabled_remote(TelnetOption::NAWS));

    engine
        .receive_data(&subnegotiate(consts::option::NAWS, &[0x00, 0x50, 0x00, 0x18]))
        .await
        .unwrap();
    assert_eq!(engine.capabilities().width, 80);
    assert_eq!(engine.capabilities().height, 24);

    let events = recorder.take();
    assert_eq!(
        events,
        vec![
            Event::Capability(CapabilityChange::Naws(true)),
            Event::Capability(CapabilityChange::Width(80)),
            Event::Capability(CapabilityChange::Height(24)),
        ]
    );
}

#[tokio::test]
async fn short_naws_payload_is_ignored() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine
        .receive_data(&negotiate(consts::WILL, consts::option::NAWS))
        .await
        .unwrap();
    recorder.take();

    engine
        .receive_data(&subnegotiate(consts::option::NAWS, &[0x00, 0x50]))
        .await
        .unwrap();
    assert_eq!(engine.capabilities().width, 78);
    assert!(recorder.take().is_empty());
}

// ============================================================================
// Scenario S2: CHARSET
// ============================================================================

#[tokio::test]
async fn charset_requests_then_stores_accepted_encoding() {
    let recorder = Recorder::default();
    let mut engine = TelnetEngine::new(
        EngineConfig::new()
            .with_handlers(vec![Box::new(CharsetOption::default())])
            .with_events(recorder.clone()),
    );

    let handles = engine.start();
    assert_eq!(handles.len(), 1);
    let out = drain(&mut engine).await;
    assert_eq!(
        out,
        [
            negotiate(consts::WILL, consts::option::CHARSET),
            negotiate(consts::DO, consts::option::CHARSET),
        ]
        .concat()
    );

    // Client permits our side: one REQUEST goes out.
    engine
        .receive_data(&negotiate(consts::DO, consts::option::CHARSET))
        .await
        .unwrap();
    let out = drain(&mut engine).await;
    let mut request = vec![consts::charset::REQUEST];
    request.extend_from_slice(b" ascii utf-8");
    assert_eq!(out, subnegotiate(consts::option::CHARSET, &request));
    assert!(!handles[0].is_set());

    // The client's own WILL must not trigger a second REQUEST.
    engine
        .receive_data(&negotiate(consts::WILL, consts::option::CHARSET))
        .await
        .unwrap();
    assert!(drain(&mut engine).await.is_empty());

    let mut accepted = vec![consts::charset::ACCEPTED];
    accepted.extend_from_slice(b"utf-8");
    engine
        .receive_data(&subnegotiate(consts::option::CHARSET, &accepted))
        .await
        .unwrap();
    assert_eq!(engine.capabilities().encoding, "utf-8");
    assert!(handles[0].is_set());
}

// ============================================================================
// Scenario S3: line framing
// ============================================================================

#[tokio::test]
async fn lines_split_on_newline_and_strip_terminators() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine.receive_data(b"hello\r\nworld\n").await.unwrap();
    assert_eq!(recorder.lines(), vec!["hello", "world"]);
}

#[tokio::test]
async fn partial_line_waits_for_newline() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine.receive_data(b"north").await.unwrap();
    assert!(recorder.lines().is_empty());
    engine.receive_data(b"east\n").await.unwrap();
    assert_eq!(recorder.lines(), vec!["northeast"]);
}

// ============================================================================
// Scenario S4: IAC escape in data
// ============================================================================

#[tokio::test]
async fn escaped_iac_is_data_not_a_line() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine
        .receive_data(&[0x41, consts::IAC, consts::IAC, 0x42])
        .await
        .unwrap();
    assert!(recorder.take().is_empty());

    // The 0xFF byte is not valid UTF-8 and is skipped by the lossy decode.
    engine.receive_data(b"\n").await.unwrap();
    assert_eq!(recorder.lines(), vec!["AB"]);
}

// ============================================================================
// Scenario S5: MTTS three-stage probe
// ============================================================================

#[tokio::test]
async fn mtts_probes_three_times_and_decodes_the_bitmask() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    let probe = subnegotiate(consts::option::TTYPE, &[consts::ttype::SEND]);

    engine
        .receive_data(&negotiate(consts::WILL, consts::option::TTYPE))
        .await
        .unwrap();
    assert!(engine.capabilities().mtts);
    let out = drain(&mut engine).await;
    assert!(contains(&out, &probe), "first probe after enable");

    let handle = engine.negotiation_handle(TelnetOption::TerminalType).unwrap();

    let mut reply = vec![consts::ttype::IS];
    reply.extend_from_slice(b"MUDLET 4.10.0");
    engine
        .receive_data(&subnegotiate(consts::option::TTYPE, &reply))
        .await
        .unwrap();
    assert_eq!(engine.capabilities().client_name, "MUDLET");
    assert_eq!(engine.capabilities().client_version, "4.10.0");
    assert_eq!(engine.capabilities().color, ColorDepth::Xterm256);
    assert!(contains(&drain(&mut engine).await, &probe), "second probe");
    assert!(!handle.is_set());

    let mut reply = vec![consts::ttype::IS];
    reply.extend_from_slice(b"XTERM-256COLOR");
    engine
        .receive_data(&subnegotiate(consts::option::TTYPE, &reply))
        .await
        .unwrap();
    assert!(contains(&drain(&mut engine).await, &probe), "third probe");
    assert!(!handle.is_set());

    // 2349 = ansi + utf8 + xterm256 + osc palette + truecolor + encryption
    let mut reply = vec![consts::ttype::IS];
    reply.extend_from_slice(b"MTTS 2349");
    engine
        .receive_data(&subnegotiate(consts::option::TTYPE, &reply))
        .await
        .unwrap();

    let caps = engine.capabilities();
    assert_eq!(caps.color, ColorDepth::TrueColor);
    assert_eq!(caps.encoding, "utf-8");
    assert!(caps.osc_color_palette);
    assert!(caps.tls_support);
    assert!(!caps.mouse_tracking);
    assert!(!caps.screen_reader);
    assert!(handle.is_set());
}

#[tokio::test]
async fn mtts_repeated_reply_ends_the_probe_early() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine
        .receive_data(&negotiate(consts::WILL, consts::option::TTYPE))
        .await
        .unwrap();
    let handle = engine.negotiation_handle(TelnetOption::TerminalType).unwrap();

    let mut reply = vec![consts::ttype::IS];
    reply.extend_from_slice(b"ANSI");
    engine
        .receive_data(&subnegotiate(consts::option::TTYPE, &reply))
        .await
        .unwrap();
    assert!(!handle.is_set());

    // Same answer again: the client cycles a single terminal type.
    engine
        .receive_data(&subnegotiate(consts::option::TTYPE, &reply))
        .await
        .unwrap();
    assert!(handle.is_set());
}

// ============================================================================
// Scenario S6: MCCP2
// ============================================================================

#[tokio::test]
async fn mccp2_compresses_only_after_its_announcement() {
    let recorder = Recorder::default();
    let mut engine = TelnetEngine::new(
        EngineConfig::new()
            .with_handlers(vec![Box::new(Mccp2Option::default())])
            .with_events(recorder.clone()),
    );

    engine.start();
    let offer = engine.try_next_output().await.unwrap().unwrap();
    assert_eq!(&offer[..], &negotiate(consts::WILL, consts::option::MCCP2)[..]);

    engine
        .receive_data(&negotiate(consts::DO, consts::option::MCCP2))
        .await
        .unwrap();
    assert!(engine.capabilities().mccp2);

    // The announcement itself leaves uncompressed.
    let announcement = engine.try_next_output().await.unwrap().unwrap();
    assert_eq!(
        &announcement[..],
        &subnegotiate(consts::option::MCCP2, &[])[..]
    );
    assert!(engine.capabilities().mccp2_enabled);

    // Everything after it is a sync-flushed zlib stream.
    engine.send_text("hi");
    let compressed = engine.try_next_output().await.unwrap().unwrap();
    assert_ne!(&compressed[..], b"hi");
    let mut inflater = ZlibInflater::new();
    let inflated = inflater.transform_in(&compressed).unwrap();
    assert_eq!(inflated.bytes, b"hi");
}

// ============================================================================
// MCCP3
// ============================================================================

#[tokio::test]
async fn mccp3_inflates_the_buffered_remainder_and_later_reads() {
    let recorder = Recorder::default();
    let mut engine = TelnetEngine::new(
        EngineConfig::new()
            .with_handlers(vec![Box::new(Mccp3Option::default())])
            .with_events(recorder.clone()),
    );

    engine
        .receive_data(&negotiate(consts::DO, consts::option::MCCP3))
        .await
        .unwrap();
    assert!(engine.capabilities().mccp3);
    let out = drain(&mut engine).await;
    assert!(contains(&out, &negotiate(consts::WILL, consts::option::MCCP3)));

    // The client's compressor: same sync-flushed zlib stream shape.
    let mut client_deflater = ZlibDeflater::new();
    let mut wire = subnegotiate(consts::option::MCCP3, &[]);
    wire.extend_from_slice(&client_deflater.transform_out(b"say hello\r\n").unwrap());
    engine.receive_data(&wire).await.unwrap();

    assert!(engine.capabilities().mccp3_enabled);
    assert_eq!(recorder.lines(), vec!["say hello"]);

    // Subsequent reads flow through the installed inflater.
    let more = client_deflater.transform_out(b"north\n").unwrap();
    engine.receive_data(&more).await.unwrap();
    assert_eq!(recorder.lines(), vec!["say hello", "north"]);
}

#[tokio::test]
async fn mccp3_garbage_stream_disables_and_sends_wont() {
    let recorder = Recorder::default();
    let mut engine = TelnetEngine::new(
        EngineConfig::new()
            .with_handlers(vec![Box::new(Mccp3Option::default())])
            .with_events(recorder.clone()),
    );
    engine
        .receive_data(&negotiate(consts::DO, consts::option::MCCP3))
        .await
        .unwrap();
    drain(&mut engine).await;

    let mut wire = subnegotiate(consts::option::MCCP3, &[]);
    wire.extend_from_slice(&[0x00, 0x01, 0x02, 0x03]);
    engine.receive_data(&wire).await.unwrap();

    assert!(!engine.capabilities().mccp3_enabled);
    let out = drain(&mut engine).await;
    assert!(contains(&out, &negotiate(consts::WONT, consts::option::MCCP3)));
}

// ============================================================================
// Polite refusal and negotiation convergence
// ============================================================================

#[tokio::test]
async fn unknown_options_get_the_polite_refusal() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);

    engine.receive_data(&negotiate(consts::WILL, 199)).await.unwrap();
    assert_eq!(drain(&mut engine).await, negotiate(consts::DONT, 199));

    engine.receive_data(&negotiate(consts::DO, 199)).await.unwrap();
    assert_eq!(drain(&mut engine).await, negotiate(consts::WONT, 199));

    engine.receive_data(&negotiate(consts::WONT, 199)).await.unwrap();
    engine.receive_data(&negotiate(consts::DONT, 199)).await.unwrap();
    assert!(drain(&mut engine).await.is_empty());
}

#[tokio::test]
async fn start_salvo_follows_registration_order() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine.start();
    let out = drain(&mut engine).await;
    let expected = [
        negotiate(consts::WILL, consts::option::SGA),
        negotiate(consts::DO, consts::option::NAWS),
        negotiate(consts::WILL, consts::option::CHARSET),
        negotiate(consts::DO, consts::option::CHARSET),
        negotiate(consts::DO, consts::option::TTYPE),
        negotiate(consts::WILL, consts::option::MSSP),
        negotiate(consts::WILL, consts::option::MCCP2),
        negotiate(consts::WILL, consts::option::MCCP3),
        negotiate(consts::WILL, consts::option::GMCP),
        negotiate(consts::WILL, consts::option::LINEMODE),
    ]
    .concat();
    assert_eq!(out, expected);
}

#[tokio::test]
async fn refused_offers_settle_every_started_signal() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    let handles = engine.start();
    drain(&mut engine).await;

    let refusals = [
        negotiate(consts::DONT, consts::option::SGA),
        negotiate(consts::WONT, consts::option::NAWS),
        negotiate(consts::DONT, consts::option::CHARSET),
        negotiate(consts::WONT, consts::option::CHARSET),
        negotiate(consts::WONT, consts::option::TTYPE),
        negotiate(consts::DONT, consts::option::MSSP),
        negotiate(consts::DONT, consts::option::MCCP2),
        negotiate(consts::DONT, consts::option::MCCP3),
        negotiate(consts::DONT, consts::option::GMCP),
        negotiate(consts::DONT, consts::option::LINEMODE),
    ]
    .concat();
    engine.receive_data(&refusals).await.unwrap();

    // Everything that was offered resolves; EOR never starts, so only the
    // host's timeout would resolve it.
    for handle in &handles[..handles.len() - 1] {
        assert!(handle.is_set());
    }
    assert!(!handles[handles.len() - 1].is_set());
    assert!(drain(&mut engine).await.is_empty());
}

#[tokio::test]
async fn eor_offer_from_the_peer_is_accepted() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine
        .receive_data(&negotiate(consts::WILL, consts::option::EOR))
        .await
        .unwrap();
    assert_eq!(
        drain(&mut engine).await,
        negotiate(consts::DO, consts::option::EOR)
    );
    assert!(engine.is_enabled_remote(TelnetOption::EndOfRecord));
    assert!(
        engine
            .negotiation_handle(TelnetOption::EndOfRecord)
            .unwrap()
            .is_set()
    );
}

#[tokio::test]
async fn accepted_offers_settle_signals_exactly_once() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine.start();
    drain(&mut engine).await;

    engine
        .receive_data(&negotiate(consts::DO, consts::option::SGA))
        .await
        .unwrap();
    let handle = engine
        .negotiation_handle(TelnetOption::SuppressGoAhead)
        .unwrap();
    assert!(handle.is_set());
    assert!(engine.is_enabled_local(TelnetOption::SuppressGoAhead));

    // Because the offer was ours, the acceptance draws no extra reply.
    assert!(drain(&mut engine).await.is_empty());
}

// ============================================================================
// GMCP
// ============================================================================

#[tokio::test]
async fn gmcp_round_trips_and_tolerates_bad_json() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);

    // Gated until negotiated.
    engine.send_gmcp("Core.Ping", None);
    assert!(drain(&mut engine).await.is_empty());

    engine
        .receive_data(&negotiate(consts::DO, consts::option::GMCP))
        .await
        .unwrap();
    assert!(engine.capabilities().gmcp);
    drain(&mut engine).await;
    recorder.take();

    engine.send_gmcp("Core.Ping", None);
    assert_eq!(
        drain(&mut engine).await,
        subnegotiate(consts::option::GMCP, b"Core.Ping")
    );

    let vitals = json!({"hp": 100});
    engine.send_gmcp("Char.Vitals", Some(&vitals));
    assert_eq!(
        drain(&mut engine).await,
        subnegotiate(consts::option::GMCP, br#"Char.Vitals {"hp":100}"#)
    );

    engine
        .receive_data(&subnegotiate(
            consts::option::GMCP,
            br#"Char.Login {"name":"bob"}"#,
        ))
        .await
        .unwrap();
    engine
        .receive_data(&subnegotiate(consts::option::GMCP, b"Broken {not json"))
        .await
        .unwrap();
    assert_eq!(
        recorder.take(),
        vec![
            Event::Gmcp("Char.Login".to_string(), Some(json!({"name": "bob"}))),
            Event::Gmcp("Broken".to_string(), None),
        ]
    );
}

// ============================================================================
// MSSP
// ============================================================================

#[tokio::test]
async fn mssp_broadcast_is_gated_and_encoded() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);

    engine.send_mssp(&[("NAME", "Moonshadow")]);
    assert!(drain(&mut engine).await.is_empty());

    engine
        .receive_data(&negotiate(consts::DO, consts::option::MSSP))
        .await
        .unwrap();
    assert!(engine.capabilities().mssp);
    drain(&mut engine).await;

    engine.send_mssp(&[("NAME", "Moonshadow"), ("PLAYERS", "17")]);
    let mut payload = vec![consts::mssp::VAR];
    payload.extend_from_slice(b"NAME");
    payload.push(consts::mssp::VAL);
    payload.extend_from_slice(b"Moonshadow");
    payload.push(consts::mssp::VAR);
    payload.extend_from_slice(b"PLAYERS");
    payload.push(consts::mssp::VAL);
    payload.extend_from_slice(b"17");
    assert_eq!(
        drain(&mut engine).await,
        subnegotiate(consts::option::MSSP, &payload)
    );
}

// ============================================================================
// Engine plumbing
// ============================================================================

#[tokio::test]
async fn commands_surface_through_the_callback() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine
        .receive_data(&[consts::IAC, consts::NOP, consts::IAC, consts::GA])
        .await
        .unwrap();
    assert_eq!(
        recorder.take(),
        vec![Event::Command(consts::NOP), Event::Command(consts::GA)]
    );
}

#[tokio::test]
async fn receive_data_reports_the_residual_buffer() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);

    let full = subnegotiate(consts::option::NAWS, &[0x00, 0x50, 0x00, 0x18]);
    let split = 4;
    let residual = engine.receive_data(&full[..split]).await.unwrap();
    assert_eq!(residual, split);
    assert_eq!(engine.buffered_input(), split);

    let residual = engine.receive_data(&full[split..]).await.unwrap();
    assert_eq!(residual, 0);
    assert_eq!(engine.capabilities().width, 80);
}

#[tokio::test]
async fn outbound_text_is_crlf_canonical() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine.send_line("look");
    assert_eq!(drain(&mut engine).await, b"look\r\n");

    engine.send_text("a\nb\r\nc");
    assert_eq!(drain(&mut engine).await, b"a\r\nb\r\nc");

    engine.send_line("done\n");
    assert_eq!(drain(&mut engine).await, b"done\r\n");
}

struct FailingEvents;

#[async_trait]
impl SessionEvents for FailingEvents {
    async fn line(&mut self, line: String) -> Result<(), CallbackError> {
        if line.contains("boom") {
            return Err("host refused the line".into());
        }
        Ok(())
    }
}

#[tokio::test]
async fn callback_errors_propagate_and_leave_the_engine_usable() {
    let mut engine = TelnetEngine::new(EngineConfig::new().with_events(FailingEvents));
    assert!(engine.receive_data(b"boom\n").await.is_err());

    // The failed line was consumed; the engine keeps working.
    let residual = engine.receive_data(b"ok\n").await.unwrap();
    assert_eq!(residual, 0);
}

#[tokio::test]
async fn host_capability_changes_fire_the_callback() {
    let recorder = Recorder::default();
    let mut engine = standard_engine(&recorder);
    engine
        .change_capabilities(&[CapabilityChange::ForceEndline(true)])
        .await
        .unwrap();
    assert!(engine.capabilities().force_endline);
    assert_eq!(
        recorder.take(),
        vec![Event::Capability(CapabilityChange::ForceEndline(true))]
    );
}
