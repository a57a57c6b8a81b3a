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

//! Incremental Telnet frame parser
//!
//! [`parse`] extracts at most one frame from the front of a buffer and
//! reports how many bytes it consumed. Callers append incoming bytes to a
//! growable buffer, call [`parse`] in a loop, and advance the buffer by the
//! consumed count after each frame. A return of `(0, None)` means the buffer
//! holds only a proper prefix of some frame and more bytes are needed.
//!
//! The function is pure: it never mutates its input and parsing the same
//! prefix twice yields the same result. This matters because MCCP3 is allowed
//! to swap out the caller's buffer between iterations of the parse loop.

use crate::{TelnetFrame, TelnetOption, consts};
use bytes::{Bytes, BytesMut};
use tracing::warn;

/// Parses at most one Telnet frame from the front of `buffer`.
///
/// Returns the number of bytes consumed and the frame, if a complete one was
/// present. A trailing `IAC` (or any other incomplete sequence) consumes
/// nothing; partial frames are never produced.
pub fn parse(buffer: &[u8]) -> (usize, Option<TelnetFrame>) {
    if buffer.is_empty() {
        return (0, None);
    }

    if buffer[0] != consts::IAC {
        // Plain application data up to the next command sequence.
        let end = buffer
            .iter()
            .position(|byte| *byte == consts::IAC)
            .unwrap_or(buffer.len());
        return (
            end,
            Some(TelnetFrame::Data(Bytes::copy_from_slice(&buffer[..end]))),
        );
    }

    if buffer.len() < 2 {
        // A lone IAC means nothing yet.
        return (0, None);
    }

    match buffer[1] {
        consts::IAC => {
            // Escaped 0xFF data byte.
            (
                2,
                Some(TelnetFrame::Data(Bytes::from_static(&[consts::IAC]))),
            )
        }
        verb @ (consts::WILL | consts::WONT | consts::DO | consts::DONT) => {
            if buffer.len() < 3 {
                return (0, None);
            }
            let option = TelnetOption::from_u8(buffer[2]);
            let frame = match verb {
                consts::WILL => TelnetFrame::Will(option),
                consts::WONT => TelnetFrame::Wont(option),
                consts::DO => TelnetFrame::Do(option),
                _ => TelnetFrame::Dont(option),
            };
            (3, Some(frame))
        }
        consts::SB => {
            if buffer.len() < 5 {
                return (0, None);
            }
            match find_subnegotiation_end(buffer) {
                // `end < 3` leaves no room for the option byte; a frame that
                // starts `IAC SB IAC SE` is unfinishable garbage, so wait for
                // the host to give up on the connection.
                None => (0, None),
                Some(end) if end < 3 => (0, None),
                Some(end) => {
                    let option = TelnetOption::from_u8(buffer[2]);
                    let payload = unescape(&buffer[3..end]);
                    (end + 2, Some(TelnetFrame::Subnegotiate(option, payload)))
                }
            }
        }
        command => (2, Some(TelnetFrame::Command(command))),
    }
}

/// Locates the `IAC` of the terminating `IAC SE`, scanning past escaped
/// `IAC IAC` pairs. Malformed `IAC <other>` pairs are skipped whole.
fn find_subnegotiation_end(buffer: &[u8]) -> Option<usize> {
    let mut index = 2;
    while index + 1 < buffer.len() {
        if buffer[index] == consts::IAC {
            if buffer[index + 1] == consts::SE {
                return Some(index);
            }
            index += 2;
        } else {
            index += 1;
        }
    }
    None
}

/// Collapses `IAC IAC` escapes to a single `0xFF`. Malformed `IAC <other>`
/// pairs inside the payload are dropped.
fn unescape(payload: &[u8]) -> Bytes {
    if !payload.contains(&consts::IAC) {
        return Bytes::copy_from_slice(payload);
    }
    let mut out = BytesMut::with_capacity(payload.len());
    let mut index = 0;
    while index < payload.len() {
        let byte = payload[index];
        if byte == consts::IAC {
            if payload.get(index + 1) == Some(&consts::IAC) {
                out.extend_from_slice(&[consts::IAC]);
            } else {
                warn!(
                    "dropping malformed IAC pair in subnegotiation payload: IAC {:?}",
                    payload.get(index + 1)
                );
            }
            index += 2;
        } else {
            out.extend_from_slice(&[byte]);
            index += 1;
        }
    }
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(mut input: &[u8]) -> Vec<TelnetFrame> {
        let mut frames = Vec::new();
        loop {
            let (consumed, frame) = parse(input);
            match frame {
                Some(frame) => {
                    frames.push(frame);
                    input = &input[consumed..];
                }
                None => break,
            }
        }
        frames
    }

    #[test]
    fn empty_buffer_needs_more() {
        assert_eq!(parse(&[]), (0, None));
    }

    #[test]
    fn plain_data_consumes_to_end() {
        let (consumed, frame) = parse(b"hello");
        assert_eq!(consumed, 5);
        assert_eq!(frame, Some(TelnetFrame::Data(Bytes::from_static(b"hello"))));
    }

    #[test]
    fn data_stops_at_iac() {
        let (consumed, frame) = parse(&[b'h', b'i', consts::IAC, consts::NOP]);
        assert_eq!(consumed, 2);
        assert_eq!(frame, Some(TelnetFrame::Data(Bytes::from_static(b"hi"))));
    }

    #[test]
    fn lone_iac_needs_more() {
        assert_eq!(parse(&[consts::IAC]), (0, None));
    }

    #[test]
    fn escaped_iac_is_one_data_byte() {
        let (consumed, frame) = parse(&[consts::IAC, consts::IAC]);
        assert_eq!(consumed, 2);
        assert_eq!(
            frame,
            Some(TelnetFrame::Data(Bytes::from_static(&[consts::IAC])))
        );
    }

    #[test]
    fn negotiation_needs_three_bytes() {
        assert_eq!(parse(&[consts::IAC, consts::WILL]), (0, None));
        let (consumed, frame) = parse(&[consts::IAC, consts::WILL, consts::option::NAWS]);
        assert_eq!(consumed, 3);
        assert_eq!(frame, Some(TelnetFrame::Will(TelnetOption::NAWS)));
    }

    #[test]
    fn all_four_verbs_parse() {
        let option = consts::option::SGA;
        assert_eq!(
            parse(&[consts::IAC, consts::WONT, option]).1,
            Some(TelnetFrame::Wont(TelnetOption::SuppressGoAhead))
        );
        assert_eq!(
            parse(&[consts::IAC, consts::DO, option]).1,
            Some(TelnetFrame::Do(TelnetOption::SuppressGoAhead))
        );
        assert_eq!(
            parse(&[consts::IAC, consts::DONT, option]).1,
            Some(TelnetFrame::Dont(TelnetOption::SuppressGoAhead))
        );
    }

    #[test]
    fn command_frame_parses() {
        let (consumed, frame) = parse(&[consts::IAC, consts::GA, b'x']);
        assert_eq!(consumed, 2);
        assert_eq!(frame, Some(TelnetFrame::Command(consts::GA)));
    }

    #[test]
    fn subnegotiation_waits_for_terminator() {
        let input = [consts::IAC, consts::SB, consts::option::NAWS, 0x00, 0x50];
        assert_eq!(parse(&input), (0, None));
    }

    #[test]
    fn subnegotiation_parses_payload() {
        let input = [
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0x00,
            0x50,
            0x00,
            0x18,
            consts::IAC,
            consts::SE,
        ];
        let (consumed, frame) = parse(&input);
        assert_eq!(consumed, 9);
        assert_eq!(
            frame,
            Some(TelnetFrame::Subnegotiate(
                TelnetOption::NAWS,
                Bytes::from_static(&[0x00, 0x50, 0x00, 0x18])
            ))
        );
    }

    #[test]
    fn subnegotiation_empty_payload() {
        let input = [
            consts::IAC,
            consts::SB,
            consts::option::MCCP2,
            consts::IAC,
            consts::SE,
        ];
        let (consumed, frame) = parse(&input);
        assert_eq!(consumed, 5);
        assert_eq!(
            frame,
            Some(TelnetFrame::Subnegotiate(TelnetOption::MCCP2, Bytes::new()))
        );
    }

    #[test]
    fn subnegotiation_unescapes_iac_pairs() {
        let input = [
            consts::IAC,
            consts::SB,
            consts::option::GMCP,
            0x01,
            consts::IAC,
            consts::IAC,
            0x03,
            consts::IAC,
            consts::SE,
        ];
        let (consumed, frame) = parse(&input);
        assert_eq!(consumed, 9);
        assert_eq!(
            frame,
            Some(TelnetFrame::Subnegotiate(
                TelnetOption::GMCP,
                Bytes::from_static(&[0x01, consts::IAC, 0x03])
            ))
        );
    }

    #[test]
    fn subnegotiation_escaped_iac_does_not_terminate() {
        // IAC IAC then more payload, then the real IAC SE.
        let input = [
            consts::IAC,
            consts::SB,
            consts::option::GMCP,
            consts::IAC,
            consts::IAC,
            consts::SE,
            consts::IAC,
            consts::SE,
        ];
        let (consumed, frame) = parse(&input);
        assert_eq!(consumed, 8);
        assert_eq!(
            frame,
            Some(TelnetFrame::Subnegotiate(
                TelnetOption::GMCP,
                Bytes::from_static(&[consts::IAC, consts::SE])
            ))
        );
    }

    #[test]
    fn malformed_iac_pair_is_dropped() {
        let input = [
            consts::IAC,
            consts::SB,
            consts::option::GMCP,
            b'a',
            consts::IAC,
            consts::NOP,
            b'b',
            consts::IAC,
            consts::SE,
        ];
        let (consumed, frame) = parse(&input);
        assert_eq!(consumed, 9);
        assert_eq!(
            frame,
            Some(TelnetFrame::Subnegotiate(
                TelnetOption::GMCP,
                Bytes::from_static(b"ab")
            ))
        );
    }

    #[test]
    fn interleaved_stream_parses_in_order() {
        let input = [
            b'A',
            consts::IAC,
            consts::IAC,
            b'B',
            consts::IAC,
            consts::DO,
            consts::option::SGA,
        ];
        let frames = parse_all(&input);
        assert_eq!(
            frames,
            vec![
                TelnetFrame::Data(Bytes::from_static(b"A")),
                TelnetFrame::Data(Bytes::from_static(&[consts::IAC])),
                TelnetFrame::Data(Bytes::from_static(b"B")),
                TelnetFrame::Do(TelnetOption::SuppressGoAhead),
            ]
        );
    }

    #[test]
    fn parse_is_idempotent_on_same_prefix() {
        let input = [consts::IAC, consts::WILL, consts::option::MCCP2, b'x'];
        assert_eq!(parse(&input), parse(&input));
    }
}
