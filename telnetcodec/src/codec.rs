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


use super::{CodecError, TelnetEvent, TelnetFrame, TelnetOption, consts};
use crate::args::TelnetArgument;
use crate::options::{TelnetOptions, TelnetVerb};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace, warn};

/// Reply sent when the peer asks `IAC AYT` and no other reply was configured.
pub const DEFAULT_AYT_REPLY: &[u8] = b"\r\n[Yes]\r\n";

/// Doubles every `IAC` byte in `data`.
///
/// Meant for caller payload only. Command sequences built by the codec use
/// the control byte deliberately and are never passed through here.
///
/// # Example
/// ```
/// use telnetkit_telnetcodec::escape;
///
/// assert_eq!(&escape(b"a\xFFb")[..], b"a\xFF\xFFb");
/// ```
pub fn escape(data: &[u8]) -> Bytes {
    let extra = data.iter().filter(|&&b| b == consts::IAC).count();
    let mut dst = BytesMut::with_capacity(data.len() + extra);
    put_escaped(data, &mut dst);
    dst.freeze()
}

fn put_escaped(data: &[u8], dst: &mut BytesMut) {
    for &byte in data {
        if byte == consts::IAC {
            dst.put_u8(consts::IAC);
        }
        dst.put_u8(byte);
    }
}

fn put_command(command: u8, dst: &mut BytesMut) {
    dst.reserve(2);
    dst.put_u8(consts::IAC);
    dst.put_u8(command);
}

fn put_negotiation(verb: TelnetVerb, option: TelnetOption, dst: &mut BytesMut) {
    dst.reserve(3);
    dst.put_u8(consts::IAC);
    dst.put_u8(verb.to_u8());
    dst.put_u8(option.to_u8());
}

fn put_frame(frame: &TelnetFrame, dst: &mut BytesMut) {
    match frame {
        TelnetFrame::Data(byte) => put_escaped(&[*byte], dst),
        TelnetFrame::NoOperation => put_command(consts::NOP, dst),
        TelnetFrame::AreYouThere => put_command(consts::AYT, dst),
        TelnetFrame::GoAhead => put_command(consts::GA, dst),
        TelnetFrame::TimingMark => put_command(consts::option::TM, dst),
        TelnetFrame::Will(option) => put_negotiation(TelnetVerb::Will, *option, dst),
        TelnetFrame::Wont(option) => put_negotiation(TelnetVerb::Wont, *option, dst),
        TelnetFrame::Do(option) => put_negotiation(TelnetVerb::Do, *option, dst),
        TelnetFrame::Dont(option) => put_negotiation(TelnetVerb::Dont, *option, dst),
        TelnetFrame::Subnegotiate(argument) => {
            dst.reserve(5);
            dst.put_u8(consts::IAC);
            dst.put_u8(consts::SB);
            dst.put_u8(argument.option().to_u8());
            argument.encode(dst);
            dst.put_u8(consts::IAC);
            dst.put_u8(consts::SE);
        }
    }
}

/// A codec for the server side of a Telnet stream.
///
/// Decoding splits the inbound bytes into data and commands and answers
/// negotiation on its own: acknowledgements, `AYT` replies and echoed bytes
/// are queued in an internal buffer. The owner must write that buffer out
/// (see [`TelnetCodec::take_responses`]) before decoding further input so
/// replies leave in the order their triggers arrived. `decode` yields at
/// least one event for every input that queues a reply, which gives the
/// owner a point to flush.
///
/// Encoding escapes payload and writes command frames verbatim.
pub struct TelnetCodec {
    decoder_buffer: BytesMut,
    decoder_state: DecoderState,
    options: TelnetOptions,
    responses: BytesMut,
    ayt_reply: Bytes,
}

impl TelnetCodec {
    /// Creates a new instance of `TelnetCodec`.
    ///
    /// # Example
    /// ```
    /// use telnetkit_telnetcodec::TelnetCodec;
    ///
    /// let codec = TelnetCodec::new();
    /// assert!(!codec.has_pending_responses());
    /// ```
    pub fn new() -> TelnetCodec {
        TelnetCodec::default()
    }

    /// Replaces the text sent back when the peer asks `IAC AYT`.
    pub fn with_ayt_reply(mut self, reply: impl Into<Bytes>) -> Self {
        self.ayt_reply = reply.into();
        self
    }

    /// Negotiated option state.
    pub fn options(&self) -> &TelnetOptions {
        &self.options
    }

    /// Recorded state of an option; `None` if it was never negotiated.
    pub fn option_state(&self, option: TelnetOption) -> Option<bool> {
        self.options.state(option)
    }

    /// Whether the option is currently recorded as enabled.
    pub fn is_enabled(&self, option: TelnetOption) -> bool {
        self.options.is_enabled(option)
    }

    /// Whether replies are waiting to be written to the peer.
    pub fn has_pending_responses(&self) -> bool {
        !self.responses.is_empty()
    }

    /// Takes every queued reply, already encoded for the wire.
    pub fn take_responses(&mut self) -> Bytes {
        self.responses.split().freeze()
    }

    fn data(&mut self, byte: u8) -> TelnetEvent {
        if self.options.is_enabled(TelnetOption::Echo) {
            put_escaped(&[byte], &mut self.responses);
        }
        TelnetEvent::Data(byte)
    }

    fn negotiate(&mut self, verb: TelnetVerb, option: TelnetOption) -> TelnetEvent {
        trace!("Received {} {}", verb, option);
        let negotiation = self.options.handle_received(verb, option);
        for reply in &negotiation.replies {
            debug!("Replying {:?} to {} {}", reply, verb, option);
            put_frame(reply, &mut self.responses);
        }
        if negotiation.changed {
            TelnetEvent::OptionStatus(option, negotiation.enabled)
        } else {
            TelnetEvent::OptionRequest(verb, option)
        }
    }
}

impl Default for TelnetCodec {
    fn default() -> Self {
        TelnetCodec {
            decoder_buffer: BytesMut::new(),
            decoder_state: DecoderState::NormalData,
            options: TelnetOptions::default(),
            responses: BytesMut::new(),
            ayt_reply: Bytes::from_static(DEFAULT_AYT_REPLY),
        }
    }
}

impl Decoder for TelnetCodec {
    type Item = TelnetEvent;
    type Error = CodecError;

    /// Decodes bytes from `src` one at a time until an event is produced.
    ///
    /// Malformed input never produces an error: an unknown byte after `IAC`
    /// is delivered as data, and a subnegotiation block broken by an
    /// unexpected command is dropped with a warning. A subnegotiation left
    /// open at the end of `src` keeps accumulating on the next call.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetEvent>, Self::Error> {
        while src.has_remaining() {
            let byte = src.get_u8();
            match (self.decoder_state, byte) {
                (DecoderState::NormalData, consts::IAC) => {
                    self.decoder_state = DecoderState::InterpretAsCommand;
                }
                (DecoderState::NormalData, _) => {
                    return Ok(Some(self.data(byte)));
                }
                (DecoderState::InterpretAsCommand, consts::IAC) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(self.data(consts::IAC)));
                }
                (DecoderState::InterpretAsCommand, consts::AYT) => {
                    self.decoder_state = DecoderState::NormalData;
                    trace!("Received AYT");
                    self.responses.extend_from_slice(&self.ayt_reply);
                    return Ok(Some(TelnetEvent::AreYouThere));
                }
                (DecoderState::InterpretAsCommand, consts::WILL) => {
                    self.decoder_state = DecoderState::Negotiate(TelnetVerb::Will);
                }
                (DecoderState::InterpretAsCommand, consts::WONT) => {
                    self.decoder_state = DecoderState::Negotiate(TelnetVerb::Wont);
                }
                (DecoderState::InterpretAsCommand, consts::DO) => {
                    self.decoder_state = DecoderState::Negotiate(TelnetVerb::Do);
                }
                (DecoderState::InterpretAsCommand, consts::DONT) => {
                    self.decoder_state = DecoderState::Negotiate(TelnetVerb::Dont);
                }
                (DecoderState::InterpretAsCommand, consts::SB) => {
                    self.decoder_buffer.clear();
                    self.decoder_state = DecoderState::Subnegotiate;
                }
                (DecoderState::InterpretAsCommand, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    let event = match byte {
                        consts::NOP => TelnetEvent::NoOperation,
                        consts::DM => TelnetEvent::DataMark,
                        consts::BRK => TelnetEvent::Break,
                        consts::IP => TelnetEvent::InterruptProcess,
                        consts::AO => TelnetEvent::AbortOutput,
                        consts::EC => TelnetEvent::EraseCharacter,
                        consts::EL => TelnetEvent::EraseLine,
                        consts::GA => TelnetEvent::GoAhead,
                        consts::SE => TelnetEvent::SubnegotiationEnd,
                        _ => {
                            warn!("Received Unknown Command {:#X}, treating as data", byte);
                            return Ok(Some(self.data(byte)));
                        }
                    };
                    trace!("Received {:?}", event);
                    return Ok(Some(event));
                }
                (DecoderState::Negotiate(verb), _) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(self.negotiate(verb, TelnetOption::from_u8(byte))));
                }
                (DecoderState::Subnegotiate, consts::IAC) => {
                    self.decoder_state = DecoderState::SubnegotiateIAC;
                }
                (DecoderState::Subnegotiate, _) => {
                    self.decoder_buffer.put_u8(byte);
                }
                (DecoderState::SubnegotiateIAC, consts::IAC) => {
                    self.decoder_state = DecoderState::Subnegotiate;
                    self.decoder_buffer.put_u8(consts::IAC);
                }
                (DecoderState::SubnegotiateIAC, consts::SE) => {
                    self.decoder_state = DecoderState::NormalData;
                    let block = self.decoder_buffer.split();
                    let Some((&option, payload)) = block.split_first() else {
                        warn!("Ignoring subnegotiation without an option code");
                        continue;
                    };
                    let option = TelnetOption::from_u8(option);
                    trace!("Received subnegotiation for {} ({} bytes)", option, payload.len());
                    if let Some(argument) = TelnetArgument::decode(option, payload) {
                        return Ok(Some(TelnetEvent::Subnegotiate(argument)));
                    }
                }
                (DecoderState::SubnegotiateIAC, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    self.decoder_buffer.clear();
                    warn!(
                        "Received Unknown or invalid Command during Subnegotiation {:#X}. Aborting",
                        byte
                    );
                }
            }
        }
        Ok(None)
    }
}

impl Encoder<u8> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: u8, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(2);
        put_escaped(&[item], dst);
        Ok(())
    }
}

impl Encoder<&[u8]> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        put_escaped(item, dst);
        Ok(())
    }
}

impl Encoder<&str> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &str, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encode(item.as_bytes(), dst)
    }
}

impl Encoder<TelnetFrame> for TelnetCodec {
    type Error = CodecError;

    /// Encodes a `TelnetFrame` into a byte buffer.
    ///
    /// `Data` bytes are escaped; negotiation and command frames are written
    /// as `IAC <command> [option]`; subnegotiations as
    /// `IAC SB <option> <escaped payload> IAC SE`.
    fn encode(&mut self, item: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        put_frame(&item, dst);
        Ok(())
    }
}

/// Internal state of the Telnet decoder between input bytes.
#[derive(Clone, Copy, Debug)]
enum DecoderState {
    /// Normal Data
    NormalData,
    /// Received IAC, Next byte is Command
    InterpretAsCommand,
    /// Received a negotiation verb, Next Byte is the option
    Negotiate(TelnetVerb),
    /// Inside a subnegotiation block, accumulating option code and payload
    Subnegotiate,
    /// Received IAC during Subnegotiation, Next Byte is command
    SubnegotiateIAC,
}
