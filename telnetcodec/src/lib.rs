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


//! # Telnetkit Telnet Protocol Codec
//!
//! This crate implements the byte level half of a Telnet server
//! ([RFC854](https://tools.ietf.org/html/rfc854),
//! [RFC855](https://tools.ietf.org/html/rfc855)): splitting a stream into
//! application data and embedded commands, tracking negotiated option state
//! and answering the peer's negotiation requests.
//!
//! ## Core Components
//!
//! ### [`TelnetCodec`]
//!
//! Implements [`Decoder`] and [`Encoder`] from `tokio_util::codec`. The decoder
//! is a byte-at-a-time state machine that de-escapes `IAC IAC`, recognizes
//! commands, applies negotiation to its [`TelnetOptions`] and queues the
//! acknowledgements for the owner to write out.
//!
//! ### [`TelnetFrame`]
//!
//! Outbound units: data bytes, negotiation commands and subnegotiation blocks.
//!
//! ### [`TelnetEvent`]
//!
//! What the decoder reports: data bytes, control commands, option state
//! changes and decoded subnegotiation payloads ([`TelnetArgument`]).
//!
//! ## Usage Example
//!
//! ```rust
//! use telnetkit_telnetcodec::{TelnetCodec, TelnetEvent, TelnetOption};
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut codec = TelnetCodec::new();
//!
//! // "Hi" followed by WILL NAWS
//! let mut input = BytesMut::from(&b"Hi\xFF\xFB\x1F"[..]);
//! let mut data = Vec::new();
//! while let Some(event) = codec.decode(&mut input)? {
//!     match event {
//!         TelnetEvent::Data(byte) => data.push(byte),
//!         TelnetEvent::OptionStatus(option, enabled) => {
//!             assert_eq!(option, TelnetOption::NAWS);
//!             assert!(enabled);
//!         }
//!         _ => {}
//!     }
//!     // Acknowledgements go out before the next byte is decoded
//!     let _reply = codec.take_responses();
//! }
//! assert_eq!(data, b"Hi");
//! # Ok(())
//! # }
//! ```
//!
//! ## IAC Escaping
//!
//! Since 0xFF (IAC) introduces commands, it is sent twice when it is meant as
//! data. [`escape`] does this for caller payload; the decoder reverses it
//! inline because a doubled `IAC` and a command share the same lead byte.
//!
//! ## Thread Safety
//!
//! `TelnetCodec` is **not** thread-safe. Each connection owns its own codec
//! instance and wraps it in a lock if it is shared.

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

mod args;
mod codec;
pub mod consts;
mod event;
mod frame;
mod options;
mod result;

pub use self::args::{TelnetArgument, naws};
pub use self::codec::{DEFAULT_AYT_REPLY, TelnetCodec, escape};
pub use self::event::TelnetEvent;
pub use self::frame::TelnetFrame;
pub use self::options::{Negotiation, TelnetOption, TelnetOptions, TelnetVerb};
pub use self::result::{CodecError, CodecResult, SubnegotiationErrorKind};

#[cfg(test)]
mod tests {
    use super::{TelnetCodec, TelnetEvent, TelnetFrame, TelnetOption, consts};
    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    #[tokio::test]
    async fn telnet_decode() {
        let mut codec = TelnetCodec::new();
        let mut input_buffer = BytesMut::from("Terminated line\r\n");
        let expected_output: Vec<TelnetEvent> = b"Terminated line\r\n"
            .iter()
            .map(|&b| TelnetEvent::Data(b))
            .collect();
        let mut actual_output = Vec::new();
        while let Some(event) = codec.decode(&mut input_buffer).unwrap() {
            actual_output.push(event)
        }
        assert_eq!(expected_output, actual_output, "telnet_decode didn't match");
    }

    #[test]
    fn telnet_encode() {
        let mut codec = TelnetCodec::new();
        let mut actual_output = BytesMut::with_capacity(20);
        for &byte in b"Raw Ascii Data\r\n" {
            codec.encode(TelnetFrame::Data(byte), &mut actual_output).unwrap();
        }
        let expected_output = BytesMut::from(&b"Raw Ascii Data\r\n"[..]);
        assert_eq!(expected_output, actual_output, "telnet_encode didn't match");
    }

    #[test]
    fn decode_iac_activation() {
        let mut codec = TelnetCodec::new();
        let mut input_buffer = BytesMut::from(
            &[
                // Data
                b'L',
                b'o',
                b'g',
                b'i',
                b'n',
                b':',
                consts::CR,
                consts::LF,
                // Command Do Binary
                consts::IAC,
                consts::DO,
                consts::option::BINARY,
                // Data
                b'o',
                b'k',
            ][..],
        );
        let mut events = Vec::new();
        let mut replies = BytesMut::new();
        while let Some(event) = codec.decode(&mut input_buffer).unwrap() {
            replies.extend_from_slice(&codec.take_responses());
            events.push(event);
        }
        assert_eq!(events.len(), 11);
        assert_eq!(
            events[8],
            TelnetEvent::OptionStatus(TelnetOption::TransmitBinary, true)
        );
        assert_eq!(
            &replies[..],
            &[consts::IAC, consts::WILL, consts::option::BINARY]
        );
    }
}
