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


use crate::args::naws::WindowSize;
use crate::options::TelnetVerb;
use crate::{TelnetOption, consts};
use bytes::{BufMut, Bytes};
use std::fmt::Formatter;
use tracing::warn;

pub mod naws;

///
/// Telnet Subnegotiation Argument
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetArgument {
    /// `TTYPE IS <name>`: the peer reports its terminal type.
    TerminalType(String),
    /// `TTYPE SEND`: ask the peer to report its terminal type.
    TerminalTypeRequest,
    /// A subnegotiation for the window size, where the first value is the width
    /// and the second value is the height. The values are in characters.
    NAWSWindowSize(WindowSize),
    /// `STATUS IS` followed by verb/option pairs describing current state.
    Status(Vec<(TelnetVerb, TelnetOption)>),
    /// A subnegotiation for an option without a dedicated decoder.
    Unknown(TelnetOption, Bytes),
}

impl TelnetArgument {
    /// Decodes the unescaped payload of an `IAC SB <option> ... IAC SE` block.
    ///
    /// Decoding never fails. A short `NAWS` payload is zero padded and a
    /// `TTYPE` name is decoded as lossy UTF-8. Returns `None` for an empty
    /// block, which carries nothing to act on.
    pub fn decode(option: TelnetOption, payload: &[u8]) -> Option<TelnetArgument> {
        if payload.is_empty() {
            warn!("Ignoring empty subnegotiation for option {}", option);
            return None;
        }
        let argument = match option {
            TelnetOption::NAWS => {
                if payload.len() < 4 {
                    warn!(
                        "Short NAWS payload ({} bytes), padding with zeros",
                        payload.len()
                    );
                }
                TelnetArgument::NAWSWindowSize(WindowSize::decode_padded(payload))
            }
            TelnetOption::TTYPE => match payload {
                [consts::sub::SEND] => TelnetArgument::TerminalTypeRequest,
                [command, name @ ..] => {
                    if *command != consts::sub::IS {
                        warn!("Unexpected TTYPE subcommand {}, treating as IS", command);
                    }
                    TelnetArgument::TerminalType(String::from_utf8_lossy(name).into_owned())
                }
                [] => return None,
            },
            option => TelnetArgument::Unknown(option, Bytes::copy_from_slice(payload)),
        };
        Some(argument)
    }

    /// Unescaped payload bytes of this argument, without the option code.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            TelnetArgument::TerminalType(name) => {
                let mut payload = Vec::with_capacity(name.len() + 1);
                payload.push(consts::sub::IS);
                payload.extend_from_slice(name.as_bytes());
                payload
            }
            TelnetArgument::TerminalTypeRequest => vec![consts::sub::SEND],
            TelnetArgument::NAWSWindowSize(size) => {
                let mut payload = Vec::with_capacity(size.len());
                // Writing into a Vec cannot fail
                let _ = size.write(&mut payload);
                payload
            }
            TelnetArgument::Status(entries) => {
                let mut payload = Vec::with_capacity(entries.len() * 2 + 1);
                payload.push(consts::sub::IS);
                for (verb, option) in entries {
                    payload.push(verb.to_u8());
                    payload.push(option.to_u8());
                }
                payload
            }
            TelnetArgument::Unknown(_option, payload) => payload.to_vec(),
        }
    }

    /// Encodes the payload to `dst`, doubling any `IAC` byte.
    ///
    /// Returns the number of bytes written.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> usize {
        let mut written = 0;
        for byte in self.payload() {
            if byte == consts::IAC {
                dst.put_u8(consts::IAC);
                written += 1;
            }
            dst.put_u8(byte);
            written += 1;
        }
        written
    }

    /// Returns the `TelnetOption` associated with this argument.
    pub fn option(&self) -> TelnetOption {
        match self {
            TelnetArgument::TerminalType(_) => TelnetOption::TTYPE,
            TelnetArgument::TerminalTypeRequest => TelnetOption::TTYPE,
            TelnetArgument::NAWSWindowSize(_) => TelnetOption::NAWS,
            TelnetArgument::Status(_) => TelnetOption::Status,
            TelnetArgument::Unknown(option, _) => *option,
        }
    }
}

impl std::fmt::Display for TelnetArgument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetArgument::TerminalType(name) => write!(f, "TerminalType({name})"),
            TelnetArgument::TerminalTypeRequest => write!(f, "TerminalTypeRequest"),
            TelnetArgument::NAWSWindowSize(v) => write!(f, "{v}"),
            TelnetArgument::Status(entries) => {
                write!(f, "Status(")?;
                for (i, (verb, option)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{verb} {option}")?;
                }
                write!(f, ")")
            }
            TelnetArgument::Unknown(o, v) => write!(f, "{o}-{v:?}"),
        }
    }
}
