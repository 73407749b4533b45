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


use super::TelnetOption;
use crate::args::TelnetArgument;

///
/// `TelnetFrame` is a unit of outbound Telnet traffic: a data byte, a command,
/// a negotiation or a subnegotiation block.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetFrame {
    /// Telnet Data Byte, escaped on the wire when it equals `IAC`
    Data(u8),
    /// No Operation
    NoOperation,
    /// Request acknowledgment.
    AreYouThere,
    /// End of input for half-duplex connections.
    GoAhead,
    /// Bare `IAC TIMING-MARK`, sent in answer to `DO TIMING-MARK`
    TimingMark,
    /// Indicates the desire to begin performing, or confirmation that you are
    /// now performing, the indicated option.
    Will(TelnetOption),
    /// Indicates the refusal to perform, or continue performing, the indicated
    /// option.
    Wont(TelnetOption),
    /// Indicates the request that the other party perform, or confirmation
    /// that you are expecting the other party to perform, the indicated option.
    Do(TelnetOption),
    /// Indicates the demand that the other party stop performing, or
    /// confirmation that you are no longer expecting the other party to
    /// perform, the indicated option.
    Dont(TelnetOption),
    /// `IAC SB <option> <payload> IAC SE`
    Subnegotiate(TelnetArgument),
}
