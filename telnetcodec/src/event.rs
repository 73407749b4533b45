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
use crate::options::TelnetVerb;

///
/// `TelnetEvent` represents user-facing events from the Telnet codec.
///
/// Negotiation commands are acknowledged inside the codec; the decoder
/// reports them as `OptionStatus` when the recorded state of the option
/// changed, or as `OptionRequest` when a repeated request was absorbed.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetEvent {
    /// Telnet Data Byte
    Data(u8),
    /// No Operation
    NoOperation,
    /// End of urgent Data Stream
    DataMark,
    /// Operator pressed the Break key or the Attention key.
    Break,
    /// Interrupt current process.
    InterruptProcess,
    /// Cancel output from the current process.
    AbortOutput,
    /// Request acknowledgment. The reply has already been queued.
    AreYouThere,
    /// Request that the operator erase the previous character.
    EraseCharacter,
    /// Request that the operator erase the previous line.
    EraseLine,
    /// End of input for half-duplex connections.
    GoAhead,
    /// Stray end of subnegotiation outside of a block.
    SubnegotiationEnd,
    /// The recorded state of an option changed.
    /// Parameters: (option, enabled)
    OptionStatus(TelnetOption, bool),
    /// A negotiation command that left the recorded state unchanged.
    OptionRequest(TelnetVerb, TelnetOption),
    /// Subnegotiation Payload
    Subnegotiate(TelnetArgument),
}
