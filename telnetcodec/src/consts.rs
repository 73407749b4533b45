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

//! Telnet wire constants ([RFC854](https://tools.ietf.org/html/rfc854))

/// Carriage Return
pub const CR: u8 = 0x0D;
/// Line Feed
pub const LF: u8 = 0x0A;

/// End of Subnegotiation
pub const SE: u8 = 240;
/// No Operation
pub const NOP: u8 = 241;
/// Data Mark
pub const DM: u8 = 242;
/// Break
pub const BRK: u8 = 243;
/// Interrupt Process
pub const IP: u8 = 244;
/// Abort Output
pub const AO: u8 = 245;
/// Are You There
pub const AYT: u8 = 246;
/// Erase Character
pub const EC: u8 = 247;
/// Erase Line
pub const EL: u8 = 248;
/// Go Ahead
pub const GA: u8 = 249;
/// Start of Subnegotiation
pub const SB: u8 = 250;
/// Sender wants to enable an option
pub const WILL: u8 = 251;
/// Sender refuses an option
pub const WONT: u8 = 252;
/// Sender asks the receiver to enable an option
pub const DO: u8 = 253;
/// Sender asks the receiver not to enable an option
pub const DONT: u8 = 254;
/// Interpret As Command
pub const IAC: u8 = 255;

/// Telnet option codes
pub mod option {
    /// Binary Transmission [RFC856](https://tools.ietf.org/html/rfc856)
    pub const BINARY: u8 = 0;
    /// Echo [RFC857](https://tools.ietf.org/html/rfc857)
    pub const ECHO: u8 = 1;
    /// Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    pub const SGA: u8 = 3;
    /// Status [RFC859](https://tools.ietf.org/html/rfc859)
    pub const STATUS: u8 = 5;
    /// Timing Mark [RFC860](https://tools.ietf.org/html/rfc860)
    pub const TM: u8 = 6;
    /// Terminal Type [RFC1091](https://tools.ietf.org/html/rfc1091)
    pub const TTYPE: u8 = 24;
    /// Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    pub const NAWS: u8 = 31;
    /// Terminal Speed [RFC1079](https://tools.ietf.org/html/rfc1079)
    pub const TSPEED: u8 = 32;
    /// Linemode [RFC1184](https://tools.ietf.org/html/rfc1184)
    pub const LINEMODE: u8 = 34;
    /// New Environment [RFC1572](https://tools.ietf.org/html/rfc1572)
    pub const NEW_ENVIRONMENT: u8 = 39;
    /// Charset [RFC2066](https://tools.ietf.org/html/rfc2066)
    pub const CHARSET: u8 = 42;
}

/// Subnegotiation sub-commands shared by TTYPE and STATUS
pub mod sub {
    /// `IS` - the sender is reporting a value
    pub const IS: u8 = 0;
    /// `SEND` - the sender requests a value
    pub const SEND: u8 = 1;
}
