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


use crate::args::TelnetArgument;
use crate::{TelnetFrame, consts};
use std::fmt::Formatter;

///
/// [Telnet Terminal Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// [`consts::option::BINARY`] Telnet Binary Transmission [RFC856](https://tools.ietf.org/html/rfc856)
    TransmitBinary,
    /// [`consts::option::ECHO`] Telnet Echo Option [RFC857](https://tools.ietf.org/html/rfc857)
    Echo,
    /// [`consts::option::SGA`] Suppress Go ahead [RFC858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead,
    /// [`consts::option::STATUS`] Telnet Status Option [RFC859](http://www.iana.org/go/rfc859)
    Status,
    /// [`consts::option::TM`] Telnet Timing Mark Option [RFC860](http://www.iana.org/go/rfc860)
    TimingMark,
    /// [`consts::option::TTYPE`] Terminal Type [RFC1091](http://www.iana.org/go/rfc1091)
    TTYPE,
    /// [`consts::option::NAWS`] Negotiate About Window Size [RFC1073](http://www.iana.org/go/rfc1073)
    NAWS,
    /// [`consts::option::TSPEED`] Terminal Speed [RFC1079](http://www.iana.org/go/rfc1079)
    TSPEED,
    /// [`consts::option::LINEMODE`] Linemode [RFC1184](http://www.iana.org/go/rfc1184)
    Linemode,
    /// [`consts::option::NEW_ENVIRONMENT`] New Environment Option [RFC1572](http://www.iana.org/go/rfc1572)
    NewEnvironment,
    /// [`consts::option::CHARSET`] Charset [RFC2066](http://www.iana.org/go/rfc2066)
    Charset,
    /// Unknown Option
    Unknown(u8),
}

impl TelnetOption {
    /// Converts a `TelnetOption` into its wire code.
    pub fn to_u8(&self) -> u8 {
        match self {
            TelnetOption::TransmitBinary => consts::option::BINARY,
            TelnetOption::Echo => consts::option::ECHO,
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::Status => consts::option::STATUS,
            TelnetOption::TimingMark => consts::option::TM,
            TelnetOption::TTYPE => consts::option::TTYPE,
            TelnetOption::NAWS => consts::option::NAWS,
            TelnetOption::TSPEED => consts::option::TSPEED,
            TelnetOption::Linemode => consts::option::LINEMODE,
            TelnetOption::NewEnvironment => consts::option::NEW_ENVIRONMENT,
            TelnetOption::Charset => consts::option::CHARSET,
            TelnetOption::Unknown(byte) => *byte,
        }
    }

    /// Converts a wire code into a `TelnetOption`.
    ///
    /// Codes without a named variant map to [`TelnetOption::Unknown`], so
    /// `TelnetOption::from_u8(code).to_u8() == code` for every code.
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            consts::option::BINARY => TelnetOption::TransmitBinary,
            consts::option::ECHO => TelnetOption::Echo,
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::STATUS => TelnetOption::Status,
            consts::option::TM => TelnetOption::TimingMark,
            consts::option::TTYPE => TelnetOption::TTYPE,
            consts::option::NAWS => TelnetOption::NAWS,
            consts::option::TSPEED => TelnetOption::TSPEED,
            consts::option::LINEMODE => TelnetOption::Linemode,
            consts::option::NEW_ENVIRONMENT => TelnetOption::NewEnvironment,
            consts::option::CHARSET => TelnetOption::Charset,
            byte => TelnetOption::Unknown(byte),
        }
    }

    /// Whether we accept the peer performing this option (reply `DO` to `WILL`).
    pub fn supported_remote(&self) -> bool {
        matches!(
            self,
            TelnetOption::Echo
                | TelnetOption::SuppressGoAhead
                | TelnetOption::TTYPE
                | TelnetOption::NAWS
                | TelnetOption::TransmitBinary
        )
    }

    /// Whether we agree to perform this option ourselves (reply `WILL` to `DO`).
    pub fn supported_local(&self) -> bool {
        matches!(
            self,
            TelnetOption::Echo | TelnetOption::SuppressGoAhead | TelnetOption::TransmitBinary
        )
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::TransmitBinary => write!(f, "TransmitBinary"),
            TelnetOption::Echo => write!(f, "Echo"),
            TelnetOption::SuppressGoAhead => write!(f, "SuppressGoAhead"),
            TelnetOption::Status => write!(f, "Status"),
            TelnetOption::TimingMark => write!(f, "TimingMark"),
            TelnetOption::TTYPE => write!(f, "TTYPE"),
            TelnetOption::NAWS => write!(f, "NAWS"),
            TelnetOption::TSPEED => write!(f, "TSPEED"),
            TelnetOption::Linemode => write!(f, "Linemode"),
            TelnetOption::NewEnvironment => write!(f, "NewEnvironment"),
            TelnetOption::Charset => write!(f, "Charset"),
            TelnetOption::Unknown(option) => write!(f, "Unknown({option})"),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        Self::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

/// The four negotiation verbs of [RFC855](https://tools.ietf.org/html/rfc855).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetVerb {
    /// Sender wants to begin, or confirms it is now performing, an option
    Will,
    /// Sender refuses to perform, or stops performing, an option
    Wont,
    /// Sender asks the receiver to perform an option
    Do,
    /// Sender asks the receiver to stop performing an option
    Dont,
}

impl TelnetVerb {
    /// Wire code of the verb.
    pub fn to_u8(&self) -> u8 {
        match self {
            TelnetVerb::Will => consts::WILL,
            TelnetVerb::Wont => consts::WONT,
            TelnetVerb::Do => consts::DO,
            TelnetVerb::Dont => consts::DONT,
        }
    }

    /// Whether the verb records the option as enabled.
    pub fn enables(&self) -> bool {
        matches!(self, TelnetVerb::Will | TelnetVerb::Do)
    }
}

impl std::fmt::Display for TelnetVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetVerb::Will => write!(f, "WILL"),
            TelnetVerb::Wont => write!(f, "WONT"),
            TelnetVerb::Do => write!(f, "DO"),
            TelnetVerb::Dont => write!(f, "DONT"),
        }
    }
}

/// Outcome of feeding one received negotiation command into [`TelnetOptions`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Negotiation {
    /// The option the command was about
    pub option: TelnetOption,
    /// The state now recorded for the option
    pub enabled: bool,
    /// Whether the recorded state differs from the one before the command
    pub changed: bool,
    /// Frames to send back to the peer, in order
    pub replies: Vec<TelnetFrame>,
}

/// Per-connection option negotiation state.
///
/// Each of the 256 option codes is either unknown (never negotiated), enabled
/// or disabled. A received `WILL`/`DO` records the option as enabled and a
/// received `WONT`/`DONT` records it as disabled, whatever the option. The state
/// is stored before replies are built, so a reply that reports state (such as
/// `STATUS`) already sees the new value.
///
/// Replies are only produced when the request changes the state of its own
/// direction: `WILL`/`WONT` are tracked against what the peer has offered and
/// `DO`/`DONT` against what the peer has asked of us. A repeated request for a
/// mode already in effect in that direction is absorbed without
/// acknowledgement, which keeps two well-behaved peers from looping, while
/// `DO SGA` followed by `WILL SGA` still gets both answers. `DO STATUS`,
/// `DO TTYPE` and `DO TIMING-MARK` are requests for information rather than
/// mode changes and are always answered.
#[derive(Clone, Debug)]
pub struct TelnetOptions {
    state: [Option<bool>; 256],
    // Last DO/DONT received
    local: [Option<bool>; 256],
    // Last WILL/WONT received
    remote: [Option<bool>; 256],
}

impl TelnetOptions {
    /// Recorded state of an option; `None` if it was never negotiated.
    pub fn state(&self, option: TelnetOption) -> Option<bool> {
        self.state[option.to_u8() as usize]
    }

    /// Whether the option is currently recorded as enabled.
    pub fn is_enabled(&self, option: TelnetOption) -> bool {
        self.state(option).unwrap_or(false)
    }

    /// Iterates over every option that has been negotiated at least once.
    pub fn negotiated(&self) -> impl Iterator<Item = (TelnetOption, bool)> + '_ {
        self.state
            .iter()
            .enumerate()
            .filter_map(|(code, state)| state.map(|enabled| (TelnetOption::from_u8(code as u8), enabled)))
    }

    /// Applies a received negotiation command and builds the acknowledgement.
    pub fn handle_received(&mut self, verb: TelnetVerb, option: TelnetOption) -> Negotiation {
        let enabled = verb.enables();
        let code = option.to_u8() as usize;
        let changed = self.state[code] != Some(enabled);
        self.state[code] = Some(enabled);

        let direction = match verb {
            TelnetVerb::Will | TelnetVerb::Wont => &mut self.remote[code],
            TelnetVerb::Do | TelnetVerb::Dont => &mut self.local[code],
        };
        let direction_changed = *direction != Some(enabled);
        *direction = Some(enabled);

        let replies = if direction_changed || Self::always_answered(verb, option) {
            self.replies(verb, option)
        } else {
            Vec::new()
        };

        Negotiation {
            option,
            enabled,
            changed,
            replies,
        }
    }

    fn always_answered(verb: TelnetVerb, option: TelnetOption) -> bool {
        verb == TelnetVerb::Do
            && matches!(
                option,
                TelnetOption::Status | TelnetOption::TTYPE | TelnetOption::TimingMark
            )
    }

    fn replies(&self, verb: TelnetVerb, option: TelnetOption) -> Vec<TelnetFrame> {
        match verb {
            TelnetVerb::Will if option.supported_remote() => vec![TelnetFrame::Do(option)],
            TelnetVerb::Will | TelnetVerb::Wont => vec![TelnetFrame::Dont(option)],
            TelnetVerb::Do => match option {
                TelnetOption::Status => vec![TelnetFrame::Subnegotiate(TelnetArgument::Status(
                    self.status_report(),
                ))],
                TelnetOption::TTYPE => vec![
                    TelnetFrame::Will(TelnetOption::TTYPE),
                    TelnetFrame::Subnegotiate(TelnetArgument::TerminalTypeRequest),
                ],
                TelnetOption::TimingMark => vec![TelnetFrame::TimingMark],
                option if option.supported_local() => vec![TelnetFrame::Will(option)],
                option => vec![TelnetFrame::Wont(option)],
            },
            TelnetVerb::Dont => match option {
                TelnetOption::SuppressGoAhead => vec![TelnetFrame::Do(option)],
                option => vec![TelnetFrame::Wont(option)],
            },
        }
    }

    /// Current `WILL`/`WONT` state of echo and suppress-go-ahead, as reported
    /// in a `STATUS IS` block.
    fn status_report(&self) -> Vec<(TelnetVerb, TelnetOption)> {
        [TelnetOption::Echo, TelnetOption::SuppressGoAhead]
            .into_iter()
            .map(|option| {
                let verb = if self.is_enabled(option) {
                    TelnetVerb::Will
                } else {
                    TelnetVerb::Wont
                };
                (verb, option)
            })
            .collect()
    }
}

impl Default for TelnetOptions {
    fn default() -> Self {
        TelnetOptions {
            state: [None; 256],
            local: [None; 256],
            remote: [None; 256],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_code_round_trip() {
        for code in 0..=255u8 {
            assert_eq!(TelnetOption::from_u8(code).to_u8(), code);
        }
        assert_eq!(TelnetOption::from(24), TelnetOption::TTYPE);
        assert_eq!(TelnetOption::from(200), TelnetOption::Unknown(200));
    }

    #[test]
    fn test_default_state_is_unknown() {
        let opts = TelnetOptions::default();
        assert_eq!(opts.state(TelnetOption::Echo), None);
        assert!(!opts.is_enabled(TelnetOption::Echo));
        assert_eq!(opts.negotiated().count(), 0);
    }

    #[test]
    fn test_will_supported_accepts() {
        let mut opts = TelnetOptions::default();
        let result = opts.handle_received(TelnetVerb::Will, TelnetOption::NAWS);
        assert!(result.enabled);
        assert!(result.changed);
        assert_eq!(result.replies, vec![TelnetFrame::Do(TelnetOption::NAWS)]);
        assert_eq!(opts.state(TelnetOption::NAWS), Some(true));
    }

    #[test]
    fn test_will_unsupported_refuses_but_records() {
        let mut opts = TelnetOptions::default();
        let option = TelnetOption::Unknown(99);
        let result = opts.handle_received(TelnetVerb::Will, option);
        assert_eq!(result.replies, vec![TelnetFrame::Dont(option)]);
        assert_eq!(opts.state(option), Some(true));
    }

    #[test]
    fn test_wont_always_acknowledged_with_dont() {
        let mut opts = TelnetOptions::default();
        let result = opts.handle_received(TelnetVerb::Wont, TelnetOption::Echo);
        assert_eq!(result.replies, vec![TelnetFrame::Dont(TelnetOption::Echo)]);
        assert_eq!(opts.state(TelnetOption::Echo), Some(false));
    }

    #[test]
    fn test_repeated_request_is_absorbed() {
        let mut opts = TelnetOptions::default();
        opts.handle_received(TelnetVerb::Will, TelnetOption::SuppressGoAhead);
        let again = opts.handle_received(TelnetVerb::Will, TelnetOption::SuppressGoAhead);
        assert!(!again.changed);
        assert!(again.replies.is_empty());
    }

    #[test]
    fn test_do_then_will_answers_both_directions() {
        let mut opts = TelnetOptions::default();
        let asked = opts.handle_received(TelnetVerb::Do, TelnetOption::SuppressGoAhead);
        assert_eq!(asked.replies, vec![TelnetFrame::Will(TelnetOption::SuppressGoAhead)]);
        let offered = opts.handle_received(TelnetVerb::Will, TelnetOption::SuppressGoAhead);
        assert!(!offered.changed);
        assert_eq!(offered.replies, vec![TelnetFrame::Do(TelnetOption::SuppressGoAhead)]);

        let again = opts.handle_received(TelnetVerb::Will, TelnetOption::SuppressGoAhead);
        assert!(again.replies.is_empty());
    }

    #[test]
    fn test_will_then_wont_leaves_disabled() {
        let mut opts = TelnetOptions::default();
        let first = opts.handle_received(TelnetVerb::Will, TelnetOption::Echo);
        let second = opts.handle_received(TelnetVerb::Wont, TelnetOption::Echo);
        assert!(first.changed && first.enabled);
        assert!(second.changed && !second.enabled);
        assert!(!opts.is_enabled(TelnetOption::Echo));
    }

    #[test]
    fn test_do_terminal_type_offers_and_requests() {
        let mut opts = TelnetOptions::default();
        let result = opts.handle_received(TelnetVerb::Do, TelnetOption::TTYPE);
        assert_eq!(
            result.replies,
            vec![
                TelnetFrame::Will(TelnetOption::TTYPE),
                TelnetFrame::Subnegotiate(TelnetArgument::TerminalTypeRequest),
            ]
        );
        // Asked again: still answered
        let again = opts.handle_received(TelnetVerb::Do, TelnetOption::TTYPE);
        assert_eq!(again.replies.len(), 2);
    }

    #[test]
    fn test_do_timing_mark_always_answered() {
        let mut opts = TelnetOptions::default();
        for _ in 0..3 {
            let result = opts.handle_received(TelnetVerb::Do, TelnetOption::TimingMark);
            assert_eq!(result.replies, vec![TelnetFrame::TimingMark]);
        }
    }

    #[test]
    fn test_do_status_reports_current_state() {
        let mut opts = TelnetOptions::default();
        opts.handle_received(TelnetVerb::Do, TelnetOption::Echo);
        let result = opts.handle_received(TelnetVerb::Do, TelnetOption::Status);
        assert_eq!(
            result.replies,
            vec![TelnetFrame::Subnegotiate(TelnetArgument::Status(vec![
                (TelnetVerb::Will, TelnetOption::Echo),
                (TelnetVerb::Wont, TelnetOption::SuppressGoAhead),
            ]))]
        );
    }

    #[test]
    fn test_do_unknown_refused() {
        let mut opts = TelnetOptions::default();
        let result = opts.handle_received(TelnetVerb::Do, TelnetOption::NAWS);
        assert_eq!(result.replies, vec![TelnetFrame::Wont(TelnetOption::NAWS)]);
    }

    #[test]
    fn test_dont_replies() {
        let mut opts = TelnetOptions::default();
        let echo = opts.handle_received(TelnetVerb::Dont, TelnetOption::Echo);
        assert_eq!(echo.replies, vec![TelnetFrame::Wont(TelnetOption::Echo)]);
        let sga = opts.handle_received(TelnetVerb::Dont, TelnetOption::SuppressGoAhead);
        assert_eq!(sga.replies, vec![TelnetFrame::Do(TelnetOption::SuppressGoAhead)]);
        let other = opts.handle_received(TelnetVerb::Dont, TelnetOption::Linemode);
        assert_eq!(other.replies, vec![TelnetFrame::Wont(TelnetOption::Linemode)]);
    }
}
