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


/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors produced while decoding or encoding the Telnet byte stream.
///
/// The decoder itself is tolerant: malformed input is logged and skipped, so
/// in practice only I/O failures surface from a running connection. The
/// subnegotiation variants are returned by the strict argument decoders such
/// as [`crate::naws::WindowSize::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// Error occurred while decoding or encoding a subnegotiation payload.
    SubnegotiationError {
        /// The telnet option being subnegotiated
        option: Option<u8>,
        /// Specific reason for the failure
        reason: SubnegotiationErrorKind,
    },
}

/// Specific kinds of subnegotiation errors with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubnegotiationErrorKind {
    /// Insufficient data available to decode the subnegotiation.
    InsufficientData {
        /// Number of bytes required
        required: usize,
        /// Number of bytes available
        available: usize,
    },

    /// Invalid command byte in the subnegotiation data.
    InvalidCommand {
        /// The invalid command byte
        command: u8,
        /// Expected command bytes, if known
        expected: Option<Vec<u8>>,
    },
}

impl std::error::Error for CodecError {}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::IOError { kind, operation } => {
                write!(f, "I/O error during {}: {:?}", operation, kind)
            }
            CodecError::SubnegotiationError { option, reason } => {
                if let Some(opt) = option {
                    write!(f, "Subnegotiation error for option {}: {}", opt, reason)
                } else {
                    write!(f, "Subnegotiation error: {}", reason)
                }
            }
        }
    }
}

impl std::fmt::Display for SubnegotiationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubnegotiationErrorKind::InsufficientData {
                required,
                available,
            } => {
                write!(
                    f,
                    "insufficient data (required: {}, available: {})",
                    required, available
                )
            }
            SubnegotiationErrorKind::InvalidCommand { command, expected } => {
                if let Some(exp) = expected {
                    write!(
                        f,
                        "invalid command 0x{:02X} (expected one of: {:?})",
                        command, exp
                    )
                } else {
                    write!(f, "invalid command: 0x{:02X}", command)
                }
            }
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IOError {
            kind: err.kind(),
            operation: err.to_string(),
        }
    }
}
