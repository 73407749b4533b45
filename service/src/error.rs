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


//! Error types for the Telnet service

use thiserror::Error;

/// Result type for operations
pub type Result<T> = std::result::Result<T, TelnetError>;

/// Telnet service error types
#[derive(Debug, Error)]
pub enum TelnetError {
    /// I/O error from the underlying transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error from the codec layer
    #[error("Protocol error: {0}")]
    Protocol(#[from] telnetkit_telnetcodec::CodecError),

    /// Connection has been closed, by the peer or locally
    #[error("Connection closed")]
    ConnectionClosed,

    /// A read or write deadline passed
    #[error("Operation timed out")]
    Timeout,

    /// The listener was shut down
    #[error("Listener closed")]
    ListenerClosed,

    /// Generic error with a message
    #[error("{0}")]
    Other(String),
}

impl TelnetError {
    /// Check if the error is recoverable
    ///
    /// Recoverable errors leave the listener usable; the affected connection
    /// itself is always closed by the worker.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TelnetError::Timeout | TelnetError::ConnectionClosed | TelnetError::Io(_)
        )
    }

    /// Check if the error is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            TelnetError::ConnectionClosed | TelnetError::Timeout | TelnetError::Io(_)
        )
    }

    /// Check if the error is a protocol error
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, TelnetError::Protocol(_))
    }
}
