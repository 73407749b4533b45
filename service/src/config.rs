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


//! Listener configuration
//!
//! ```
//! use telnetkit_service::ListenerConfig;
//! use std::time::Duration;
//!
//! let config = ListenerConfig::new("127.0.0.1:2323".parse().unwrap())
//!     .with_read_timeout(Some(Duration::from_secs(600)))
//!     .with_ayt_reply("\r\n[still here]\r\n");
//! assert_eq!(config.read_timeout, Some(Duration::from_secs(600)));
//! ```

use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Duration;
use telnetkit_telnetcodec::DEFAULT_AYT_REPLY;

/// Configuration for a [`crate::TelnetListener`] and the connections it accepts
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,

    /// Idle timeout for each read in the worker loop (None for no timeout)
    pub read_timeout: Option<Duration>,

    /// Bytes requested from the transport per read
    pub read_buffer_size: usize,

    /// Text sent back when a peer asks `IAC AYT`
    pub ayt_reply: Bytes,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 23)),
            read_timeout: None,
            read_buffer_size: 4096,
            ayt_reply: Bytes::from_static(DEFAULT_AYT_REPLY),
        }
    }
}

impl ListenerConfig {
    /// Create a new configuration bound to the given address
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn with_bind_address(mut self, bind_address: SocketAddr) -> Self {
        self.bind_address = bind_address;
        self
    }

    /// Set the read timeout; `Some(Duration::ZERO)` is treated as no timeout
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Set the read buffer size (at least one byte)
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Set the `AYT` reply text
    pub fn with_ayt_reply(mut self, reply: impl Into<Bytes>) -> Self {
        self.ayt_reply = reply.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ListenerConfig::default();
        assert_eq!(config.bind_address.port(), 23);
        assert_eq!(config.read_timeout, None);
        assert_eq!(config.read_buffer_size, 4096);
        assert_eq!(&config.ayt_reply[..], DEFAULT_AYT_REPLY);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = ListenerConfig::default().with_read_timeout(Some(Duration::ZERO));
        assert_eq!(config.read_timeout, None);
    }

    #[test]
    fn test_builder_chain() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let config = ListenerConfig::new(addr)
            .with_read_buffer_size(0)
            .with_ayt_reply(&b"yes"[..]);
        assert_eq!(config.bind_address, addr);
        assert_eq!(config.read_buffer_size, 1);
        assert_eq!(&config.ayt_reply[..], b"yes");
    }
}
