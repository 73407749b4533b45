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


//! Telnet listener
//!
//! ```no_run
//! use telnetkit_service::TelnetListener;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = TelnetListener::bind("127.0.0.1:2323").await?;
//!     loop {
//!         let conn = listener.accept().await?;
//!         conn.set_message_handler(|conn, line| async move {
//!             let _ = conn.write_str(&format!("{line}\r\n")).await;
//!         });
//!     }
//! }
//! ```

use crate::worker::ConnectionWorker;
use crate::{Connection, ListenerConfig, Result, SessionManager, TelnetError};
use std::net::SocketAddr;
use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

/// Accepts Telnet connections and spawns a worker for each one
pub struct TelnetListener {
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    config: ListenerConfig,
    shutdown: CancellationToken,
    timeout: std::sync::Mutex<Option<Duration>>,
    sessions: std::sync::Mutex<Option<Arc<SessionManager>>>,
}

impl TelnetListener {
    /// Bind to `addr` with default settings
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self::from_listener(
            listener,
            ListenerConfig::new(local_addr),
        ))
    }

    /// Bind to `config.bind_address`
    pub async fn with_config(config: ListenerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_address).await?;
        Ok(Self::from_listener(listener, config))
    }

    fn from_listener(listener: TcpListener, config: ListenerConfig) -> Self {
        let local_addr = listener.local_addr().unwrap_or(config.bind_address);
        info!("Telnet listener bound to {}", local_addr);
        Self {
            listener: Mutex::new(Some(listener)),
            local_addr,
            timeout: std::sync::Mutex::new(config.read_timeout),
            config,
            shutdown: CancellationToken::new(),
            sessions: std::sync::Mutex::new(Some(Arc::new(SessionManager::new()))),
        }
    }

    fn timeout_slot(&self) -> MutexGuard<'_, Option<Duration>> {
        self.timeout.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sessions_slot(&self) -> MutexGuard<'_, Option<Arc<SessionManager>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Idle timeout for connections accepted from now on; zero disables it
    pub fn set_timeout(&self, timeout: Duration) {
        *self.timeout_slot() = Some(timeout).filter(|t| !t.is_zero());
    }

    /// Current idle timeout
    pub fn timeout(&self) -> Option<Duration> {
        *self.timeout_slot()
    }

    /// Session registry new connections are added to
    pub fn sessions(&self) -> Option<Arc<SessionManager>> {
        self.sessions_slot().clone()
    }

    /// Replace the session registry; `None` stops session tracking
    pub fn set_session_manager(&self, sessions: Option<Arc<SessionManager>>) {
        *self.sessions_slot() = sessions;
    }

    /// Whether [`TelnetListener::shutdown`] has been called
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Wait for the next connection
    ///
    /// The returned connection is registered with the session registry and
    /// already has a worker reading from it; install a message handler to
    /// receive its lines. Lines that arrive before the handler is installed
    /// are held and delivered to it in order. Fails with [`TelnetError::ListenerClosed`] once the
    /// listener is shut down.
    #[instrument(skip(self), fields(local_addr = %self.local_addr))]
    pub async fn accept(&self) -> Result<Connection> {
        if self.is_shutdown() {
            return Err(TelnetError::ListenerClosed);
        }

        let (stream, peer_addr) = {
            let guard = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Err(TelnetError::ListenerClosed),
                guard = self.listener.lock() => guard,
            };
            let Some(listener) = &*guard else {
                return Err(TelnetError::ListenerClosed);
            };
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Err(TelnetError::ListenerClosed),
                result = listener.accept() => result.map_err(|e| {
                    error!("Failed to accept connection: {}", e);
                    TelnetError::Io(e)
                })?,
            }
        };

        let connection = Connection::with_config(stream, &self.config);
        info!(
            connection_id = %connection.id(),
            peer_addr = %peer_addr,
            "Connection established"
        );

        let sessions = self.sessions();
        if let Some(sessions) = &sessions {
            sessions.create_session(&connection);
        }

        let worker = ConnectionWorker::new(
            connection.clone(),
            sessions,
            self.timeout(),
            self.config.read_buffer_size,
        );
        tokio::spawn(worker.run());

        Ok(connection)
    }

    /// Stop accepting
    ///
    /// Pending and later calls to [`TelnetListener::accept`] fail with
    /// [`TelnetError::ListenerClosed`] and the listening socket is closed.
    /// Connections already accepted keep running.
    pub async fn shutdown(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        info!("Shutting down telnet listener on {}", self.local_addr);
        self.shutdown.cancel();
        self.listener.lock().await.take();
    }
}

impl std::fmt::Debug for TelnetListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetListener")
            .field("local_addr", &self.local_addr)
            .field("shutdown", &self.is_shutdown())
            .field("timeout", &self.timeout())
            .finish()
    }
}

impl Drop for TelnetListener {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = TelnetListener::bind("127.0.0.1:0").await.unwrap();
        assert_ne!(listener.local_addr().port(), 0);
        assert!(listener.sessions().is_some());
        assert!(!listener.is_shutdown());
    }

    #[tokio::test]
    async fn test_zero_timeout_disables() {
        let listener = TelnetListener::bind("127.0.0.1:0").await.unwrap();
        listener.set_timeout(Duration::from_secs(5));
        assert_eq!(listener.timeout(), Some(Duration::from_secs(5)));
        listener.set_timeout(Duration::ZERO);
        assert_eq!(listener.timeout(), None);
    }

    #[tokio::test]
    async fn test_bind_error() {
        let first = TelnetListener::bind("127.0.0.1:0").await.unwrap();
        let result = TelnetListener::bind(first.local_addr()).await;
        assert!(matches!(result, Err(TelnetError::Io(_))));
    }
}
