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


//! Per-connection worker task
//!
//! Spawned by [`crate::TelnetListener::accept`]. Reads data from the
//! connection, splits it into lines and awaits the message handler for each
//! one, until the peer disconnects, the idle timeout expires or the
//! connection is closed. Lines completed before a handler is installed are
//! held and delivered once one is.

use crate::{Connection, LineAssembler, Result, SessionManager, TelnetError};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Lines held for a connection that has no message handler yet
const MAX_PENDING_LINES: usize = 1024;

/// Worker driving one accepted connection
pub(crate) struct ConnectionWorker {
    connection: Connection,
    sessions: Option<Arc<SessionManager>>,
    idle_timeout: Option<Duration>,
    lines: LineAssembler,
    pending: VecDeque<String>,
    buffer: Vec<u8>,
}

impl ConnectionWorker {
    /// Create a worker; `idle_timeout` bounds each read
    pub(crate) fn new(
        connection: Connection,
        sessions: Option<Arc<SessionManager>>,
        idle_timeout: Option<Duration>,
        buffer_size: usize,
    ) -> Self {
        Self {
            connection,
            sessions,
            idle_timeout,
            lines: LineAssembler::new(),
            pending: VecDeque::new(),
            buffer: vec![0; buffer_size.max(1)],
        }
    }

    /// Run until the connection ends, then clean up
    #[instrument(skip(self), fields(connection_id = %self.connection.id()))]
    pub(crate) async fn run(mut self) {
        match self.event_loop().await {
            Ok(()) => {}
            Err(TelnetError::Timeout) => info!("Connection idle timeout"),
            Err(TelnetError::ConnectionClosed) => debug!("Connection closed"),
            Err(e) if e.is_connection_error() => debug!(error = %e, "Connection dropped"),
            Err(e) => warn!(error = %e, "Connection worker failed"),
        }
        self.cleanup().await;
    }

    async fn event_loop(&mut self) -> Result<()> {
        loop {
            if let Some(timeout) = self.idle_timeout {
                self.connection
                    .set_read_deadline(Some(Instant::now() + timeout));
            }

            let n = if self.pending.is_empty() {
                self.connection.read(&mut self.buffer).await?
            } else {
                self.connection
                    .read_or_wake(
                        &mut self.buffer,
                        self.connection.message_handler_installed(),
                    )
                    .await?
            };
            if n > 0 {
                let lines = self.lines.push(&self.buffer[..n]);
                self.pending.extend(lines);
            }
            self.deliver().await;
        }
    }

    /// Hand held lines to the message handler, oldest first
    async fn deliver(&mut self) {
        while !self.pending.is_empty() {
            // Fetched per line so a handler installed mid-stream takes effect
            let Some(handler) = self.connection.message_handler() else {
                while self.pending.len() > MAX_PENDING_LINES {
                    if let Some(line) = self.pending.pop_front() {
                        warn!(line = %line, "No message handler installed, dropping line");
                    }
                }
                return;
            };
            if let Some(line) = self.pending.pop_front() {
                handler(self.connection.clone(), line).await;
            }
        }
    }

    async fn cleanup(&mut self) {
        if let Err(e) = self.connection.close().await {
            debug!(error = %e, "Error closing connection");
        }
        if let (Some(sessions), Some(id)) = (&self.sessions, self.connection.session_id()) {
            sessions.end_session(&id);
        }
        self.connection.notify_disconnect().await;
        info!("Connection closed");
    }
}
