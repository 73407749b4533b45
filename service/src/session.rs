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


//! Session registry
//!
//! Every connection accepted by a [`crate::TelnetListener`] is registered
//! here under a random [`SessionId`]. Ended sessions stay in the registry
//! marked inactive, so an identifier is never handed out twice for the
//! lifetime of the registry.

use crate::{Connection, SessionId, WeakConnection};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

/// A registered connection
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    connection: WeakConnection,
    active: bool,
}

impl Session {
    /// Session identifier
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// `false` once the session has been ended
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The connection, while it is still alive
    pub fn connection(&self) -> Option<Connection> {
        self.connection.upgrade()
    }
}

/// Concurrent map of sessions
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: DashMap<SessionId, Session>,
}

impl SessionManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `connection` under a fresh identifier
    ///
    /// The identifier is also recorded on the connection.
    pub fn create_session(&self, connection: &Connection) -> Session {
        loop {
            let id = SessionId::generate();
            if let Entry::Vacant(entry) = self.sessions.entry(id.clone()) {
                let session = Session {
                    id: id.clone(),
                    connection: connection.downgrade(),
                    active: true,
                };
                entry.insert(session.clone());
                connection.set_session_id(id);
                info!(session_id = %session.id, connection_id = %connection.id(), "Session created");
                return session;
            }
        }
    }

    /// Look up a session, active or not
    pub fn get_session(&self, id: &SessionId) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Mark a session inactive
    ///
    /// Returns `false` if no session with that identifier was ever created.
    pub fn end_session(&self, id: &SessionId) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut entry) => {
                if entry.active {
                    entry.active = false;
                    debug!(session_id = %id, "Session ended");
                }
                true
            }
            None => false,
        }
    }

    /// Number of sessions ever created
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session was ever created
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of sessions not yet ended
    pub fn active_count(&self) -> usize {
        self.sessions.iter().filter(|entry| entry.active).count()
    }

    /// Snapshot of the sessions not yet ended
    pub fn active_sessions(&self) -> Vec<Session> {
        self.sessions
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.value().clone())
            .collect()
    }
}
