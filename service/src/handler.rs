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


//! Callback types installed on a [`Connection`]
//!
//! Callbacks are async closures. They are awaited from the connection's read
//! path, so a slow callback delays processing of further input on that
//! connection, and a callback must not itself read from the same connection.

use crate::Connection;
use bytes::Bytes;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use telnetkit_telnetcodec::TelnetOption;

/// Called once per received line, without its line terminator
pub type MessageHandler = Arc<dyn Fn(Connection, String) -> BoxFuture<'static, ()> + Send + Sync>;

/// Called once when the connection ends
pub type DisconnectHandler = Arc<dyn Fn(Connection) -> BoxFuture<'static, ()> + Send + Sync>;

/// Called when the recorded state of an option changes
pub type OptionCallback =
    Arc<dyn Fn(Connection, TelnetOption, bool) -> BoxFuture<'static, ()> + Send + Sync>;

/// Called with the raw payload of a subnegotiation the connection does not decode itself
pub type SubnegotiationHandler =
    Arc<dyn Fn(Connection, TelnetOption, Bytes) -> BoxFuture<'static, ()> + Send + Sync>;

/// Every callback registered on one connection
#[derive(Clone, Default)]
pub(crate) struct Callbacks {
    pub(crate) message: Option<MessageHandler>,
    pub(crate) disconnect: Option<DisconnectHandler>,
    pub(crate) options: HashMap<u8, OptionCallback>,
    pub(crate) subnegotiations: HashMap<u8, SubnegotiationHandler>,
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("message", &self.message.is_some())
            .field("disconnect", &self.disconnect.is_some())
            .field("options", &self.options.keys().collect::<Vec<_>>())
            .field("subnegotiations", &self.subnegotiations.keys().collect::<Vec<_>>())
            .finish()
    }
}
