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


//! Telnet Service
//!
//! Async Telnet connections and a TCP listener built on
//! [`telnetkit_telnetcodec`]. Option negotiation is answered automatically;
//! applications see decoded data as bytes or lines and can hook option
//! changes and subnegotiations with async callbacks.
//!
//! # Architecture
//!
//! ```text
//! TelnetListener ── accept ──> Connection ──> SessionManager
//!                                  │
//!                            ConnectionWorker ── lines ──> message handler
//! ```
//!
//! # Example
//!
//! ```no_run
//! use telnetkit_service::{TelnetListener, TelnetOption};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = TelnetListener::bind("127.0.0.1:2323").await?;
//!     listener.set_timeout(Duration::from_secs(300));
//!
//!     loop {
//!         let conn = listener.accept().await?;
//!         conn.set_option_callback(TelnetOption::NAWS, |conn, _, enabled| async move {
//!             tracing::info!(enabled, size = ?conn.terminal_size(), "NAWS");
//!         });
//!         conn.set_message_handler(|conn, line| async move {
//!             let _ = conn.write_wrapped_auto(&line).await;
//!         });
//!     }
//! }
//! ```

mod config;
mod connection;
mod error;
mod handler;
mod line;
mod listener;
mod session;
mod transport;
mod types;
mod worker;

pub use config::ListenerConfig;
pub use connection::{Connection, DEFAULT_TERMINAL_WIDTH, WeakConnection};
pub use error::{Result, TelnetError};
pub use handler::{DisconnectHandler, MessageHandler, OptionCallback, SubnegotiationHandler};
pub use line::{LineAssembler, wrap_text};
pub use listener::TelnetListener;
pub use session::{Session, SessionManager};
pub use transport::Transport;
pub use types::{ConnectionId, SESSION_ID_BYTES, SessionId};

pub use telnetkit_telnetcodec::naws::WindowSize;
pub use telnetkit_telnetcodec::{TelnetOption, TelnetVerb};
