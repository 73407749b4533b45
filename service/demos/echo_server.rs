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


//! Simple Echo Server
//!
//! Accepts connections on port 2323 and echoes every line back, word
//! wrapped to the client's window width once it reports one.
//!
//! ## Usage
//!
//! Run the server:
//! ```bash
//! cargo run --example echo_server
//! ```
//!
//! Connect with a telnet client:
//! ```bash
//! telnet localhost 2323
//! ```

use std::time::Duration;
use telnetkit_service::{ListenerConfig, TelnetError, TelnetListener, TelnetOption};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("Starting echo server on 127.0.0.1:2323");
    println!("Connect with: telnet localhost 2323");
    println!("Press Ctrl+C to stop the server\n");

    let config = ListenerConfig::new("127.0.0.1:2323".parse()?)
        .with_read_timeout(Some(Duration::from_secs(300)));
    let listener = TelnetListener::with_config(config).await?;

    loop {
        let conn = tokio::select! {
            result = listener.accept() => match result {
                Ok(conn) => conn,
                Err(TelnetError::ListenerClosed) => break,
                Err(e) => {
                    tracing::error!("Accept failed: {}", e);
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down server...");
                listener.shutdown().await;
                break;
            }
        };

        tracing::info!("Client {} connected", conn.id());

        conn.set_option_callback(TelnetOption::NAWS, |conn, _, enabled| async move {
            tracing::debug!("Client {} NAWS enabled: {}", conn.id(), enabled);
        });

        conn.set_message_handler(|conn, line| async move {
            if line.trim().eq_ignore_ascii_case("quit") {
                let _ = conn.write_str("Goodbye!\r\n").await;
                let _ = conn.close().await;
                return;
            }
            if let Err(e) = conn.write_wrapped_auto(&format!("Echo: {line}")).await {
                tracing::error!("Failed to send echo to {}: {}", conn.id(), e);
            }
        });

        conn.set_disconnect_handler(|conn| async move {
            tracing::info!("Client {} disconnected", conn.id());
        });

        if let Err(e) = conn
            .write_str("Welcome! Type anything and it will be echoed back.\r\n")
            .await
        {
            tracing::error!("Failed to send welcome message: {}", e);
        }
    }

    println!("Server stopped");
    Ok(())
}
