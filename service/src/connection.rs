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


//! Telnet connection
//!
//! A [`Connection`] owns one transport stream and runs every inbound byte
//! through a [`TelnetCodec`]. Negotiation replies produced by the codec are
//! written back before the next inbound byte is decoded; application data is
//! handed out through the pull-read API (`read`, `read_byte`, `read_string`)
//! or, for connections accepted by a [`crate::TelnetListener`], through the
//! message handler called by the worker task.

use crate::handler::{
    Callbacks, DisconnectHandler, MessageHandler, OptionCallback, SubnegotiationHandler,
};
use crate::line::{trim_crlf, wrap_text};
use crate::{ConnectionId, ListenerConfig, Result, SessionId, TelnetError, Transport};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use futures::FutureExt;
use metrics::{counter, gauge};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError, Weak};
use telnetkit_telnetcodec::{TelnetArgument, TelnetCodec, TelnetEvent, TelnetOption};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tokio_util::codec::{Decoder, Encoder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Width used by [`Connection::write_wrapped_auto`] until the peer reports one
pub const DEFAULT_TERMINAL_WIDTH: u16 = 80;

/// A Telnet connection
///
/// Cheap to clone; every clone refers to the same stream and state.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

/// A non-owning reference to a [`Connection`], as held by a session
#[derive(Clone, Debug, Default)]
pub struct WeakConnection(Weak<Inner>);

impl WeakConnection {
    /// The connection, if any handle to it is still alive
    pub fn upgrade(&self) -> Option<Connection> {
        self.0.upgrade().map(|inner| Connection { inner })
    }
}

struct Inner {
    id: ConnectionId,
    peer_addr: Option<SocketAddr>,
    local_addr: Option<SocketAddr>,
    read_buffer_size: usize,

    // Held across transport I/O
    reader: Mutex<ReadState>,
    writer: Mutex<BoxedWriter>,

    // Never held across an await
    codec: std::sync::Mutex<TelnetCodec>,
    state: std::sync::Mutex<SharedState>,

    closed: CancellationToken,
    handler_installed: Notify,
    disconnected: AtomicBool,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

impl Drop for Inner {
    fn drop(&mut self) {
        gauge!("telnetkit.connections.active").decrement(1.0);
    }
}

struct ReadState {
    stream: BoxedReader,
    /// Raw bytes read from the transport, not yet decoded
    raw: BytesMut,
    /// Decoded data bytes not yet handed to the application
    data: BytesMut,
}

impl ReadState {
    /// Drop the read half of the transport
    fn release(&mut self) {
        self.stream = Box::new(tokio::io::empty());
    }
}

#[derive(Debug, Default)]
struct SharedState {
    callbacks: Callbacks,
    terminal_type: String,
    terminal_size: (u16, u16),
    session_id: Option<SessionId>,
    read_deadline: Option<Instant>,
    write_deadline: Option<Instant>,
}

async fn with_deadline<F: Future>(deadline: Option<Instant>, future: F) -> Result<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, future)
            .await
            .map_err(|_| TelnetError::Timeout),
        None => Ok(future.await),
    }
}

impl Connection {
    /// Wrap a stream with default settings
    pub fn new<T: Transport>(stream: T) -> Self {
        Self::with_config(stream, &ListenerConfig::default())
    }

    /// Wrap a stream, taking the read buffer size and `AYT` reply from `config`
    pub fn with_config<T: Transport>(stream: T, config: &ListenerConfig) -> Self {
        Self::wrap(stream, config, ConnectionId::next())
    }

    #[instrument(skip(stream, config), fields(connection_id = %id))]
    fn wrap<T: Transport>(stream: T, config: &ListenerConfig, id: ConnectionId) -> Self {
        let peer_addr = stream.peer_addr().ok();
        let local_addr = stream.local_addr().ok();

        match peer_addr {
            Some(peer_addr) => info!(peer_addr = %peer_addr, "Creating new telnet connection"),
            None => info!("Creating new telnet connection"),
        }

        counter!("telnetkit.connections.total").increment(1);
        gauge!("telnetkit.connections.active").increment(1.0);

        let (reader, writer) = tokio::io::split(stream);
        let codec = TelnetCodec::new().with_ayt_reply(config.ayt_reply.clone());

        Self {
            inner: Arc::new(Inner {
                id,
                peer_addr,
                local_addr,
                read_buffer_size: config.read_buffer_size.max(1),
                reader: Mutex::new(ReadState {
                    stream: Box::new(reader),
                    raw: BytesMut::with_capacity(config.read_buffer_size),
                    data: BytesMut::new(),
                }),
                writer: Mutex::new(Box::new(writer)),
                codec: std::sync::Mutex::new(codec),
                state: std::sync::Mutex::new(SharedState::default()),
                closed: CancellationToken::new(),
                handler_installed: Notify::new(),
                disconnected: AtomicBool::new(false),
                bytes_sent: AtomicU64::new(0),
                bytes_received: AtomicU64::new(0),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SharedState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn codec(&self) -> MutexGuard<'_, TelnetCodec> {
        self.inner
            .codec
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the connection ID
    pub fn id(&self) -> ConnectionId {
        self.inner.id
    }

    /// A non-owning handle to this connection
    pub fn downgrade(&self) -> WeakConnection {
        WeakConnection(Arc::downgrade(&self.inner))
    }

    /// Address of the peer
    pub fn remote_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr.ok_or_else(|| {
            TelnetError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "transport has no peer address",
            ))
        })
    }

    /// Local address of the transport
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.inner.local_addr.ok_or_else(|| {
            TelnetError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "transport has no local address",
            ))
        })
    }

    /// Get bytes sent, after escaping
    pub fn bytes_sent(&self) -> u64 {
        self.inner.bytes_sent.load(Ordering::Relaxed)
    }

    /// Get raw bytes received
    pub fn bytes_received(&self) -> u64 {
        self.inner.bytes_received.load(Ordering::Relaxed)
    }

    /// Whether [`Connection::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    // ------------------------------------------------------------------
    // Negotiated state
    // ------------------------------------------------------------------

    /// Terminal type reported by the peer; empty until negotiated
    pub fn terminal_type(&self) -> String {
        self.state().terminal_type.clone()
    }

    /// Window size reported by the peer as `(width, height)`; zero until negotiated
    pub fn terminal_size(&self) -> (u16, u16) {
        self.state().terminal_size
    }

    /// Whether the option is currently recorded as enabled
    pub fn is_option_enabled(&self, option: TelnetOption) -> bool {
        self.codec().is_enabled(option)
    }

    /// Recorded state of an option; `None` if it was never negotiated
    pub fn option_state(&self, option: TelnetOption) -> Option<bool> {
        self.codec().option_state(option)
    }

    /// Session this connection was registered under, if any
    pub fn session_id(&self) -> Option<SessionId> {
        self.state().session_id.clone()
    }

    pub(crate) fn set_session_id(&self, id: SessionId) {
        self.state().session_id = Some(id);
    }

    // ------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------

    /// Install the handler called with every received line
    ///
    /// Only used for connections accepted by a [`crate::TelnetListener`].
    pub fn set_message_handler<F, Fut>(&self, handler: F)
    where
        F: Fn(Connection, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: MessageHandler = Arc::new(move |conn, line| handler(conn, line).boxed());
        self.state().callbacks.message = Some(handler);
        self.inner.handler_installed.notify_one();
    }

    /// Install the handler called once when the connection ends
    pub fn set_disconnect_handler<F, Fut>(&self, handler: F)
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: DisconnectHandler = Arc::new(move |conn| handler(conn).boxed());
        self.state().callbacks.disconnect = Some(handler);
    }

    /// Install the callback fired when the recorded state of `option` changes
    pub fn set_option_callback<F, Fut>(&self, option: TelnetOption, callback: F)
    where
        F: Fn(Connection, TelnetOption, bool) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: OptionCallback =
            Arc::new(move |conn, option, enabled| callback(conn, option, enabled).boxed());
        self.state()
            .callbacks
            .options
            .insert(option.to_u8(), callback);
    }

    /// Whether an option callback is installed for `option`
    pub fn has_option_callback(&self, option: TelnetOption) -> bool {
        self.state()
            .callbacks
            .options
            .contains_key(&option.to_u8())
    }

    /// Install the handler for subnegotiations of `option`
    ///
    /// Reported terminal types and window sizes are recorded by the connection
    /// itself and never reach this handler. Subnegotiations for options without a handler
    /// are dropped.
    pub fn set_subnegotiation_handler<F, Fut>(&self, option: TelnetOption, handler: F)
    where
        F: Fn(Connection, TelnetOption, Bytes) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: SubnegotiationHandler =
            Arc::new(move |conn, option, payload| handler(conn, option, payload).boxed());
        self.state()
            .callbacks
            .subnegotiations
            .insert(option.to_u8(), handler);
    }

    pub(crate) fn message_handler(&self) -> Option<MessageHandler> {
        self.state().callbacks.message.clone()
    }

    /// Completes after the next call to [`Connection::set_message_handler`]
    pub(crate) async fn message_handler_installed(&self) {
        self.inner.handler_installed.notified().await;
    }

    /// Runs the disconnect handler unless it already ran
    pub(crate) async fn notify_disconnect(&self) {
        if self.inner.disconnected.swap(true, Ordering::AcqRel) {
            return;
        }
        let handler = self.state().callbacks.disconnect.clone();
        if let Some(handler) = handler {
            handler(self.clone()).await;
        }
    }

    // ------------------------------------------------------------------
    // Deadlines
    // ------------------------------------------------------------------

    /// Set both the read and the write deadline; `None` clears them
    pub fn set_deadline(&self, deadline: Option<Instant>) {
        let mut state = self.state();
        state.read_deadline = deadline;
        state.write_deadline = deadline;
    }

    /// Reads waiting past `deadline` fail with [`TelnetError::Timeout`]
    pub fn set_read_deadline(&self, deadline: Option<Instant>) {
        self.state().read_deadline = deadline;
    }

    /// Writes not finished by `deadline` fail with [`TelnetError::Timeout`]
    pub fn set_write_deadline(&self, deadline: Option<Instant>) {
        self.state().write_deadline = deadline;
    }

    // ------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------

    /// Escape `data` and write it
    ///
    /// Returns the number of bytes handed to the transport, which exceeds
    /// `data.len()` by one for every `IAC` byte in `data`.
    #[instrument(skip(self, data), fields(connection_id = %self.inner.id, len = data.len()))]
    pub async fn write(&self, data: &[u8]) -> Result<usize> {
        let mut buf = BytesMut::with_capacity(data.len());
        self.codec().encode(data, &mut buf)?;
        self.write_raw(&buf).await?;
        Ok(buf.len())
    }

    /// Write a string as escaped bytes
    pub async fn write_str(&self, text: &str) -> Result<usize> {
        self.write(text.as_bytes()).await
    }

    /// Write `message` word wrapped to `width` columns, with CRLF line endings
    pub async fn write_wrapped(&self, message: &str, width: usize) -> Result<usize> {
        self.write_str(&wrap_text(message, width)).await
    }

    /// Write `message` word wrapped to the negotiated terminal width
    pub async fn write_wrapped_auto(&self, message: &str) -> Result<usize> {
        let width = match self.terminal_size().0 {
            0 => DEFAULT_TERMINAL_WIDTH,
            width => width,
        };
        self.write_wrapped(message, usize::from(width)).await
    }

    /// Writes bytes verbatim under the write lock
    ///
    /// A failed or timed out write may have left part of `bytes` on the wire,
    /// so it marks the connection closed; nothing may follow a torn command.
    async fn write_raw(&self, bytes: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(TelnetError::ConnectionClosed);
        }
        let deadline = self.state().write_deadline;
        let mut writer = self.inner.writer.lock().await;
        let io = async {
            writer.write_all(bytes).await?;
            writer.flush().await
        };
        tokio::select! {
            _ = self.inner.closed.cancelled() => Err(TelnetError::ConnectionClosed),
            result = with_deadline(deadline, io) => match result.and_then(|io| io.map_err(TelnetError::Io)) {
                Ok(()) => {
                    self.inner
                        .bytes_sent
                        .fetch_add(bytes.len() as u64, Ordering::Relaxed);
                    counter!("telnetkit.bytes.sent").increment(bytes.len() as u64);
                    Ok(())
                }
                Err(e) => {
                    debug!(connection_id = %self.inner.id, error = %e, "Write failed, closing connection");
                    self.inner.closed.cancel();
                    Err(e)
                }
            },
        }
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Read data bytes into `buf`
    ///
    /// Pulls one chunk from the transport when nothing is buffered and runs it
    /// through the protocol machine. Returns `Ok(0)` when that chunk held only
    /// command traffic. End of stream is reported as
    /// [`TelnetError::ConnectionClosed`].
    #[instrument(skip(self, buf), fields(connection_id = %self.inner.id))]
    pub async fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.read_or_wake(buf, std::future::pending()).await
    }

    /// Like [`Connection::read`], but returns `Ok(0)` early if `wake`
    /// completes while waiting on the transport
    ///
    /// `wake` only interrupts the transport read itself, never decoding or a
    /// reply write, so no input or output is lost.
    pub(crate) async fn read_or_wake<W>(&self, buf: &mut [u8], wake: W) -> Result<usize>
    where
        W: Future<Output = ()>,
    {
        let mut reader = self.inner.reader.lock().await;
        if reader.data.is_empty() {
            self.fill(&mut reader, wake).await?;
        }
        let n = buf.len().min(reader.data.len());
        buf[..n].copy_from_slice(&reader.data[..n]);
        reader.data.advance(n);
        Ok(n)
    }

    /// Read a single data byte, waiting through command-only input
    pub async fn read_byte(&self) -> Result<u8> {
        let mut reader = self.inner.reader.lock().await;
        loop {
            if let Some(&byte) = reader.data.first() {
                reader.data.advance(1);
                return Ok(byte);
            }
            self.fill(&mut reader, std::future::pending()).await?;
        }
    }

    /// Read up to the next `LF`
    ///
    /// The result excludes the `LF`, and a `CR` directly before it is
    /// dropped. Invalid UTF-8 is replaced.
    pub async fn read_string(&self) -> Result<String> {
        let mut reader = self.inner.reader.lock().await;
        loop {
            if let Some(i) = reader.data.iter().position(|&b| b == b'\n') {
                let raw = reader.data.split_to(i + 1);
                return Ok(trim_crlf(&raw));
            }
            self.fill(&mut reader, std::future::pending()).await?;
        }
    }

    /// Read one chunk from the transport and decode all of it
    async fn fill<W>(&self, reader: &mut ReadState, wake: W) -> Result<()>
    where
        W: Future<Output = ()>,
    {
        if self.is_closed() {
            reader.release();
            return Err(TelnetError::ConnectionClosed);
        }
        let deadline = self.state().read_deadline;
        let n = {
            let ReadState { stream, raw, .. } = &mut *reader;
            raw.reserve(self.inner.read_buffer_size);
            tokio::select! {
                _ = self.inner.closed.cancelled() => None,
                _ = wake => return Ok(()),
                result = with_deadline(deadline, stream.read_buf(raw)) => Some(result??),
            }
        };
        let Some(n) = n else {
            reader.release();
            return Err(TelnetError::ConnectionClosed);
        };
        if n == 0 {
            debug!(connection_id = %self.inner.id, "Connection stream ended");
            return Err(TelnetError::ConnectionClosed);
        }
        trace!(bytes = n, "Read from transport");
        self.inner
            .bytes_received
            .fetch_add(n as u64, Ordering::Relaxed);
        counter!("telnetkit.bytes.received").increment(n as u64);

        self.process(reader).await
    }

    /// Decode every buffered raw byte, flushing replies after each event
    async fn process(&self, reader: &mut ReadState) -> Result<()> {
        loop {
            let (event, replies) = {
                let mut codec = self.codec();
                let event = codec.decode(&mut reader.raw)?;
                (event, codec.take_responses())
            };
            if !replies.is_empty() {
                if let Err(e) = self.write_raw(&replies).await {
                    warn!(
                        connection_id = %self.inner.id,
                        error = %e,
                        "Failed to send protocol reply"
                    );
                    return Err(e);
                }
            }
            match event {
                Some(event) => self.handle_event(event, &mut reader.data).await,
                None => return Ok(()),
            }
        }
    }

    async fn handle_event(&self, event: TelnetEvent, data: &mut BytesMut) {
        match event {
            TelnetEvent::Data(byte) => data.put_u8(byte),
            TelnetEvent::OptionStatus(option, enabled) => {
                counter!("telnetkit.negotiations.received").increment(1);
                debug!(connection_id = %self.inner.id, %option, enabled, "Option state changed");
                let callback = self
                    .state()
                    .callbacks
                    .options
                    .get(&option.to_u8())
                    .cloned();
                if let Some(callback) = callback {
                    callback(self.clone(), option, enabled).await;
                }
            }
            TelnetEvent::OptionRequest(verb, option) => {
                counter!("telnetkit.negotiations.received").increment(1);
                trace!("Absorbed repeated {} {}", verb, option);
            }
            TelnetEvent::Subnegotiate(argument) => self.handle_subnegotiation(argument).await,
            other => trace!(event = ?other, "Control command"),
        }
    }

    async fn handle_subnegotiation(&self, argument: TelnetArgument) {
        match argument {
            TelnetArgument::TerminalType(name) => {
                debug!(connection_id = %self.inner.id, terminal_type = %name, "Terminal type reported");
                self.state().terminal_type = name;
            }
            TelnetArgument::NAWSWindowSize(size) => {
                debug!(connection_id = %self.inner.id, window_size = %size, "Window size reported");
                self.state().terminal_size = (size.cols, size.rows);
            }
            other => {
                let option = other.option();
                let handler = self
                    .state()
                    .callbacks
                    .subnegotiations
                    .get(&option.to_u8())
                    .cloned();
                match handler {
                    Some(handler) => handler(self.clone(), option, Bytes::from(other.payload())).await,
                    None => debug!(
                        connection_id = %self.inner.id,
                        %option,
                        "Dropping subnegotiation without a handler"
                    ),
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Close the connection
    ///
    /// Pending and future reads and writes fail with
    /// [`TelnetError::ConnectionClosed`]. The write side of the transport is
    /// shut down and both halves are dropped, so the socket is released even
    /// while clones of this handle are alive. Closing twice is harmless.
    #[instrument(skip(self), fields(connection_id = %self.inner.id))]
    pub async fn close(&self) -> Result<()> {
        if !self.is_closed() {
            self.inner.closed.cancel();
            info!("Closing telnet connection");
        }

        // A read in progress releases its half itself once it sees the cancellation
        if let Ok(mut reader) = self.inner.reader.try_lock() {
            reader.release();
        }

        let mut writer = self.inner.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            debug!(error = %e, "Transport shutdown failed");
        }
        *writer = Box::new(tokio::io::sink());
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.inner.id)
            .field("peer_addr", &self.inner.peer_addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}
