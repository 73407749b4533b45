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


//! Byte stream abstraction under a [`crate::Connection`]

use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream};
use tokio::net::TcpStream;

/// A bidirectional byte stream a connection can run on.
///
/// Reading, writing and shutdown come from `AsyncRead`/`AsyncWrite`; this
/// trait adds the socket addresses. Deadlines are enforced by the connection
/// with tokio timers, so transports need no timer support of their own.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Address of the remote end
    fn peer_addr(&self) -> io::Result<SocketAddr>;

    /// Address of the local end
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl Transport for TcpStream {
    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }
}

/// In-memory pipe, used for tests and for embedding. It has no addresses.
impl Transport for DuplexStream {
    fn peer_addr(&self) -> io::Result<SocketAddr> {
        Err(io::Error::new(
            io::ErrorKind::NotConnected,
            "in-memory stream has no peer address",
        ))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Err(io::Error::new(
            io::ErrorKind::NotConnected,
            "in-memory stream has no local address",
        ))
    }
}
