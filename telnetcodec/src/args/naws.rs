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


//! Negotiate About Window Size
//!

use crate::{CodecError, CodecResult, SubnegotiationErrorKind};
use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, BufMut};

/// Represents the Negotiate About Window Size (NAWS) option data.
///
/// The window size is encoded as four bytes in big-endian format:
/// 2 bytes for columns (width) followed by 2 bytes for rows (height).
///
/// # Example
/// ```
/// use telnetkit_telnetcodec::naws::WindowSize;
///
/// let size = WindowSize::new(80, 24);
/// assert_eq!(size.cols, 80);
/// assert_eq!(size.rows, 24);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    /// The number of columns (characters) in the terminal window
    pub cols: u16,
    /// The number of rows (lines) in the terminal window
    pub rows: u16,
}

impl WindowSize {
    /// Creates a new `WindowSize` with the specified columns and rows.
    pub fn new(cols: u16, rows: u16) -> Self {
        WindowSize { cols, rows }
    }

    /// Returns the encoded length of this `WindowSize` in bytes. Always `4`.
    pub fn len(&self) -> usize {
        4
    }

    /// Encodes this `WindowSize` into a byte buffer using big-endian format.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        Ok(self.write(&mut dst.writer())?)
    }

    /// Writes this `WindowSize` to a writer using big-endian format.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(4)
    }

    /// Decodes a `WindowSize` from exactly the first four bytes of `src`.
    ///
    /// # Errors
    /// Returns `CodecError::SubnegotiationError` with `InsufficientData` if
    /// fewer than 4 bytes are available in the buffer.
    ///
    /// # Example
    /// ```
    /// use bytes::BytesMut;
    /// use telnetkit_telnetcodec::naws::WindowSize;
    ///
    /// let mut buf = BytesMut::from(&[0x00, 0x50, 0x00, 0x18][..]);
    /// let size = WindowSize::decode(&mut buf)?;
    /// assert_eq!(size, WindowSize::new(80, 24));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode<T: Buf>(src: &mut T) -> CodecResult<WindowSize> {
        // NAWS format: WIDTH-HIGH WIDTH-LOW HEIGHT-HIGH HEIGHT-LOW
        if src.remaining() >= 4 {
            Ok(WindowSize {
                cols: src.get_u16(),
                rows: src.get_u16(),
            })
        } else {
            Err(CodecError::SubnegotiationError {
                option: Some(crate::consts::option::NAWS),
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 4,
                    available: src.remaining(),
                },
            })
        }
    }

    /// Decodes a `WindowSize`, treating missing trailing bytes as zero.
    ///
    /// Bytes past the fourth are ignored. Used by the stream decoder, which
    /// never rejects a short payload from a peer.
    pub fn decode_padded(payload: &[u8]) -> WindowSize {
        let mut padded = [0u8; 4];
        let n = payload.len().min(4);
        padded[..n].copy_from_slice(&payload[..n]);
        WindowSize {
            cols: u16::from_be_bytes([padded[0], padded[1]]),
            rows: u16::from_be_bytes([padded[2], padded[3]]),
        }
    }
}

impl Default for WindowSize {
    /// A standard 80x24 terminal.
    fn default() -> Self {
        WindowSize { cols: 80, rows: 24 }
    }
}

impl std::fmt::Display for WindowSize {
    /// Formats the `WindowSize` as `(cols,rows)`, for example `(80,24)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_encode() {
        let mut buf = BytesMut::new();
        let written = WindowSize::new(132, 43).encode(&mut buf).unwrap();
        assert_eq!(written, 4);
        assert_eq!(&buf[..], &[0, 132, 0, 43]);
    }

    #[test]
    fn test_decode_large_values() {
        let mut buf = BytesMut::from(&[0x01, 0x00, 0xFF, 0xFF][..]);
        assert_eq!(WindowSize::decode(&mut buf).unwrap(), WindowSize::new(256, 65535));
    }

    #[test]
    fn test_decode_short_is_error() {
        let mut buf = BytesMut::from(&[0x00, 0x50][..]);
        let err = WindowSize::decode(&mut buf).unwrap_err();
        assert_eq!(
            err,
            CodecError::SubnegotiationError {
                option: Some(31),
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 4,
                    available: 2
                },
            }
        );
    }

    #[test]
    fn test_decode_padded() {
        assert_eq!(WindowSize::decode_padded(&[0, 80, 0, 24]), WindowSize::new(80, 24));
        assert_eq!(WindowSize::decode_padded(&[0, 80]), WindowSize::new(80, 0));
        assert_eq!(WindowSize::decode_padded(&[]), WindowSize::new(0, 0));
        assert_eq!(WindowSize::decode_padded(&[0, 80, 0, 24, 9, 9]), WindowSize::new(80, 24));
    }

    #[test]
    fn test_display_and_default() {
        assert_eq!(WindowSize::default().to_string(), "(80,24)");
    }
}
