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


//! Line assembly and word wrapping over the decoded data stream

use bytes::BytesMut;

/// Collects data bytes and splits them into lines at `LF`.
///
/// A `CR` immediately before the `LF` is dropped; any other `CR` is kept.
/// Lines are decoded as lossy UTF-8 and returned without their terminator.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: BytesMut,
}

impl LineAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Append data bytes and return every line they complete, in order
    pub fn push(&mut self, data: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(data);
        let mut lines = Vec::new();
        while let Some(line) = self.next_line() {
            lines.push(line);
        }
        lines
    }

    /// Take the next complete line, if any
    pub fn next_line(&mut self) -> Option<String> {
        let i = self.buf.iter().position(|&b| b == b'\n')?;
        let raw = self.buf.split_to(i + 1);
        Some(trim_crlf(&raw))
    }

    /// Bytes received after the last complete line
    pub fn partial(&self) -> &[u8] {
        &self.buf
    }
}

/// Strips a trailing `\n` and an optional `\r` before it, decoding as lossy UTF-8
pub(crate) fn trim_crlf(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Breaks `message` into lines no wider than `width` characters, each ending in CRLF.
///
/// Words are packed greedily and separated by single spaces. A word longer
/// than `width` is placed on a line of its own rather than split. Existing
/// line breaks in `message` are kept. A `width` of zero is treated as one.
pub fn wrap_text(message: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(message.len() + message.len() / width * 2 + 2);
    for paragraph in message.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if line_len > 0 && line_len + 1 + word_len > width {
                out.push_str("\r\n");
                line_len = 0;
            }
            if line_len > 0 {
                out.push(' ');
                line_len += 1;
            }
            out.push_str(word);
            line_len += word_len;
        }
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_crlf_and_lf() {
        let mut lines = LineAssembler::new();
        assert_eq!(lines.push(b"abc\r\ndef\n"), vec!["abc", "def"]);
        assert!(lines.partial().is_empty());
    }

    #[test]
    fn keeps_partial_line_until_terminated() {
        let mut lines = LineAssembler::new();
        assert!(lines.push(b"hel").is_empty());
        assert_eq!(lines.partial(), b"hel");
        assert_eq!(lines.push(b"lo\r"), Vec::<String>::new());
        assert_eq!(lines.push(b"\n"), vec!["hello"]);
    }

    #[test]
    fn inner_cr_is_kept() {
        let mut lines = LineAssembler::new();
        assert_eq!(lines.push(b"a\rb\n"), vec!["a\rb"]);
    }

    #[test]
    fn empty_lines() {
        let mut lines = LineAssembler::new();
        assert_eq!(lines.push(b"\r\n\n"), vec!["", ""]);
    }

    #[test]
    fn wrap_short_message() {
        assert_eq!(wrap_text("hello world", 80), "hello world\r\n");
    }

    #[test]
    fn wrap_breaks_at_width() {
        assert_eq!(
            wrap_text("the quick brown fox jumps", 10),
            "the quick\r\nbrown fox\r\njumps\r\n"
        );
    }

    #[test]
    fn wrap_long_word_gets_own_line() {
        assert_eq!(wrap_text("a abcdefghij b", 4), "a\r\nabcdefghij\r\nb\r\n");
    }

    #[test]
    fn wrap_keeps_paragraphs() {
        assert_eq!(wrap_text("one\r\ntwo", 80), "one\r\ntwo\r\n");
    }

    #[test]
    fn wrap_empty_message() {
        assert_eq!(wrap_text("", 80), "\r\n");
    }
}
