use std::io::{BufRead, Cursor, Seek, SeekFrom};

use crate::decode::scan::scan_line;
use crate::Result;

/// A saved stream position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark {
    offset: u64,
    line: usize,
}

/// Line-oriented reader over a seekable stream. Lookahead is done by
/// reading a line and seeking back to where it started.
pub struct LineReader<R> {
    inner: R,
    offset: u64,
    line: usize,
    buf: String,
}

impl<'a> LineReader<Cursor<&'a [u8]>> {
    pub fn from_text(text: &'a str) -> Self {
        Self {
            inner: Cursor::new(text.as_bytes()),
            offset: 0,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead + Seek> LineReader<R> {
    pub fn new(mut inner: R) -> Result<Self> {
        let offset = inner.stream_position()?;
        Ok(Self {
            inner,
            offset,
            line: 0,
            buf: String::new(),
        })
    }

    /// 1-based number of the most recently read line.
    pub fn line_number(&self) -> usize {
        self.line
    }

    pub fn tell(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
        }
    }

    pub fn seek(&mut self, mark: Mark) -> Result<()> {
        self.inner.seek(SeekFrom::Start(mark.offset))?;
        self.offset = mark.offset;
        self.line = mark.line;
        Ok(())
    }

    /// Next raw line without its terminator, or `None` at end of input.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = self.inner.read_line(&mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.offset += read as u64;
        self.line += 1;
        let mut line = std::mem::take(&mut self.buf);
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// Next line that carries content, skipping blank and comment-only
    /// lines.
    pub fn read_content_line(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.read_line()? {
            if scan_line(&line).is_content() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    pub fn peek_line(&mut self) -> Result<Option<String>> {
        let mark = self.tell();
        let line = self.read_line()?;
        self.seek(mark)?;
        Ok(line)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
