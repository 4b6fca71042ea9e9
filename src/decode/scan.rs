use memchr::{memchr2, memmem};
use smallvec::SmallVec;

pub type Tokens<'a> = SmallVec<[&'a str; 8]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Nothing but whitespace.
    Blank,
    /// Non-empty only because of a comment.
    Comment,
    Content,
}

#[derive(Clone, Copy, Debug)]
pub struct ScanLine<'a> {
    pub kind: LineKind,
    /// Text with comments and the line terminator removed, trimmed.
    pub content: &'a str,
}

impl<'a> ScanLine<'a> {
    pub fn tokens(&self) -> Tokens<'a> {
        split_tokens(self.content)
    }

    pub fn is_content(&self) -> bool {
        self.kind == LineKind::Content
    }

    /// First token, if any.
    pub fn head(&self) -> Option<&'a str> {
        split_tokens(self.content).first().copied()
    }
}

pub fn scan_line(raw: &str) -> ScanLine<'_> {
    let raw = trim_terminator(raw);
    if raw.bytes().all(|b| b.is_ascii_whitespace()) {
        return ScanLine {
            kind: LineKind::Blank,
            content: "",
        };
    }
    let content = strip_comment(raw).trim();
    if split_tokens(content).is_empty() {
        return ScanLine {
            kind: LineKind::Comment,
            content: "",
        };
    }
    ScanLine {
        kind: LineKind::Content,
        content,
    }
}

/// Cut the line at the first `#`, `!` or `//`.
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let single = memchr2(b'#', b'!', bytes);
    let double = memmem::find(bytes, b"//");
    let cut = match (single, double) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return line,
    };
    &line[..cut]
}

/// Whitespace- and comma-separated tokens.
pub fn split_tokens(content: &str) -> Tokens<'_> {
    content
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|token| !token.is_empty())
        .collect()
}

fn trim_terminator(raw: &str) -> &str {
    let raw = raw.strip_suffix('\n').unwrap_or(raw);
    raw.strip_suffix('\r').unwrap_or(raw)
}
