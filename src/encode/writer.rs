use crate::num::number::format_double;
use crate::options::WriteOptions;

pub(crate) struct Writer {
    buffer: Vec<u8>,
    pub(crate) options: WriteOptions,
    indent_unit: String,
    indent_cache: Vec<String>,
}

impl Writer {
    pub fn new(options: WriteOptions) -> Self {
        let indent_unit = " ".repeat(options.indent.get_spaces());
        Self {
            buffer: Vec::new(),
            options,
            indent_unit,
            indent_cache: vec![String::new()],
        }
    }

    pub fn finish(self) -> String {
        String::from_utf8(self.buffer).expect("writer output must be valid UTF-8")
    }

    pub fn finish_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_str(&mut self, s: &str) {
        self.buffer.extend_from_slice(s.as_bytes());
    }

    pub fn write_char(&mut self, ch: char) {
        if ch.is_ascii() {
            self.buffer.push(ch as u8);
            return;
        }
        let mut buf = [0u8; 4];
        let encoded = ch.encode_utf8(&mut buf);
        self.buffer.extend_from_slice(encoded.as_bytes());
    }

    pub fn write_newline(&mut self) {
        self.buffer.push(b'\n');
    }

    pub fn write_indent(&mut self, depth: usize) {
        if depth == 0 || self.indent_unit.is_empty() {
            return;
        }
        if depth >= self.indent_cache.len() {
            self.extend_indent_cache(depth);
        }
        self.buffer
            .extend_from_slice(self.indent_cache[depth].as_bytes());
    }

    /// Keywords are written upper-cased.
    pub fn write_name(&mut self, name: &str) {
        for byte in name.bytes() {
            self.buffer.push(byte.to_ascii_uppercase());
        }
    }

    pub fn write_usize(&mut self, value: usize) {
        let mut buf = itoa::Buffer::new();
        self.buffer.extend_from_slice(buf.format(value as u64).as_bytes());
    }

    pub fn write_integer(&mut self, value: i64) {
        let mut buf = itoa::Buffer::new();
        self.buffer.extend_from_slice(buf.format(value).as_bytes());
    }

    pub fn write_double(&mut self, value: f64) {
        self.write_str(&format_double(value));
    }

    /// Numbers separated by single spaces.
    pub fn write_doubles(&mut self, values: &[f64]) {
        for (ix, value) in values.iter().enumerate() {
            if ix > 0 {
                self.write_char(' ');
            }
            self.write_double(*value);
        }
    }

    fn extend_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let next = match self.indent_cache.last() {
                Some(prev) => {
                    let mut s = String::with_capacity(prev.len() + self.indent_unit.len());
                    s.push_str(prev);
                    s.push_str(&self.indent_unit);
                    s
                }
                None => String::new(),
            };
            self.indent_cache.push(next);
        }
    }
}
