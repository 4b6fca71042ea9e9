//! Write documents and values back out in the block input language.

mod writer;

use std::io::Write;

use crate::array::{Array, Data};
use crate::constants::{BEGIN, BINARY, END, FACTOR, IPRN, LAYERED};
use crate::document::{Block, Document};
use crate::options::WriteOptions;
use crate::param::{Keystring, List, Record, Scalar, Value};
use crate::Result;

use self::writer::Writer;

pub fn to_string(document: &Document, options: &WriteOptions) -> String {
    let mut encoder = Encoder::new(options);
    encoder.document(document);
    encoder.writer.finish()
}

pub fn to_vec(document: &Document, options: &WriteOptions) -> Vec<u8> {
    let mut encoder = Encoder::new(options);
    encoder.document(document);
    encoder.writer.finish_bytes()
}

pub fn to_writer<W: Write>(mut out: W, document: &Document, options: &WriteOptions) -> Result<()> {
    out.write_all(&to_vec(document, options))?;
    Ok(())
}

/// Text of a single parameter as it appears inside a block.
pub fn value_to_string(name: &str, value: &Value, options: &WriteOptions) -> String {
    let mut encoder = Encoder::new(options);
    encoder.value(name, value, 1);
    encoder.writer.finish()
}

impl Value {
    /// Write this value as parameter `name`.
    pub fn write<W: Write>(&self, name: &str, mut out: W, options: &WriteOptions) -> Result<()> {
        out.write_all(value_to_string(name, self, options).as_bytes())?;
        Ok(())
    }
}

struct Encoder {
    writer: Writer,
}

impl Encoder {
    fn new(options: &WriteOptions) -> Self {
        Self {
            writer: Writer::new(options.clone()),
        }
    }

    fn document(&mut self, document: &Document) {
        for (ix, block) in document.blocks.iter().enumerate() {
            if ix > 0 {
                self.writer.write_newline();
            }
            self.block(block);
        }
    }

    fn block(&mut self, block: &Block) {
        self.block_line(BEGIN, block);
        for (key, value) in &block.params {
            self.value(key, value, 1);
        }
        self.block_line(END, block);
    }

    fn block_line(&mut self, keyword: &str, block: &Block) {
        self.writer.write_str(keyword);
        self.writer.write_char(' ');
        self.writer.write_name(&block.name);
        if let Some(index) = block.index {
            self.writer.write_char(' ');
            self.writer.write_usize(index);
        }
        self.writer.write_newline();
    }

    fn value(&mut self, name: &str, value: &Value, depth: usize) {
        match value {
            Value::Scalar(scalar) => self.scalar(name, scalar, depth),
            Value::Record(record) => self.record(record, depth),
            Value::Keystring(keystring) => self.keystring(keystring, depth),
            Value::List(list) => self.list(list, depth),
            Value::Array(array) => self.array(name, array, depth),
        }
    }

    fn scalar(&mut self, name: &str, scalar: &Scalar, depth: usize) {
        if scalar.as_bool() == Some(false) {
            return;
        }
        self.writer.write_indent(depth);
        self.writer.write_name(name);
        if let Some(text) = scalar.value_text() {
            self.writer.write_char(' ');
            self.writer.write_str(&text);
        }
        self.writer.write_newline();
    }

    fn record(&mut self, record: &Record, depth: usize) {
        self.writer.write_indent(depth);
        self.writer.write_name(&record.name);
        for field in &record.fields {
            if field.value.as_bool() == Some(false) {
                continue;
            }
            if field.tagged || field.value.as_bool().is_some() {
                self.writer.write_char(' ');
                self.writer.write_name(&field.name);
            }
            if let Some(text) = field.value.value_text() {
                self.writer.write_char(' ');
                self.writer.write_str(&text);
            }
        }
        self.writer.write_newline();
    }

    fn keystring(&mut self, keystring: &Keystring, depth: usize) {
        for (name, value) in &keystring.entries {
            self.value(name, value, depth);
        }
        self.writer.write_newline();
    }

    fn list(&mut self, list: &List, depth: usize) {
        for row in 0..list.rows() {
            let Some(fields) = list.row(row) else {
                continue;
            };
            self.writer.write_indent(depth);
            for (ix, (name, field)) in list.columns.keys().zip(&fields).enumerate() {
                if ix > 0 {
                    self.writer.write_str("  ");
                }
                match field.value_text() {
                    Some(text) => self.writer.write_str(&text),
                    None => self.writer.write_name(name),
                }
            }
            self.writer.write_newline();
        }
    }

    fn array(&mut self, name: &str, array: &Array, depth: usize) {
        self.writer.write_indent(depth);
        self.writer.write_name(name);
        match array.layers() {
            Some(layers) => {
                self.writer.write_char(' ');
                self.writer.write_str(LAYERED);
                self.writer.write_newline();
                for layer in layers {
                    self.array_body(layer, depth + 1);
                }
            }
            None => {
                self.writer.write_newline();
                self.array_body(array, depth + 1);
            }
        }
    }

    /// Control line plus any internal data for a non-layered array.
    fn array_body(&mut self, array: &Array, depth: usize) {
        let Some(encoded) = array.encoded() else {
            return;
        };
        self.writer.write_indent(depth);
        self.writer.write_str(array.how().single().map_or("", |how| how.as_str()));
        match &encoded.data {
            Data::Constant(value) => {
                self.writer.write_char(' ');
                self.writer.write_double(*value);
            }
            Data::External { path, .. } => {
                self.writer.write_char(' ');
                self.writer.write_str(&path.display().to_string());
            }
            Data::Internal(_) => {}
        }
        if let Some(factor) = encoded.factor {
            self.writer.write_char(' ');
            self.writer.write_str(FACTOR);
            self.writer.write_char(' ');
            self.writer.write_double(factor);
        }
        if let Data::External { binary: true, .. } = encoded.data {
            self.writer.write_char(' ');
            self.writer.write_str(BINARY);
        }
        if let Some(iprn) = encoded.iprn {
            self.writer.write_char(' ');
            self.writer.write_str(IPRN);
            self.writer.write_char(' ');
            self.writer.write_integer(i64::from(iprn));
        }
        self.writer.write_newline();

        if let Data::Internal(values) = &encoded.data {
            let per_line = self
                .writer
                .options
                .values_per_line
                .or_else(|| array.shape().last().copied())
                .filter(|count| *count > 0)
                .unwrap_or(1);
            for chunk in values.chunks(per_line) {
                self.writer.write_indent(depth + 1);
                self.writer.write_doubles(chunk);
                self.writer.write_newline();
            }
        }
    }
}
