pub mod array;
pub mod constants;
pub mod decode;
pub mod document;
pub mod encode;
pub mod error;
pub mod loader;
pub mod num;
pub mod options;
pub mod param;

use std::io::{BufRead, Cursor, Read, Seek, Write};
use std::path::Path;

pub use crate::array::{Array, BinaryOp, How, LayerValue, Operand};
pub use crate::decode::reader::LineReader;
pub use crate::document::{Block, Document};
pub use crate::error::{Error, ErrorKind, Location};
pub use crate::loader::Loader;
pub use crate::options::{BodyKind, Indent, ParseOptions, WriteOptions};
pub use crate::param::{
    Column, Dim, Field, FileInout, Keystring, List, ParamKind, ParamSpec, Record, Scalar,
    ScalarKind, SpecTable, Value,
};

pub type Result<T> = std::result::Result<T, Error>;

pub fn parse_document<R: BufRead + Seek>(input: R, options: &ParseOptions) -> Result<Document> {
    decode::parse_document(input, options)
}

pub fn parse_str(input: &str, options: &ParseOptions) -> Result<Document> {
    decode::from_str(input, options)
}

pub fn parse_reader<R: Read>(input: R, options: &ParseOptions) -> Result<Document> {
    decode::from_reader(input, options)
}

pub fn parse_documents<S>(inputs: &[S], options: &ParseOptions) -> Vec<Result<Document>>
where
    S: AsRef<str> + Sync,
{
    decode::parse_documents(inputs, options)
}

/// Load a document against a specification table. `OPEN/CLOSE` paths are
/// resolved against `base_dir`.
pub fn load_document<R: BufRead + Seek>(
    input: R,
    table: &SpecTable,
    base_dir: impl AsRef<Path>,
) -> Result<Document> {
    let mut reader = LineReader::new(input)?;
    Loader::new(table)
        .with_base_dir(base_dir)
        .load_document(&mut reader)
}

pub fn load_str(input: &str, table: &SpecTable, base_dir: impl AsRef<Path>) -> Result<Document> {
    load_document(Cursor::new(input.as_bytes()), table, base_dir)
}

pub fn to_string(document: &Document) -> String {
    to_string_with_options(document, &WriteOptions::default())
}

pub fn to_string_with_options(document: &Document, options: &WriteOptions) -> String {
    encode::to_string(document, options)
}

pub fn to_writer<W: Write>(writer: W, document: &Document) -> Result<()> {
    to_writer_with_options(writer, document, &WriteOptions::default())
}

pub fn to_writer_with_options<W: Write>(
    writer: W,
    document: &Document,
    options: &WriteOptions,
) -> Result<()> {
    encode::to_writer(writer, document, options)
}

/// JSON view of a document. Blocks and parameters keep file order.
pub fn to_json(document: &Document) -> Result<serde_json::Value> {
    serde_json::to_value(document)
        .map_err(|err| Error::format(format!("failed to serialize document: {err}")))
}
