pub mod parser;
pub mod reader;
pub mod scan;
pub mod scanner;
pub mod transform;
pub mod tree;

use std::io::{BufRead, Cursor, Read, Seek};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::document::Document;
use crate::options::ParseOptions;
use crate::Result;

use self::reader::LineReader;

/// Parse a seekable stream positioned at the start of a document.
pub fn parse_document<R: BufRead + Seek>(input: R, options: &ParseOptions) -> Result<Document> {
    let mut reader = LineReader::new(input)?;
    parse_lines(&mut reader, options)
}

pub fn from_str(input: &str, options: &ParseOptions) -> Result<Document> {
    let mut reader = LineReader::from_text(input);
    parse_lines(&mut reader, options)
}

/// Parse a non-seekable stream by buffering it in memory first.
pub fn from_reader<R: Read>(mut input: R, options: &ParseOptions) -> Result<Document> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    parse_document(Cursor::new(buf), options)
}

fn parse_lines<R: BufRead + Seek>(
    reader: &mut LineReader<R>,
    options: &ParseOptions,
) -> Result<Document> {
    let component = parser::parse_component(reader, options)?;
    let document = transform::transform(component, &options.base_dir)?;
    debug!(blocks = document.len(), "document parsed");
    Ok(document)
}

/// Parse independent documents. With the `parallel` feature each input is
/// parsed on the rayon pool.
pub fn parse_documents<S>(inputs: &[S], options: &ParseOptions) -> Vec<Result<Document>>
where
    S: AsRef<str> + Sync,
{
    #[cfg(feature = "parallel")]
    {
        inputs
            .par_iter()
            .map(|input| from_str(input.as_ref(), options))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        inputs
            .iter()
            .map(|input| from_str(input.as_ref(), options))
            .collect()
    }
}
