//! Spec-driven block loading: each key found in a block is looked up in a
//! [`SpecTable`] and decoded by the matching codec.

use std::io::{BufRead, Seek};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::array::Array;
use crate::constants::{is_block_begin, is_block_end, LAYERED};
use crate::decode::reader::LineReader;
use crate::decode::scan::scan_line;
use crate::decode::scanner::{check_block_end, scan_block_header};
use crate::document::{Block, Document};
use crate::param::{Keystring, List, ParamKind, ParamSpec, Record, Scalar, SpecTable, Value};
use crate::{Error, Result};

pub struct Loader<'t> {
    table: &'t SpecTable,
    base_dir: PathBuf,
    dims: IndexMap<SmolStr, i64>,
}

impl<'t> Loader<'t> {
    pub fn new(table: &'t SpecTable) -> Self {
        Self {
            table,
            base_dir: PathBuf::from("."),
            dims: IndexMap::new(),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.base_dir = base_dir.as_ref().to_path_buf();
        self
    }

    /// Predefine a dimension, e.g. one read from another file.
    pub fn with_dimension(mut self, name: &str, value: i64) -> Self {
        self.dims
            .insert(SmolStr::new(name.to_ascii_lowercase()), value);
        self
    }

    /// Integer parameters seen so far, usable as named dimensions.
    pub fn dimensions(&self) -> &IndexMap<SmolStr, i64> {
        &self.dims
    }

    pub fn load_document<R>(&mut self, reader: &mut LineReader<R>) -> Result<Document>
    where
        R: BufRead + Seek,
    {
        let mut document = Document::new();
        while let Some(block) = self.load_block(reader)? {
            document.push(block);
        }
        debug!(blocks = document.len(), "document loaded");
        Ok(document)
    }

    /// Load the next block, or `None` at end of input.
    pub fn load_block<R>(&mut self, reader: &mut LineReader<R>) -> Result<Option<Block>>
    where
        R: BufRead + Seek,
    {
        let Some(raw) = reader.read_content_line()? else {
            return Ok(None);
        };
        let line = reader.line_number();
        let tokens = scan_line(&raw).tokens();
        if !is_block_begin(tokens[0]) {
            return Err(Error::format(format!("expected BEGIN, found `{}`", tokens[0])).at_line(line));
        }
        let (name, index) = scan_block_header(&tokens).map_err(|err| err.at_line(line))?;
        if !self.table.has_block(&name) {
            return Err(Error::unknown_block(&name).at_line(line));
        }
        trace!(block = %name, ?index, "loading block");

        let mut block = Block::new(&name, index);
        let table = self.table;
        if let Some(spec) = table.list_param(&name) {
            let rows = spec.rows.as_ref().map(|dim| dim.resolve(&self.dims)).transpose()?;
            let list = List::load(reader, spec, rows)?;
            block.insert(&spec.name, list);
            let raw = reader
                .read_content_line()?
                .ok_or_else(|| Error::unexpected_eof(&format!("block `{name}`")))?;
            check_block_end(&scan_line(&raw).tokens(), &name, index)
                .map_err(|err| err.at_line(reader.line_number()))?;
        } else {
            self.load_params(reader, &mut block, index)?;
        }
        self.apply_defaults(&mut block)?;
        debug!(block = %block.name, params = block.len(), "block loaded");
        Ok(Some(block))
    }

    fn load_params<R>(
        &mut self,
        reader: &mut LineReader<R>,
        block: &mut Block,
        index: Option<usize>,
    ) -> Result<()>
    where
        R: BufRead + Seek,
    {
        let table = self.table;
        let name = block.name.clone();
        loop {
            let (mark, raw) = loop {
                let mark = reader.tell();
                let raw = reader
                    .read_line()?
                    .ok_or_else(|| Error::unexpected_eof(&format!("block `{name}`")))?;
                if scan_line(&raw).is_content() {
                    break (mark, raw);
                }
            };
            let line = reader.line_number();
            let tokens = scan_line(&raw).tokens();
            if is_block_end(tokens[0]) {
                return check_block_end(&tokens, &name, index).map_err(|err| err.at_line(line));
            }
            let spec = table
                .lookup(&name, tokens[0])
                .ok_or_else(|| Error::unrecognized_parameter(&name, tokens[0]).at_line(line))?;
            if block.contains(&spec.name) {
                return Err(Error::cardinality(format!(
                    "`{}` given more than once in block `{name}`",
                    spec.name.to_ascii_uppercase()
                ))
                .at_line(line));
            }
            trace!(block = %name, param = %spec.name, "dispatch");

            let value = match &spec.kind {
                ParamKind::Keystring(_) => {
                    reader.seek(mark)?;
                    Value::Keystring(Keystring::load(reader, spec)?)
                }
                ParamKind::Record(_) => Value::Record(
                    Record::parse_tokens(&tokens, spec).map_err(|err| err.at_line(line))?,
                ),
                ParamKind::Array => Value::Array(
                    self.load_array(reader, spec, &tokens)
                        .map_err(|err| err.at_line(line))?,
                ),
                ParamKind::List(_) => {
                    return Err(Error::format(format!(
                        "list `{}` must own its block",
                        spec.name
                    ))
                    .at_line(line));
                }
                kind => {
                    let scalar_kind = kind.scalar_kind().ok_or_else(|| {
                        Error::format(format!("`{}` has no scalar kind", spec.name))
                    })?;
                    let scalar = Scalar::parse_tokens(&tokens, scalar_kind, &spec.name, true)
                        .map_err(|err| err.at_line(line))?;
                    if let Scalar::Integer(value) = scalar {
                        self.dims.insert(spec.name.clone(), value);
                    }
                    Value::Scalar(scalar)
                }
            };
            block.insert(&spec.name, value);
        }
    }

    fn load_array<R>(
        &self,
        reader: &mut LineReader<R>,
        spec: &ParamSpec,
        tokens: &[&str],
    ) -> Result<Array>
    where
        R: BufRead + Seek,
    {
        let shape = spec.resolve_shape(&self.dims)?;
        match tokens.get(1) {
            None => Array::load(reader, &self.base_dir, &shape, false),
            Some(token) if token.eq_ignore_ascii_case(LAYERED) => {
                if !spec.layered {
                    return Err(Error::format(format!(
                        "`{}` cannot be given by layer",
                        spec.name.to_ascii_uppercase()
                    )));
                }
                if tokens.len() > 2 {
                    return Err(Error::arity(2, "layered array header", tokens.len()));
                }
                Array::load(reader, &self.base_dir, &shape, true)
            }
            Some(_) => Array::load_inline(&tokens[1..], reader, &self.base_dir, &shape),
        }
    }

    fn apply_defaults(&self, block: &mut Block) -> Result<()> {
        let name = block.name.clone();
        for spec in self.table.params(&name) {
            if block.contains(&spec.name) {
                continue;
            }
            match &spec.default {
                Some(default) => {
                    block.insert(&spec.name, default.clone());
                }
                None if spec.optional => {}
                None => {
                    return Err(Error::missing_parameter(format!(
                        "block `{}` requires `{}`",
                        block.name,
                        spec.name.to_ascii_uppercase()
                    )));
                }
            }
        }
        Ok(())
    }
}
