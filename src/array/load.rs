use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use tracing::debug;

use super::{Array, Data, How, Storage};
use crate::decode::reader::LineReader;
use crate::decode::scan::{scan_line, LineKind};
use crate::decode::scanner::{scan_array_data, scan_control_line};
use crate::decode::tree::ArrayNode;
use crate::{Error, Result};

impl Array {
    /// Read an array from `reader`, starting at its control line.
    ///
    /// A layered array reads `shape[0]` consecutive control lines, each
    /// describing one layer of shape `shape[1..]`. `OPEN/CLOSE` paths are
    /// resolved against `base_dir` and read before this call returns.
    pub fn load<R>(
        reader: &mut LineReader<R>,
        base_dir: &Path,
        shape: &[usize],
        layered: bool,
    ) -> Result<Array>
    where
        R: BufRead + Seek,
    {
        if layered {
            let (&nlay, layer_shape) = shape
                .split_first()
                .ok_or_else(|| Error::shape_mismatch(&[1], shape))?;
            let mut layers = Vec::with_capacity(nlay);
            for _ in 0..nlay {
                layers.push(Array::load(reader, base_dir, layer_shape, false)?);
            }
            debug!(?shape, layers = nlay, "layered array loaded");
            return Array::layered(shape, layers);
        }

        loop {
            let Some(raw) = reader.read_line()? else {
                return Err(Error::unexpected_eof("array control line"));
            };
            let line = scan_line(&raw);
            if line.kind != LineKind::Content {
                continue;
            }
            let line_number = reader.line_number();
            let tokens = line.tokens();
            return Array::load_inline(&tokens, reader, base_dir, shape)
                .map_err(|err| err.at_line(line_number));
        }
    }

    /// Build an array from an already-split control line, reading any
    /// internal data lines that follow it.
    pub fn load_inline<R>(
        control: &[&str],
        reader: &mut LineReader<R>,
        base_dir: &Path,
        shape: &[usize],
    ) -> Result<Array>
    where
        R: BufRead + Seek,
    {
        let mut node = scan_control_line(control)?;
        if node.how == How::Internal {
            scan_array_data(reader, &mut node.values)?;
        }
        Array::from_node(node, base_dir, Some(shape))
    }

    /// Materialize a parsed array literal. Without a shape, buffers become
    /// one-dimensional and constants zero-dimensional.
    pub(crate) fn from_node(
        node: ArrayNode,
        base_dir: &Path,
        shape: Option<&[usize]>,
    ) -> Result<Array> {
        let mut array = match node.how {
            How::Constant => {
                let value = node
                    .constant
                    .ok_or_else(|| Error::format("CONSTANT requires a value"))?;
                Array::constant(shape.unwrap_or(&[]), value)
            }
            How::Internal => {
                let len = [node.values.len()];
                Array::internal(shape.unwrap_or(&len), node.values)?
            }
            How::External => {
                let path = node
                    .path
                    .ok_or_else(|| Error::format("OPEN/CLOSE requires a path"))?;
                if node.binary {
                    return Err(Error::format(format!(
                        "binary external array `{}` cannot be read as text",
                        path.display()
                    )));
                }
                let values = read_external(&base_dir.join(&path))?;
                let len = [values.len()];
                Array::external(shape.unwrap_or(&len), path, values)?
            }
        };
        if node.factor.is_some() {
            array.set_factor(node.factor);
        }
        if let Some(iprn) = node.iprn {
            array = array.with_iprn(iprn);
        }
        debug!(how = node.how.as_str(), shape = ?array.shape(), "array loaded");
        Ok(array)
    }

    /// Mark an external array as binary. Binary data is never decoded; the
    /// flag is kept so the control line writes back unchanged.
    pub fn with_binary(mut self, binary: bool) -> Self {
        if let Storage::Single(encoded) = &mut self.storage {
            if let Data::External { binary: flag, .. } = &mut encoded.data {
                *flag = binary;
            }
        }
        self
    }

    pub fn is_binary(&self) -> bool {
        matches!(
            self.encoded().map(|encoded| &encoded.data),
            Some(Data::External { binary: true, .. })
        )
    }
}

/// Read a sibling data file written in internal-array grammar.
fn read_external(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path)
        .map_err(|err| Error::io(format!("failed to open {}: {err}", path.display())))?;
    let mut reader = LineReader::new(BufReader::new(file))?;
    let mut values = Vec::new();
    scan_array_data(&mut reader, &mut values)?;
    while let Some(raw) = reader.read_line()? {
        if scan_line(&raw).is_content() {
            return Err(Error::format(format!(
                "unexpected content in external array file {}",
                path.display()
            ))
            .at_line(reader.line_number()));
        }
    }
    debug!(path = %path.display(), values = values.len(), "external array read");
    Ok(values)
}
