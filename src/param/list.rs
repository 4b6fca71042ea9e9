use std::io::{BufRead, Seek};

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use smol_str::SmolStr;
use tracing::debug;

use super::{ParamKind, ParamSpec, Scalar, ScalarKind};
use crate::array::Array;
use crate::constants::is_block_end;
use crate::decode::reader::LineReader;
use crate::decode::scan::{scan_line, LineKind};
use crate::{Error, Result};

/// Largest integer magnitude an `f64` buffer holds exactly.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

fn exact_in_f64(scalar: &Scalar) -> bool {
    match scalar {
        Scalar::Integer(value) => value.unsigned_abs() <= MAX_EXACT_INTEGER,
        _ => true,
    }
}

/// One column of a list. Numeric columns are one-dimensional arrays so
/// they can be sliced and combined like any other array. Integer columns
/// holding a value beyond 2^53 in magnitude stay as scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric { kind: ScalarKind, values: Array },
    Scalars(Vec<Scalar>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric { values, .. } => values.len(),
            Column::Scalars(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry at `row` as a scalar of the column's kind.
    pub fn get(&self, row: usize) -> Option<Scalar> {
        match self {
            Column::Numeric { kind, values } => {
                let value = values.get(&[row])?;
                Some(match kind {
                    ScalarKind::Integer => Scalar::Integer(value as i64),
                    _ => Scalar::Double(value),
                })
            }
            Column::Scalars(values) => values.get(row).cloned(),
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Column::Numeric { values, .. } => Some(values),
            Column::Scalars(_) => None,
        }
    }

    /// Build a column from one scalar per row. All-numeric columns become
    /// arrays; an integer column stays integer only if every row is.
    pub fn from_scalars(values: Vec<Scalar>) -> Result<Column> {
        if values.is_empty()
            || !values
                .iter()
                .all(|v| v.kind().is_numeric() && exact_in_f64(v))
        {
            return Ok(Column::Scalars(values));
        }
        let kind = if values.iter().all(|v| v.kind() == ScalarKind::Integer) {
            ScalarKind::Integer
        } else {
            ScalarKind::Double
        };
        let buffer: Vec<f64> = values.iter().filter_map(Scalar::as_double).collect();
        Ok(Column::Numeric {
            kind,
            values: Array::internal(&[buffer.len()], buffer)?,
        })
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Column::Numeric { kind: ScalarKind::Integer, values } => {
                let ints: Vec<i64> = values.raw().iter().map(|v| *v as i64).collect();
                ints.serialize(serializer)
            }
            Column::Numeric { values, .. } => {
                let raw: Vec<f64> = values.raw().iter().copied().collect();
                raw.serialize(serializer)
            }
            Column::Scalars(values) => values.serialize(serializer),
        }
    }
}

/// A table stored column by column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct List {
    pub columns: IndexMap<SmolStr, Column>,
}

impl List {
    /// Read rows until the block's `END` line, which is left unconsumed.
    /// `max_rows` bounds the row count when it is already known.
    pub fn load<R>(
        reader: &mut LineReader<R>,
        spec: &ParamSpec,
        max_rows: Option<usize>,
    ) -> Result<List>
    where
        R: BufRead + Seek,
    {
        let ParamKind::List(columns) = &spec.kind else {
            return Err(Error::format(format!("`{}` is not a list", spec.name)));
        };
        let kinds = columns
            .iter()
            .map(|column| {
                column.kind.scalar_kind().ok_or_else(|| {
                    Error::format(format!("list column `{}` is not a scalar", column.name))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let widths: Vec<usize> = kinds.iter().map(|kind| kind.width(false)).collect();
        let expected: usize = widths.iter().sum();

        let mut cells: Vec<Vec<Scalar>> = vec![Vec::new(); columns.len()];
        let mut rows = 0;
        loop {
            let mark = reader.tell();
            let Some(raw) = reader.read_line()? else {
                return Err(Error::unexpected_eof(&format!("list `{}`", spec.name)));
            };
            let line = scan_line(&raw);
            if line.kind != LineKind::Content {
                continue;
            }
            let tokens = line.tokens();
            if is_block_end(tokens[0]) {
                reader.seek(mark)?;
                break;
            }
            let line_number = reader.line_number();
            if tokens.len() != expected {
                return Err(Error::format(format!(
                    "expected {expected} field(s) per row of `{}`, found {}",
                    spec.name,
                    tokens.len()
                ))
                .at_line(line_number));
            }
            rows += 1;
            if let Some(bound) = max_rows {
                if rows > bound {
                    return Err(Error::cardinality(format!(
                        "list `{}` has more than {bound} row(s)",
                        spec.name
                    ))
                    .at_line(line_number));
                }
            }
            let mut offset = 0;
            for (ix, column) in columns.iter().enumerate() {
                let own = &tokens[offset..offset + widths[ix]];
                let value = Scalar::parse_tokens(own, kinds[ix], &column.name, false)
                    .map_err(|err| err.at_line(line_number))?;
                offset += widths[ix];
                cells[ix].push(value);
            }
        }

        let mut list = List::default();
        for (column, (kind, values)) in columns.iter().zip(kinds.into_iter().zip(cells)) {
            let column_value = if kind.is_numeric() && values.iter().all(exact_in_f64) {
                let buffer: Vec<f64> = values.iter().filter_map(Scalar::as_double).collect();
                Column::Numeric {
                    kind,
                    values: Array::internal(&[buffer.len()], buffer)?,
                }
            } else {
                Column::Scalars(values)
            };
            list.columns.insert(column.name.clone(), column_value);
        }
        debug!(list = %spec.name, rows, columns = list.columns.len(), "list loaded");
        Ok(list)
    }

    pub fn rows(&self) -> usize {
        self.columns.values().next().map_or(0, Column::len)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name.to_ascii_lowercase().as_str())
    }

    /// Every column's entry at `index`.
    pub fn row(&self, index: usize) -> Option<Vec<Scalar>> {
        self.columns.values().map(|column| column.get(index)).collect()
    }
}

impl Serialize for List {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, column) in &self.columns {
            map.serialize_entry(name.as_str(), column)?;
        }
        map.end()
    }
}
