use std::io::{BufRead, Seek};
use std::path::PathBuf;

use serde::Serialize;

use super::{FileInout, ParamSpec};
use crate::decode::reader::LineReader;
use crate::decode::scan::scan_line;
use crate::decode::scanner::{expect_double, expect_integer};
use crate::num::number::{format_double, format_integer};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Keyword,
    Integer,
    Double,
    String,
    Filename,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Keyword => "keyword",
            ScalarKind::Integer => "integer",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
            ScalarKind::Filename => "filename",
        }
    }

    /// Number of tokens the scalar occupies on a line. Tagged scalars are
    /// preceded by their name; a keyword is only ever its name.
    pub fn width(self, tagged: bool) -> usize {
        let values = match self {
            ScalarKind::Keyword => return 1,
            ScalarKind::Integer | ScalarKind::Double | ScalarKind::String => 1,
            ScalarKind::Filename => 2,
        };
        if tagged {
            values + 1
        } else {
            values
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Integer | ScalarKind::Double)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Keyword(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Filename { inout: FileInout, path: PathBuf },
}

impl Scalar {
    /// Read one line and decode it as the scalar described by `spec`.
    pub fn load<R>(reader: &mut LineReader<R>, spec: &ParamSpec) -> Result<Scalar>
    where
        R: BufRead + Seek,
    {
        let kind = spec
            .kind
            .scalar_kind()
            .ok_or_else(|| Error::format(format!("`{}` is not a scalar", spec.name)))?;
        let raw = reader
            .read_content_line()?
            .ok_or_else(|| Error::unexpected_eof(&format!("scalar `{}`", spec.name)))?;
        let tokens = scan_line(&raw).tokens();
        Scalar::parse_tokens(&tokens, kind, &spec.name, spec.tagged)
            .map_err(|err| err.at_line(reader.line_number()))
    }

    /// Decode exactly `kind.width(tagged)` tokens.
    pub fn parse_tokens(
        tokens: &[&str],
        kind: ScalarKind,
        name: &str,
        tagged: bool,
    ) -> Result<Scalar> {
        let width = kind.width(tagged);
        if tokens.len() != width {
            return Err(Error::arity(
                width,
                &format!("{} `{}`", kind.as_str(), name.to_ascii_uppercase()),
                tokens.len(),
            ));
        }
        let values = if tagged || kind == ScalarKind::Keyword {
            if !tokens[0].eq_ignore_ascii_case(name) {
                return Err(Error::format(format!(
                    "expected `{}`, found `{}`",
                    name.to_ascii_uppercase(),
                    tokens[0]
                )));
            }
            &tokens[1..]
        } else {
            tokens
        };
        match kind {
            ScalarKind::Keyword => Ok(Scalar::Keyword(true)),
            ScalarKind::Integer => Ok(Scalar::Integer(expect_integer(values[0], name)?)),
            ScalarKind::Double => Ok(Scalar::Double(expect_double(values[0], name)?)),
            ScalarKind::String => Ok(Scalar::String(values[0].to_string())),
            ScalarKind::Filename => {
                let inout = FileInout::from_token(values[0]).ok_or_else(|| {
                    Error::format(format!(
                        "expected FILEIN or FILEOUT after `{}`, found `{}`",
                        name.to_ascii_uppercase(),
                        values[0]
                    ))
                })?;
                Ok(Scalar::Filename {
                    inout,
                    path: PathBuf::from(values[1]),
                })
            }
        }
    }

    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Keyword(_) => ScalarKind::Keyword,
            Scalar::Integer(_) => ScalarKind::Integer,
            Scalar::Double(_) => ScalarKind::Double,
            Scalar::String(_) => ScalarKind::String,
            Scalar::Filename { .. } => ScalarKind::Filename,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Keyword(present) => Some(*present),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric value; integers widen to `f64`.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Scalar::Integer(value) => Some(*value as f64),
            Scalar::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(value) => Some(value),
            _ => None,
        }
    }

    /// Text written after the name. Keywords have none.
    pub fn value_text(&self) -> Option<String> {
        match self {
            Scalar::Keyword(_) => None,
            Scalar::Integer(value) => Some(format_integer(*value)),
            Scalar::Double(value) => Some(format_double(*value)),
            Scalar::String(value) => Some(value.clone()),
            Scalar::Filename { inout, path } => {
                Some(format!("{} {}", inout.as_str(), path.display()))
            }
        }
    }
}
