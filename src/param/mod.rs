//! Typed parameter values and the codecs that read them from text.

pub mod keystring;
pub mod list;
pub mod record;
pub mod scalar;
pub mod spec;

use serde::Serialize;

use crate::array::Array;
use crate::constants::{FILEIN, FILEOUT};

pub use keystring::Keystring;
pub use list::{Column, List};
pub use record::{Field, Record};
pub use scalar::{Scalar, ScalarKind};
pub use spec::{Dim, ParamKind, ParamSpec, SpecTable};

/// Direction of a file reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileInout {
    FileIn,
    FileOut,
}

impl FileInout {
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case(FILEIN) {
            Some(FileInout::FileIn)
        } else if token.eq_ignore_ascii_case(FILEOUT) {
            Some(FileInout::FileOut)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileInout::FileIn => FILEIN,
            FileInout::FileOut => FILEOUT,
        }
    }
}

/// A parsed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    Record(Record),
    Keystring(Keystring),
    List(List),
    Array(Array),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_keystring(&self) -> Option<&Keystring> {
        match self {
            Value::Keystring(keystring) => Some(keystring),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.as_scalar().and_then(Scalar::as_integer)
    }

    pub fn as_double(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_double)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<Keystring> for Value {
    fn from(keystring: Keystring) -> Self {
        Value::Keystring(keystring)
    }
}

impl From<List> for Value {
    fn from(list: List) -> Self {
        Value::List(list)
    }
}
