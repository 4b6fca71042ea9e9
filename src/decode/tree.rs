//! Parse tree produced by the grammar and consumed by the transformer.

use std::path::PathBuf;

use smol_str::SmolStr;

use crate::array::How;
use crate::param::FileInout;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentNode {
    pub blocks: Vec<BlockNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub name: SmolStr,
    pub index: Option<usize>,
    pub line: usize,
    pub body: BodyNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyNode {
    Params(Vec<ParamNode>),
    List(Vec<RowNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamNode {
    pub key: SmolStr,
    pub value: Option<ValueNode>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Integer(i64),
    Double(f64),
    Words(Vec<String>),
    Path { inout: FileInout, path: PathBuf },
    Array(ArrayNode),
    Layered(Vec<ArrayNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowNode {
    pub fields: Vec<AtomNode>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtomNode {
    Integer(i64),
    Double(f64),
    Word(String),
}

/// One array literal: its control line plus any inline data.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    pub how: How,
    pub constant: Option<f64>,
    pub path: Option<PathBuf>,
    pub factor: Option<f64>,
    pub iprn: Option<i32>,
    pub binary: bool,
    pub values: Vec<f64>,
}

impl ArrayNode {
    fn new(how: How) -> Self {
        Self {
            how,
            constant: None,
            path: None,
            factor: None,
            iprn: None,
            binary: false,
            values: Vec::new(),
        }
    }

    pub fn constant(value: f64) -> Self {
        Self {
            constant: Some(value),
            ..Self::new(How::Constant)
        }
    }

    pub fn internal(values: Vec<f64>) -> Self {
        Self {
            values,
            ..Self::new(How::Internal)
        }
    }

    pub fn external(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            ..Self::new(How::External)
        }
    }
}
