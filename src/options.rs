use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use crate::constants::DEFAULT_INDENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
}

impl Indent {
    pub fn spaces(count: usize) -> Self {
        Indent::Spaces(count)
    }

    pub fn get_spaces(self) -> usize {
        let Indent::Spaces(count) = self;
        count
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(DEFAULT_INDENT)
    }
}

/// How the body of a block is recognized by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `key [value]` lines.
    Params,
    /// Homogeneous rows of scalars.
    List,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Blocks whose body is a list of rows. Matched case-insensitively.
    pub list_blocks: Vec<SmolStr>,
    /// Blocks allowed to carry a parameter body. Empty accepts any name.
    pub param_blocks: Vec<SmolStr>,
    /// Directory that `OPEN/CLOSE` paths are resolved against.
    pub base_dir: PathBuf,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_blocks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.list_blocks = names
            .into_iter()
            .map(|name| SmolStr::new(name.as_ref().to_ascii_lowercase()))
            .collect();
        self
    }

    pub fn with_param_blocks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.param_blocks = names
            .into_iter()
            .map(|name| SmolStr::new(name.as_ref().to_ascii_lowercase()))
            .collect();
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.base_dir = base_dir.as_ref().to_path_buf();
        self
    }

    /// Body kind for `name`, or `None` when the block is not accepted.
    pub fn body_kind(&self, name: &str) -> Option<BodyKind> {
        if self
            .list_blocks
            .iter()
            .any(|block| block.eq_ignore_ascii_case(name))
        {
            return Some(BodyKind::List);
        }
        if self.param_blocks.is_empty()
            || self
                .param_blocks
                .iter()
                .any(|block| block.eq_ignore_ascii_case(name))
        {
            return Some(BodyKind::Params);
        }
        None
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            list_blocks: Vec::new(),
            param_blocks: Vec::new(),
            base_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub indent: Indent,
    /// Values per line of internal array data. `None` writes one line per
    /// row of the last axis.
    pub values_per_line: Option<usize>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_values_per_line(mut self, values_per_line: Option<usize>) -> Self {
        self.values_per_line = values_per_line.filter(|count| *count > 0);
        self
    }
}
