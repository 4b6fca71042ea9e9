//! Parameter specification table consulted by the block loader.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::{ScalarKind, Value};
use crate::{Error, Result};

/// One dimension of a declared array shape or list row bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dim {
    Fixed(usize),
    /// Resolved from an integer parameter parsed earlier.
    Named(SmolStr),
}

impl Dim {
    pub fn named(name: &str) -> Self {
        Dim::Named(SmolStr::new(name.to_ascii_lowercase()))
    }

    pub fn resolve(&self, dims: &IndexMap<SmolStr, i64>) -> Result<usize> {
        match self {
            Dim::Fixed(n) => Ok(*n),
            Dim::Named(name) => {
                let value = dims.get(name).copied().ok_or_else(|| {
                    Error::missing_parameter(format!("dimension `{name}` has not been defined"))
                })?;
                usize::try_from(value).map_err(|_| {
                    Error::format(format!("dimension `{name}` must be non-negative, got {value}"))
                })
            }
        }
    }
}

impl From<usize> for Dim {
    fn from(n: usize) -> Self {
        Dim::Fixed(n)
    }
}

impl From<&str> for Dim {
    fn from(name: &str) -> Self {
        Dim::named(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Keyword,
    Integer,
    Double,
    String,
    Filename,
    Record(Vec<ParamSpec>),
    /// Alternatives, each a scalar or a record.
    Keystring(Vec<ParamSpec>),
    /// Columns, each a scalar.
    List(Vec<ParamSpec>),
    Array,
}

impl ParamKind {
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            ParamKind::Keyword => Some(ScalarKind::Keyword),
            ParamKind::Integer => Some(ScalarKind::Integer),
            ParamKind::Double => Some(ScalarKind::Double),
            ParamKind::String => Some(ScalarKind::String),
            ParamKind::Filename => Some(ScalarKind::Filename),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: SmolStr,
    pub block: SmolStr,
    pub kind: ParamKind,
    pub shape: Vec<Dim>,
    /// The array may be given one control line per layer.
    pub layered: bool,
    pub optional: bool,
    /// Record members: whether the member's name precedes its value.
    pub tagged: bool,
    pub default: Option<Value>,
    pub description: String,
    /// Upper bound on list rows.
    pub rows: Option<Dim>,
}

impl ParamSpec {
    pub fn new(name: &str, kind: ParamKind) -> Self {
        Self {
            name: SmolStr::new(name.to_ascii_lowercase()),
            block: SmolStr::default(),
            kind,
            shape: Vec::new(),
            layered: false,
            optional: false,
            tagged: true,
            default: None,
            description: String::new(),
            rows: None,
        }
    }

    pub fn keyword(name: &str) -> Self {
        Self::new(name, ParamKind::Keyword).with_optional(true)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, ParamKind::Integer)
    }

    pub fn double(name: &str) -> Self {
        Self::new(name, ParamKind::Double)
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, ParamKind::String)
    }

    pub fn filename(name: &str) -> Self {
        Self::new(name, ParamKind::Filename)
    }

    pub fn record(name: &str, members: Vec<ParamSpec>) -> Self {
        Self::new(name, ParamKind::Record(members))
    }

    pub fn keystring(name: &str, members: Vec<ParamSpec>) -> Self {
        Self::new(name, ParamKind::Keystring(members))
    }

    pub fn list(name: &str, columns: Vec<ParamSpec>) -> Self {
        Self::new(name, ParamKind::List(columns))
    }

    pub fn array<I, D>(name: &str, shape: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Dim>,
    {
        Self::new(name, ParamKind::Array).with_shape(shape)
    }

    pub fn with_block(mut self, block: &str) -> Self {
        self.block = SmolStr::new(block.to_ascii_lowercase());
        self
    }

    pub fn with_shape<I, D>(mut self, shape: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Dim>,
    {
        self.shape = shape.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_layered(mut self, layered: bool) -> Self {
        self.layered = layered;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_tagged(mut self, tagged: bool) -> Self {
        self.tagged = tagged;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rows(mut self, rows: impl Into<Dim>) -> Self {
        self.rows = Some(rows.into());
        self
    }

    pub fn is_named(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key)
    }

    /// Resolve the declared shape against known dimensions.
    pub fn resolve_shape(&self, dims: &IndexMap<SmolStr, i64>) -> Result<Vec<usize>> {
        self.shape.iter().map(|dim| dim.resolve(dims)).collect()
    }

    /// Member of a record or keystring by name.
    pub fn member(&self, key: &str) -> Option<&ParamSpec> {
        match &self.kind {
            ParamKind::Record(members) | ParamKind::Keystring(members) => {
                members.iter().find(|member| member.is_named(key))
            }
            _ => None,
        }
    }
}

/// Parameter specifications grouped by block, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SpecTable {
    blocks: IndexMap<SmolStr, IndexMap<SmolStr, ParamSpec>>,
}

impl SpecTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `spec` to `block`, replacing any earlier spec of the same name.
    pub fn insert(&mut self, block: &str, spec: ParamSpec) {
        let spec = spec.with_block(block);
        self.blocks
            .entry(spec.block.clone())
            .or_default()
            .insert(spec.name.clone(), spec);
    }

    pub fn with(mut self, block: &str, spec: ParamSpec) -> Self {
        self.insert(block, spec);
        self
    }

    pub fn has_block(&self, block: &str) -> bool {
        self.blocks.contains_key(block.to_ascii_lowercase().as_str())
    }

    pub fn block_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.blocks.keys()
    }

    pub fn params(&self, block: &str) -> impl Iterator<Item = &ParamSpec> {
        self.blocks
            .get(block.to_ascii_lowercase().as_str())
            .into_iter()
            .flat_map(|params| params.values())
    }

    /// The list parameter that owns `block`'s body, if any.
    pub fn list_param(&self, block: &str) -> Option<&ParamSpec> {
        self.params(block)
            .find(|spec| matches!(spec.kind, ParamKind::List(_)))
    }

    /// Names of blocks whose body is a list.
    pub fn list_blocks(&self) -> Vec<SmolStr> {
        self.blocks
            .keys()
            .filter(|block| self.list_param(block).is_some())
            .cloned()
            .collect()
    }

    /// Spec for `key` in `block`. Keystring alternatives resolve to their
    /// enclosing keystring.
    pub fn lookup(&self, block: &str, key: &str) -> Option<&ParamSpec> {
        let params = self.blocks.get(block.to_ascii_lowercase().as_str())?;
        let key = key.to_ascii_lowercase();
        if let Some(spec) = params.get(key.as_str()) {
            return Some(spec);
        }
        params.values().find(|spec| {
            matches!(&spec.kind, ParamKind::Keystring(members) if members.iter().any(|m| m.is_named(&key)))
        })
    }
}
