use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;

use crate::param::Value;

/// A parsed input file: its blocks in file order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Lower-cased block name.
    pub name: SmolStr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Parameters keyed by lower-cased name, in file order.
    pub params: IndexMap<SmolStr, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// First block called `name`.
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|block| block.name.eq_ignore_ascii_case(name))
    }

    pub fn block_mut(&mut self, name: &str) -> Option<&mut Block> {
        self.blocks
            .iter_mut()
            .find(|block| block.name.eq_ignore_ascii_case(name))
    }

    /// Every block called `name`, e.g. all `PERIOD` blocks.
    pub fn blocks_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks
            .iter()
            .filter(move |block| block.name.eq_ignore_ascii_case(name))
    }

    /// Parameter `key` of the first block called `block`.
    pub fn get(&self, block: &str, key: &str) -> Option<&Value> {
        self.block(block)?.get(key)
    }

    pub fn get_mut(&mut self, block: &str, key: &str) -> Option<&mut Value> {
        self.block_mut(block)?.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Block {
    pub fn new(name: &str, index: Option<usize>) -> Self {
        Self {
            name: SmolStr::new(name.to_ascii_lowercase()),
            index,
            params: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key.to_ascii_lowercase().as_str())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.params.get_mut(key.to_ascii_lowercase().as_str())
    }

    /// Insert or replace `key`, returning the previous value.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.params
            .insert(SmolStr::new(key.to_ascii_lowercase()), value.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key.to_ascii_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
