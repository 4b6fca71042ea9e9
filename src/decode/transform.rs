//! Reduce a parse tree to a [`Document`] without consulting any parameter
//! specification.

use std::path::Path;

use smol_str::SmolStr;
use tracing::trace;

use crate::array::{Array, How};
use crate::decode::tree::{
    ArrayNode, AtomNode, BlockNode, BodyNode, ComponentNode, ParamNode, RowNode, ValueNode,
};
use crate::document::{Block, Document};
use crate::param::{Column, List, Scalar, Value};
use crate::{Error, Result};

pub fn transform(component: ComponentNode, base_dir: &Path) -> Result<Document> {
    let mut document = Document::new();
    for block in component.blocks {
        document.push(transform_block(block, base_dir)?);
    }
    Ok(document)
}

fn transform_block(node: BlockNode, base_dir: &Path) -> Result<Block> {
    let mut block = Block::new(&node.name, node.index);
    match node.body {
        BodyNode::Params(params) => {
            for param in params {
                let line = param.line;
                let (key, value) = transform_param(param, base_dir).map_err(|e| e.at_line(line))?;
                if block.contains(&key) {
                    return Err(Error::cardinality(format!(
                        "`{}` given more than once in block `{}`",
                        key.to_ascii_uppercase(),
                        block.name
                    ))
                    .at_line(line));
                }
                block.insert(&key, value);
            }
        }
        BodyNode::List(rows) => {
            let list = transform_rows(rows)?;
            let name = block.name.clone();
            block.insert(&name, list);
        }
    }
    trace!(block = %block.name, params = block.len(), "block transformed");
    Ok(block)
}

fn transform_param(param: ParamNode, base_dir: &Path) -> Result<(SmolStr, Value)> {
    let key = SmolStr::new(param.key.to_ascii_lowercase());
    let value = match param.value {
        None => Value::Scalar(Scalar::Keyword(true)),
        Some(ValueNode::Integer(value)) => Value::Scalar(Scalar::Integer(value)),
        Some(ValueNode::Double(value)) => Value::Scalar(Scalar::Double(value)),
        Some(ValueNode::Words(words)) => Value::Scalar(Scalar::String(words.join(" "))),
        Some(ValueNode::Path { inout, path }) => Value::Scalar(Scalar::Filename { inout, path }),
        Some(ValueNode::Array(node)) => Value::Array(Array::from_node(node, base_dir, None)?),
        Some(ValueNode::Layered(layers)) => Value::Array(transform_layers(layers, base_dir)?),
    };
    Ok((key, value))
}

/// Layers share one shape: the common buffer length, or zero-dimensional
/// when every layer is a constant.
fn transform_layers(nodes: Vec<ArrayNode>, base_dir: &Path) -> Result<Array> {
    let nlay = nodes.len();
    let layers = nodes
        .into_iter()
        .map(|node| Array::from_node(node, base_dir, None))
        .collect::<Result<Vec<_>>>()?;

    let mut layer_shape: Option<Vec<usize>> = None;
    for layer in &layers {
        if layer.how().single() == Some(How::Constant) {
            continue;
        }
        match &layer_shape {
            Some(shape) if shape.as_slice() != layer.shape() => {
                return Err(Error::shape_mismatch(shape, layer.shape()));
            }
            Some(_) => {}
            None => layer_shape = Some(layer.shape().to_vec()),
        }
    }
    let layer_shape = layer_shape.unwrap_or_default();
    let layers = layers
        .into_iter()
        .map(|layer| layer.reshape(&layer_shape))
        .collect::<Result<Vec<_>>>()?;

    let mut shape = Vec::with_capacity(layer_shape.len() + 1);
    shape.push(nlay);
    shape.extend_from_slice(&layer_shape);
    Array::layered(&shape, layers)
}

/// Rows become columns named by position.
fn transform_rows(rows: Vec<RowNode>) -> Result<List> {
    let mut list = List::default();
    let Some(width) = rows.first().map(|row| row.fields.len()) else {
        return Ok(list);
    };
    let mut cells: Vec<Vec<Scalar>> = vec![Vec::with_capacity(rows.len()); width];
    for row in rows {
        if row.fields.len() != width {
            return Err(Error::cardinality(format!(
                "expected {width} field(s) per row, found {}",
                row.fields.len()
            ))
            .at_line(row.line));
        }
        for (cell, atom) in cells.iter_mut().zip(row.fields) {
            cell.push(match atom {
                AtomNode::Integer(value) => Scalar::Integer(value),
                AtomNode::Double(value) => Scalar::Double(value),
                AtomNode::Word(word) => Scalar::String(word),
            });
        }
    }
    for (ix, values) in cells.into_iter().enumerate() {
        let name = SmolStr::new(crate::num::number::format_integer(ix as i64));
        list.columns.insert(name, Column::from_scalars(values)?);
    }
    Ok(list)
}
