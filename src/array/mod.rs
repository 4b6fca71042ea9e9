//! Numeric arrays with constant, internal, external and layered storage.
//!
//! An [`Array`] has a fixed logical shape and exactly one active encoding.
//! The *raw* value is the stored data broadcast to that shape; the scaled
//! *value* additionally multiplies by the array's factor. Edits always go
//! through the raw buffer and are written back with [`Array::update`],
//! which may move a constant array to internal storage (and back when the
//! edited buffer is uniform again).

mod load;
mod ops;

use std::path::{Path, PathBuf};

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::constants::{CONSTANT, INTERNAL, OPEN_CLOSE};
use crate::{Error, ErrorKind, Result};

pub use ops::{BinaryOp, Operand};

/// How an array is represented in an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum How {
    Constant,
    Internal,
    External,
}

impl How {
    pub fn as_str(self) -> &'static str {
        match self {
            How::Constant => CONSTANT,
            How::Internal => INTERNAL,
            How::External => OPEN_CLOSE,
        }
    }
}

/// A per-array property: a single value, or one value per layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LayerValue<T> {
    Single(T),
    Layered(Vec<T>),
}

impl<T: Copy> LayerValue<T> {
    pub fn single(&self) -> Option<T> {
        match self {
            LayerValue::Single(value) => Some(*value),
            LayerValue::Layered(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Data {
    Constant(f64),
    Internal(Vec<f64>),
    External {
        path: PathBuf,
        values: Vec<f64>,
        binary: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Encoded {
    pub(crate) data: Data,
    pub(crate) factor: Option<f64>,
    pub(crate) iprn: Option<i32>,
}

impl Encoded {
    fn new(data: Data) -> Self {
        Self {
            data,
            factor: None,
            iprn: None,
        }
    }

    fn how(&self) -> How {
        match self.data {
            Data::Constant(_) => How::Constant,
            Data::Internal(_) => How::Internal,
            Data::External { .. } => How::External,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Storage {
    Single(Encoded),
    Layered(Vec<Array>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    shape: Vec<usize>,
    storage: Storage,
}

fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

fn check_len(shape: &[usize], len: usize) -> Result<()> {
    let expected = element_count(shape);
    if expected != len {
        return Err(Error::cardinality(format!(
            "expected {expected} values for shape {shape:?}, found {len}"
        )));
    }
    Ok(())
}

/// Every element compares equal to the first. NaN never does.
pub(crate) fn is_uniform(values: &[f64]) -> bool {
    let Some(&first) = values.first() else {
        return false;
    };
    values.iter().all(|&value| value == first)
}

impl Array {
    pub fn constant(shape: &[usize], value: f64) -> Self {
        Self {
            shape: shape.to_vec(),
            storage: Storage::Single(Encoded::new(Data::Constant(value))),
        }
    }

    pub fn internal(shape: &[usize], values: Vec<f64>) -> Result<Self> {
        check_len(shape, values.len())?;
        Ok(Self {
            shape: shape.to_vec(),
            storage: Storage::Single(Encoded::new(Data::Internal(values))),
        })
    }

    pub fn external(shape: &[usize], path: impl Into<PathBuf>, values: Vec<f64>) -> Result<Self> {
        check_len(shape, values.len())?;
        Ok(Self {
            shape: shape.to_vec(),
            storage: Storage::Single(Encoded::new(Data::External {
                path: path.into(),
                values,
                binary: false,
            })),
        })
    }

    /// Stack one non-layered array per leading-axis slice of `shape`.
    pub fn layered(shape: &[usize], layers: Vec<Array>) -> Result<Self> {
        let (&nlay, layer_shape) = shape
            .split_first()
            .ok_or_else(|| Error::shape_mismatch(&[layers.len()], shape))?;
        if layers.len() != nlay {
            return Err(Error::cardinality(format!(
                "expected {nlay} layers, found {}",
                layers.len()
            )));
        }
        for layer in &layers {
            if layer.is_layered() {
                return Err(Error::format("layered arrays cannot be nested"));
            }
            if layer.shape != layer_shape {
                return Err(Error::shape_mismatch(layer_shape, &layer.shape));
            }
        }
        Ok(Self {
            shape: shape.to_vec(),
            storage: Storage::Layered(layers),
        })
    }

    pub fn from_ndarray(values: ArrayD<f64>) -> Self {
        let shape = values.shape().to_vec();
        Self {
            shape,
            storage: Storage::Single(Encoded::new(Data::Internal(values.iter().copied().collect()))),
        }
    }

    /// Set the scale factor; on a layered array every layer gets it.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.set_factor(Some(factor));
        self
    }

    pub fn set_factor(&mut self, factor: Option<f64>) {
        match &mut self.storage {
            Storage::Single(encoded) => encoded.factor = factor,
            Storage::Layered(layers) => {
                for layer in layers {
                    layer.set_factor(factor);
                }
            }
        }
    }

    pub fn with_iprn(mut self, iprn: i32) -> Self {
        match &mut self.storage {
            Storage::Single(encoded) => encoded.iprn = Some(iprn),
            Storage::Layered(layers) => {
                for layer in layers {
                    if let Storage::Single(encoded) = &mut layer.storage {
                        encoded.iprn = Some(iprn);
                    }
                }
            }
        }
        self
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        element_count(&self.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_layered(&self) -> bool {
        matches!(self.storage, Storage::Layered(_))
    }

    pub fn layers(&self) -> Option<&[Array]> {
        match &self.storage {
            Storage::Layered(layers) => Some(layers),
            Storage::Single(_) => None,
        }
    }

    pub fn layers_mut(&mut self) -> Option<&mut [Array]> {
        match &mut self.storage {
            Storage::Layered(layers) => Some(layers),
            Storage::Single(_) => None,
        }
    }

    pub(crate) fn encoded(&self) -> Option<&Encoded> {
        match &self.storage {
            Storage::Single(encoded) => Some(encoded),
            Storage::Layered(_) => None,
        }
    }

    pub fn how(&self) -> LayerValue<How> {
        match &self.storage {
            Storage::Single(encoded) => LayerValue::Single(encoded.how()),
            Storage::Layered(layers) => LayerValue::Layered(
                layers
                    .iter()
                    .filter_map(|layer| layer.encoded().map(Encoded::how))
                    .collect(),
            ),
        }
    }

    /// Scale factor, defaulting to `1.0`. Layered arrays report one factor
    /// per layer.
    pub fn factor(&self) -> LayerValue<f64> {
        match &self.storage {
            Storage::Single(encoded) => LayerValue::Single(encoded.factor.unwrap_or(1.0)),
            Storage::Layered(layers) => LayerValue::Layered(
                layers
                    .iter()
                    .filter_map(|layer| layer.encoded().map(|e| e.factor.unwrap_or(1.0)))
                    .collect(),
            ),
        }
    }

    pub fn iprn(&self) -> LayerValue<Option<i32>> {
        match &self.storage {
            Storage::Single(encoded) => LayerValue::Single(encoded.iprn),
            Storage::Layered(layers) => LayerValue::Layered(
                layers
                    .iter()
                    .filter_map(|layer| layer.encoded().map(|e| e.iprn))
                    .collect(),
            ),
        }
    }

    /// Path of an external array.
    pub fn path(&self) -> Option<&Path> {
        match self.encoded().map(|encoded| &encoded.data) {
            Some(Data::External { path, .. }) => Some(path),
            _ => None,
        }
    }

    /// Stored values broadcast to the array's shape, without the factor.
    pub fn raw(&self) -> ArrayD<f64> {
        match &self.storage {
            Storage::Single(encoded) => match &encoded.data {
                Data::Constant(value) => ArrayD::from_elem(IxDyn(&self.shape), *value),
                Data::Internal(values) | Data::External { values, .. } => {
                    ArrayD::from_shape_vec(IxDyn(&self.shape), values.clone())
                        .expect("buffer length matches array shape")
                }
            },
            Storage::Layered(layers) => {
                stack_layers(&self.shape, layers.iter().map(Array::raw).collect())
            }
        }
    }

    /// Raw values multiplied by the factor.
    pub fn value(&self) -> ArrayD<f64> {
        match &self.storage {
            Storage::Single(encoded) => {
                let factor = encoded.factor.unwrap_or(1.0);
                match &encoded.data {
                    Data::Constant(value) => {
                        ArrayD::from_elem(IxDyn(&self.shape), *value * factor)
                    }
                    _ => self.raw() * factor,
                }
            }
            Storage::Layered(layers) => {
                stack_layers(&self.shape, layers.iter().map(Array::value).collect())
            }
        }
    }

    /// Raw (unscaled) element at `index`.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.shape.len() {
            return None;
        }
        match &self.storage {
            Storage::Single(encoded) => {
                let offset = flat_offset(&self.shape, index)?;
                match &encoded.data {
                    Data::Constant(value) => Some(*value),
                    Data::Internal(values) | Data::External { values, .. } => {
                        values.get(offset).copied()
                    }
                }
            }
            Storage::Layered(layers) => {
                let (layer, rest) = index.split_first()?;
                layers.get(*layer)?.get(rest)
            }
        }
    }

    /// Edit the raw buffer and write it back.
    pub fn update<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut ArrayD<f64>),
    {
        let mut raw = self.raw();
        edit(&mut raw);
        self.store(raw)
    }

    pub fn set(&mut self, index: &[usize], value: f64) -> Result<()> {
        if index.len() != self.shape.len()
            || index.iter().zip(&self.shape).any(|(i, n)| i >= n)
        {
            return Err(Error::new(
                ErrorKind::ShapeMismatch,
                format!("index {index:?} out of bounds for shape {:?}", self.shape),
            ));
        }
        self.update(|raw| raw[IxDyn(index)] = value)
    }

    /// Replace every element, broadcasting `values` to the array's shape.
    pub fn assign(&mut self, values: ArrayViewD<'_, f64>) -> Result<()> {
        let broadcast = values
            .broadcast(IxDyn(&self.shape))
            .ok_or_else(|| Error::shape_mismatch(&self.shape, values.shape()))?;
        self.store(broadcast.to_owned())
    }

    pub fn fill(&mut self, value: f64) -> Result<()> {
        self.update(|raw| raw.fill(value))
    }

    /// Change the declared shape. Constants broadcast to any shape; stored
    /// buffers keep their element count.
    pub fn reshape(self, shape: &[usize]) -> Result<Self> {
        match self.storage {
            Storage::Single(encoded) => {
                if !matches!(encoded.data, Data::Constant(_))
                    && element_count(shape) != element_count(&self.shape)
                {
                    return Err(Error::shape_mismatch(shape, &self.shape));
                }
                Ok(Self {
                    shape: shape.to_vec(),
                    storage: Storage::Single(encoded),
                })
            }
            Storage::Layered(layers) => {
                let (&nlay, layer_shape) = shape
                    .split_first()
                    .ok_or_else(|| Error::shape_mismatch(shape, &self.shape))?;
                if nlay != layers.len() {
                    return Err(Error::shape_mismatch(shape, &self.shape));
                }
                let reshaped = layers
                    .into_iter()
                    .map(|layer| layer.reshape(layer_shape))
                    .collect::<Result<Vec<_>>>()?;
                Array::layered(shape, reshaped)
            }
        }
    }

    /// Write a full raw buffer back into storage. Layered arrays hand each
    /// leading-axis slice to the matching layer.
    fn store(&mut self, raw: ArrayD<f64>) -> Result<()> {
        if raw.shape() != self.shape.as_slice() {
            return Err(Error::shape_mismatch(&self.shape, raw.shape()));
        }
        match &mut self.storage {
            Storage::Layered(layers) => {
                for (ix, layer) in layers.iter_mut().enumerate() {
                    layer.assign(raw.index_axis(Axis(0), ix))?;
                }
                Ok(())
            }
            Storage::Single(encoded) => {
                let flat: Vec<f64> = raw.iter().copied().collect();
                match &mut encoded.data {
                    Data::External { values, .. } => *values = flat,
                    data => {
                        let was = match data {
                            Data::Constant(_) => How::Constant,
                            _ => How::Internal,
                        };
                        if is_uniform(&flat) {
                            if was == How::Internal {
                                debug!(shape = ?self.shape, "uniform buffer collapsed to constant");
                            }
                            *data = Data::Constant(flat[0]);
                        } else if flat.is_empty() {
                            *data = Data::Internal(flat);
                        } else {
                            if was == How::Constant {
                                debug!(shape = ?self.shape, "constant array demoted to internal");
                            }
                            *data = Data::Internal(flat);
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Rewrite an external array's file under `base_dir` from its cached
    /// values, one line per last-axis row.
    pub fn save_external(&self, base_dir: &Path) -> Result<()> {
        match &self.storage {
            Storage::Layered(layers) => {
                for layer in layers {
                    layer.save_external(base_dir)?;
                }
                Ok(())
            }
            Storage::Single(encoded) => {
                let Data::External { path, values, .. } = &encoded.data else {
                    return Ok(());
                };
                let row = self.shape.last().copied().filter(|n| *n > 0).unwrap_or(1);
                let mut text = String::new();
                for chunk in values.chunks(row) {
                    let line: Vec<String> = chunk
                        .iter()
                        .map(|value| crate::num::number::format_double(*value))
                        .collect();
                    text.push_str(&line.join(" "));
                    text.push('\n');
                }
                let target = base_dir.join(path);
                std::fs::write(&target, text).map_err(|err| {
                    Error::io(format!("failed to write {}: {err}", target.display()))
                })?;
                debug!(path = %target.display(), values = values.len(), "external array saved");
                Ok(())
            }
        }
    }
}

fn flat_offset(shape: &[usize], index: &[usize]) -> Option<usize> {
    let mut offset = 0;
    for (&i, &n) in index.iter().zip(shape) {
        if i >= n {
            return None;
        }
        offset = offset * n + i;
    }
    Some(offset)
}

fn stack_layers(shape: &[usize], layers: Vec<ArrayD<f64>>) -> ArrayD<f64> {
    if layers.is_empty() {
        return ArrayD::zeros(IxDyn(shape));
    }
    let views: Vec<ArrayViewD<'_, f64>> = layers.iter().map(|layer| layer.view()).collect();
    ndarray::stack(Axis(0), &views).expect("layer shapes agree")
}

impl Serialize for Array {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Array", 5)?;
        state.serialize_field("shape", &self.shape)?;
        state.serialize_field("how", &self.how())?;
        state.serialize_field("factor", &self.factor())?;
        state.serialize_field("path", &self.path())?;
        state.serialize_field("raw", &self.raw().iter().copied().collect::<Vec<f64>>())?;
        state.end()
    }
}
