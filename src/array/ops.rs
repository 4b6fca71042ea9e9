use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};

use super::{Array, Storage};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
        }
    }
}

/// Right-hand side of an elementwise operation.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Scalar(f64),
    Array(ArrayViewD<'a, f64>),
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl<'a> From<ArrayViewD<'a, f64>> for Operand<'a> {
    fn from(view: ArrayViewD<'a, f64>) -> Self {
        Operand::Array(view)
    }
}

impl<'a> From<&'a ArrayD<f64>> for Operand<'a> {
    fn from(values: &'a ArrayD<f64>) -> Self {
        Operand::Array(values.view())
    }
}

impl Array {
    /// Apply `op` elementwise against the raw buffer and write the result
    /// back. Layered arrays apply it to each layer; an array operand whose
    /// leading axis matches the layer count is split per layer.
    pub fn apply_in_place<'a>(
        &mut self,
        op: BinaryOp,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<&mut Self> {
        let rhs = rhs.into();
        if let Storage::Layered(layers) = &mut self.storage {
            let nlay = layers.len();
            let ndim = self.shape.len();
            for (ix, layer) in layers.iter_mut().enumerate() {
                let operand = match &rhs {
                    Operand::Scalar(value) => Operand::Scalar(*value),
                    Operand::Array(view) if view.ndim() == ndim && view.shape()[0] == nlay => {
                        Operand::Array(view.index_axis(Axis(0), ix))
                    }
                    Operand::Array(view) => Operand::Array(view.view()),
                };
                layer.apply_in_place(op, operand)?;
            }
            return Ok(self);
        }

        let mut raw = self.raw();
        match rhs {
            Operand::Scalar(value) => raw.mapv_inplace(|lhs| op.apply(lhs, value)),
            Operand::Array(view) => {
                let rhs = view
                    .broadcast(IxDyn(&self.shape))
                    .ok_or_else(|| Error::shape_mismatch(&self.shape, view.shape()))?;
                Zip::from(&mut raw)
                    .and(&rhs)
                    .for_each(|lhs, &rhs| *lhs = op.apply(*lhs, rhs));
            }
        }
        self.store(raw)?;
        Ok(self)
    }

    pub fn add_in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<&mut Self> {
        self.apply_in_place(BinaryOp::Add, rhs)
    }

    pub fn sub_in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<&mut Self> {
        self.apply_in_place(BinaryOp::Sub, rhs)
    }

    pub fn mul_in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<&mut Self> {
        self.apply_in_place(BinaryOp::Mul, rhs)
    }

    pub fn div_in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<&mut Self> {
        self.apply_in_place(BinaryOp::Div, rhs)
    }

    pub fn pow_in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<&mut Self> {
        self.apply_in_place(BinaryOp::Pow, rhs)
    }

    pub fn apply<'a>(&self, op: BinaryOp, rhs: impl Into<Operand<'a>>) -> Result<Array> {
        let mut result = self.clone();
        result.apply_in_place(op, rhs)?;
        Ok(result)
    }

    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Array> {
        self.apply(BinaryOp::Add, rhs)
    }

    pub fn sub<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Array> {
        self.apply(BinaryOp::Sub, rhs)
    }

    pub fn mul<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Array> {
        self.apply(BinaryOp::Mul, rhs)
    }

    pub fn div<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Array> {
        self.apply(BinaryOp::Div, rhs)
    }

    pub fn pow<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Array> {
        self.apply(BinaryOp::Pow, rhs)
    }

    /// Apply an arbitrary elementwise function to the raw buffer.
    pub fn map_in_place<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: Fn(f64) -> f64,
    {
        self.update(|raw| raw.mapv_inplace(&f))?;
        Ok(self)
    }

    // Reductions run over the scaled value and skip NaN entries.

    fn finite_values(&self) -> Vec<f64> {
        self.value().iter().copied().filter(|v| !v.is_nan()).collect()
    }

    pub fn sum(&self) -> f64 {
        self.finite_values().iter().sum()
    }

    pub fn min(&self) -> f64 {
        self.finite_values()
            .into_iter()
            .reduce(f64::min)
            .unwrap_or(f64::NAN)
    }

    pub fn max(&self) -> f64 {
        self.finite_values()
            .into_iter()
            .reduce(f64::max)
            .unwrap_or(f64::NAN)
    }

    pub fn mean(&self) -> f64 {
        let values = self.finite_values();
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    pub fn median(&self) -> f64 {
        let mut values = self.finite_values();
        if values.is_empty() {
            return f64::NAN;
        }
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        }
    }

    /// Population standard deviation.
    pub fn std(&self) -> f64 {
        let values = self.finite_values();
        if values.is_empty() {
            return f64::NAN;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::array::{How, LayerValue};

    #[rstest::rstest]
    fn test_multiply_internal_in_place() {
        let mut a = Array::internal(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        a.mul_in_place(2.0).unwrap();
        assert_eq!(
            a.raw(),
            array![[2.0, 4.0, 6.0], [8.0, 10.0, 12.0]].into_dyn()
        );
    }

    #[rstest::rstest]
    fn test_constant_stays_constant_under_scalar_ops() {
        let mut a = Array::constant(&[3], 2.0);
        a.add_in_place(1.0).unwrap().pow_in_place(2.0).unwrap();
        assert_eq!(a.how(), LayerValue::Single(How::Constant));
        assert_eq!(a.get(&[0]), Some(9.0));
    }

    #[rstest::rstest]
    fn test_array_operand_demotes_constant() {
        let mut a = Array::constant(&[3], 1.0);
        let rhs = array![1.0, 2.0, 3.0].into_dyn();
        a.add_in_place(&rhs).unwrap();
        assert_eq!(a.how(), LayerValue::Single(How::Internal));
        assert_eq!(a.raw(), array![2.0, 3.0, 4.0].into_dyn());
    }

    #[rstest::rstest]
    fn test_broadcast_that_grows_shape_is_rejected() {
        let mut a = Array::constant(&[3], 1.0);
        let rhs = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].into_dyn();
        let err = a.add_in_place(&rhs).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::ShapeMismatch);
        assert_eq!(a.how(), LayerValue::Single(How::Constant));
    }

    #[rstest::rstest]
    fn test_layered_ops_apply_per_layer() {
        let layers = vec![
            Array::constant(&[2], 1.0),
            Array::internal(&[2], vec![2.0, 3.0]).unwrap(),
        ];
        let mut a = Array::layered(&[2, 2], layers).unwrap();
        a.sub_in_place(1.0).unwrap();
        assert_eq!(a.raw(), array![[0.0, 0.0], [1.0, 2.0]].into_dyn());

        let per_layer = array![[1.0, 1.0], [10.0, 10.0]].into_dyn();
        a.mul_in_place(&per_layer).unwrap();
        assert_eq!(a.raw(), array![[0.0, 0.0], [10.0, 20.0]].into_dyn());
    }

    #[rstest::rstest]
    fn test_non_in_place_leaves_original() {
        let a = Array::constant(&[2], 4.0);
        let b = a.div(2.0).unwrap();
        assert_eq!(a.get(&[0]), Some(4.0));
        assert_eq!(b.get(&[0]), Some(2.0));
    }

    #[rstest::rstest]
    fn test_map_in_place() {
        let mut a = Array::internal(&[2], vec![1.0, 4.0]).unwrap();
        a.map_in_place(f64::sqrt).unwrap();
        assert_eq!(a.raw(), array![1.0, 2.0].into_dyn());
    }

    #[rstest::rstest]
    fn test_reductions_skip_nan_and_use_factor() {
        let a = Array::internal(&[5], vec![1.0, f64::NAN, 3.0, 2.0, 4.0])
            .unwrap()
            .with_factor(2.0);
        assert_eq!(a.sum(), 20.0);
        assert_eq!(a.min(), 2.0);
        assert_eq!(a.max(), 8.0);
        assert_eq!(a.mean(), 5.0);
        assert_eq!(a.median(), 5.0);
        assert!((a.std() - 2.0 * 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[rstest::rstest]
    fn test_reductions_on_all_nan() {
        let a = Array::constant(&[2], f64::NAN);
        assert_eq!(a.sum(), 0.0);
        assert!(a.mean().is_nan());
        assert!(a.min().is_nan());
    }
}
