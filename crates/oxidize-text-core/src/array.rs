use crate::dtype::Element;
use crate::error::{DataError, DataResult};
use crate::shape::Shape;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Dense rectangular array.
///
/// Stores data in a flat contiguous `Vec<T>` with row-major (C-order) layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Element")]
pub struct NdArray<T: Element> {
    data: Vec<T>,
    shape: Shape,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Element> NdArray<T> {
    /// Create an array from raw data and shape.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> DataResult<Self> {
        let s = Shape::new(shape);
        if data.len() != s.numel() {
            return Err(DataError::ShapeMismatch {
                expected: s.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(NdArray { data, shape: s })
    }

    /// Create an array filled with a constant value.
    pub fn full(shape: Vec<usize>, value: T) -> Self {
        let s = Shape::new(shape);
        NdArray {
            data: vec![value; s.numel()],
            shape: s,
        }
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        NdArray::full(shape, T::ZERO)
    }

    /// Create a 1-D array from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        NdArray {
            data: data.to_vec(),
            shape: Shape::new(vec![data.len()]),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Element at a multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> DataResult<T> {
        let offset = self.shape.offset(indices)?;
        Ok(self.data[offset])
    }

    /// Set a single element.
    pub fn set(&mut self, indices: &[usize], value: T) -> DataResult<()> {
        let offset = self.shape.offset(indices)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Sub-array at position `i` of the outermost axis (one batch row).
    pub fn index_axis0(&self, i: usize) -> DataResult<NdArray<T>> {
        let rows = self.shape.dim(0)?;
        if i >= rows {
            return Err(DataError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: rows,
            });
        }
        let inner = self.shape.inner();
        let stride = inner.numel();
        let start = i * stride;
        Ok(NdArray {
            data: self.data[start..start + stride].to_vec(),
            shape: inner,
        })
    }

    /// Rows of a 2-D array as nested vectors.
    pub fn to_vec2d(&self) -> DataResult<Vec<Vec<T>>> {
        if self.ndim() != 2 {
            return Err(DataError::DimensionMismatch(format!(
                "to_vec2d() requires a 2D array, got {} dimensions",
                self.ndim()
            )));
        }
        let cols = self.shape.dim(1)?;
        if cols == 0 {
            return Ok(vec![Vec::new(); self.shape.dim(0)?]);
        }
        Ok(self.data.chunks(cols).map(<[T]>::to_vec).collect())
    }

    /// Convert every element to `f64`.
    pub fn to_f64(&self) -> NdArray<f64> {
        NdArray {
            data: self.data.iter().map(|v| v.to_f64()).collect(),
            shape: self.shape.clone(),
        }
    }
}

impl<T: Element> fmt::Display for NdArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array(shape={}, [", self.shape)?;
        for (i, v) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if i > 6 {
                write!(f, "...")?;
                break;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "])")
    }
}

/// Array for one field of a batch. Integer leaves stay integral; any float leaf
/// promotes the whole field to `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldArray {
    Int(NdArray<i64>),
    Float(NdArray<f64>),
}

impl FieldArray {
    pub fn shape(&self) -> &Shape {
        match self {
            FieldArray::Int(a) => a.shape(),
            FieldArray::Float(a) => a.shape(),
        }
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape().to_vec()
    }

    pub fn as_int(&self) -> Option<&NdArray<i64>> {
        match self {
            FieldArray::Int(a) => Some(a),
            FieldArray::Float(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<&NdArray<f64>> {
        match self {
            FieldArray::Float(a) => Some(a),
            FieldArray::Int(_) => None,
        }
    }

    /// View of the field as `f64`, whatever its element type.
    pub fn to_f64(&self) -> NdArray<f64> {
        match self {
            FieldArray::Int(a) => a.to_f64(),
            FieldArray::Float(a) => a.clone(),
        }
    }
}

impl fmt::Display for FieldArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldArray::Int(a) => write!(f, "{}", a),
            FieldArray::Float(a) => write!(f, "{}", a),
        }
    }
}

/// Numeric representation of a batch: field name to dense array.
pub type BatchArray = BTreeMap<String, FieldArray>;
