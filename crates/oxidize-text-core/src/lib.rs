pub mod array;
pub mod dtype;
pub mod error;
pub mod sample;
pub mod shape;
pub mod value;

pub use array::{BatchArray, FieldArray, NdArray};
pub use dtype::Element;
pub use error::{DataError, DataResult};
pub use sample::{Record, Sample};
pub use shape::Shape;
pub use value::{FieldValue, Scalar};
