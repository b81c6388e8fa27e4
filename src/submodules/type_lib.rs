use ndarray::{Array1, Array2};

pub type NumericData = f64;
pub type Series = Array1<NumericData>;
pub type Table = Array2<NumericData>;
