pub mod model;
pub mod operator;
pub mod tensor;

pub use model::{Model, SCHEMA_VERSION};
pub use operator::{FusedActivation, OperatorDef};
pub use tensor::{DataType, TensorDef};
