pub mod threshold;

pub use threshold::{classify, DECISION_THRESHOLD};
