pub mod interpreter;
pub mod workspace;

pub use interpreter::{ExecContext, Interpreter, TensorHandle};
pub use workspace::{Region, Workspace, ARENA_ALIGNMENT};
