mod helpers;
mod outputs;
mod verify;

pub use outputs::execute_outputs;
pub use verify::execute_verify;
