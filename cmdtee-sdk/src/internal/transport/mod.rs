//! Process plumbing: spawning, stream halves and lifecycle handle.

mod line_decoder;
mod process_handle;
mod read_half;
mod subprocess;
mod write_half;

pub use process_handle::ProcessHandle;
pub use read_half::{DrainConfig, ReadHalf};
pub use subprocess::{SplitSubprocess, Subprocess};
pub use write_half::WriteHalf;
