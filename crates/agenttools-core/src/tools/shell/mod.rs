//! Shell tools for guarded command execution

mod denylist;
mod gate;
mod run;

pub use denylist::{Denylist, DEFAULT_DENYLIST};
pub use gate::{CommandGate, Outcome};
pub use run::RunShell;
