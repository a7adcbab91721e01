//! Host detection and shell selection.

pub mod os;
pub mod shell;

pub use os::Os;
pub use shell::{ShellKind, ShellStrategy};
