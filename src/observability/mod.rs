//! Crash reports and run context.
//!
//! `main` installs the panic hook; long-running stages set their [`Stage`]
//! and the file they are working on so a crash report can say where it
//! happened.

pub mod context;
pub mod panic_hook;

pub use context::{
    get_current_context, get_progress, increment_processed, set_current_file, set_progress,
    set_stage, ContextGuard, Stage, StageContext,
};
pub use panic_hook::install_panic_hook;
