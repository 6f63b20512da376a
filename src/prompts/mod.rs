pub mod directive;

pub use directive::{build_request, system_directive, SYSTEM_DIRECTIVE, INITIAL_HINT};
