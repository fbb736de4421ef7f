//! User-facing build output
//!
//! Diagnostics go through `tracing`; what the platform shows the user as the
//! build log goes through [`LogEmitter`].
//!
//! # Example
//!
//! ```rust,ignore
//! use httpd_buildpack::ui::{LogEmitter, UiContext};
//!
//! let log = LogEmitter::stdout(UiContext::detect(env.log_level));
//! log.title(&info);
//! log.process("Resolving Apache HTTP Server version");
//! log.subprocess("Selected Apache HTTP Server version (using BP_HTTPD_VERSION): 2.4.54");
//! ```

mod context;
mod emitter;

pub use context::UiContext;
pub use emitter::{format_duration, LogEmitter};

#[cfg(test)]
pub(crate) use emitter::tests::{emitter as test_emitter, SharedBuffer};
