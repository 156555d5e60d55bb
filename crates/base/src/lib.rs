//! Common infrastructure shared by lexview components.

pub mod error;
pub mod logging;
pub mod shared_string;
pub mod timing;

pub use error::{ErrorKind, LexviewError, Result};
pub use shared_string::SharedString;
pub use timing::{TaskTimer, TaskTiming};

/// Returns the build-time project revision, `<version>+<commit>[-dev]`.
pub fn project_revision() -> &'static str {
    env!("LEXVIEW_PROJECT_REVISION")
}
