pub mod context;
pub mod error;
pub mod ranking;

pub use context::{ContextFile, GatheredContext};
pub use error::{LensError, Result};
pub use ranking::{FileCandidate, FileRole, RankedFile, sort_by_importance};
