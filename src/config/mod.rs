//! Configuration for hermod.
//!
//! Two kinds of configuration live here:
//! - the developer mapping file (`config/developer_names.json` by default),
//!   which is optional and indexed into exact-match lookup tables
//! - process settings read from `HERMOD_*` environment variables

mod model;
mod operations;
mod settings;
pub mod types;


// Re-export public API
pub use model::{DeveloperMapping, MappingFile};
pub use operations::IdentityIndex;
pub use settings::{LogSettings, Settings};
pub use types::{CommandTimeout, TimeoutSource};
