//! # Mediamap
//!
//! In-memory query and visualization engine for a local media dashboard:
//! a multi-predicate filter/sort pipeline over thousands of flat media
//! records, a virtual folder tree reconstructed from path strings, a
//! squarified treemap with drill-down, and original/optimized pairing for
//! re-encoded files. Rendering stays outside; the engine emits plain data
//! and the bundled terminal client paints it.

pub mod backend;
pub mod criteria;
pub mod drilldown;
pub mod error;
pub mod filter;
pub mod folders;
pub mod pairing;
pub mod paths;
pub mod record;
pub mod scanner;
pub mod sort;
pub mod state;
pub mod store;
pub mod treemap;
pub mod view;

// Re-export main API types
pub use criteria::{FilterCriteria, SortKey, Workspace};
pub use record::{MediaRecord, MediaType, QualityStatus};
pub use state::{reduce, Action, AppState, LayoutMode};
pub use store::MediaStore;
pub use view::{project, ViewBody, ViewModel};
