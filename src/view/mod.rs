//! View state: sorting, filtering, layout and scroll position.

pub mod layout;
pub mod location;
pub mod resolver;
pub mod scroll;
pub mod state;

pub use layout::{ColumnKey, ColumnLayout};
pub use location::Location;
pub use resolver::{resolve, StoredView};
pub use scroll::ScrollPersistence;
pub use state::{rand_seed, SortColumn, SortDirection, ViewState};
