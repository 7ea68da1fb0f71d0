pub mod catalog_view;
pub mod detail_overlay;
pub mod entry_list;
pub mod search_bar;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use catalog_view::{CatalogView, CatalogViewProps, EMPTY_RESULTS, LOADING_MORE};
pub use detail_overlay::{DetailOverlay, DetailOverlayProps};
pub use entry_list::{EntryList, EntryListProps, NEAR_END_ROWS, entry_label};
pub use search_bar::{SearchBar, SearchBarProps};
