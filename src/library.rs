//! Catalog loading, song records and the genre-filtered view.
//!
//! A catalog is a manifest of filenames plus one metadata document per
//! song, served by a [`CatalogSource`]. The loaded [`Library`] never
//! changes; filtering derives a view from it.

mod display;
mod load;
mod model;
mod source;
mod view;

pub use display::{UNKNOWN_DURATION, format_time, parse_time};
pub use load::{LoadOutcome, load_library};
pub use model::{
    DisplayDuration, IV_LEN, Protection, SALT_LEN, SongId, SongMetadata, SongRecord,
};
pub use source::{CatalogSource, DirectorySource, MemorySource};
pub use view::{FilterSet, Library, next_in_view, prev_in_view};

#[cfg(test)]
mod tests;
