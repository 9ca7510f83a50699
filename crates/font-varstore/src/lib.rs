//! # Item Variation Store Builder
//!
//! Packs per-master deltas from a [`VariationModel`] into an item variation
//! store: support regions are pooled, delta rows are grouped into pages of
//! at most 65 535 items and deduplicated, and each stored row is referenced
//! by a packed `(page << 16) | item` index.
//!
//! ## Example
//!
//! ```
//! use font_types::Tag;
//! use painter_font_varmodel::{NormalizedLocation, VariationModel};
//! use painter_font_varstore::VarStoreBuilder;
//!
//! let wght = Tag::new(b"wght");
//! let model = VariationModel::new(
//!     vec![NormalizedLocation::new(), NormalizedLocation::new().with(wght, 1.0)],
//!     vec![wght],
//! );
//!
//! let mut builder = VarStoreBuilder::new(vec![wght]);
//! builder.set_model(&model);
//! let (base, index) = builder.store_masters(&[100.0, 150.0]);
//! assert_eq!(base, 100.0);
//! assert_eq!(index, 0);
//!
//! let store = builder.finish(true);
//! assert_eq!(store.item(index), Some(&[50][..]));
//! ```
//!
//! [`VariationModel`]: painter_font_varmodel::VariationModel

mod builder;
mod delta_set;
mod region;
mod var_data;

pub use builder::{ItemVariationStore, VarStoreBuilder};
pub use delta_set::{DeltaSetIndexMap, NO_VARIATION_INDEX, compute_delta_set_entry_format};
pub use region::{RegionAxisCoordinates, VariationRegion};
pub use var_data::{ColumnBits, LONG_WORDS, MAX_ITEMS_PER_PAGE, VarData};
