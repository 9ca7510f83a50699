//! # Variation Model
//!
//! Design-space primitives for variable color fonts.
//!
//! Axes normalize user-space values into `[-1, 1]`; a [`VariationModel`]
//! built over an irregular set of master locations assigns each master a
//! support region and turns master values into deltas that can be
//! interpolated anywhere in the design space.
//!
//! ## Example
//!
//! ```
//! use font_types::Tag;
//! use painter_font_varmodel::{NormalizedLocation, VariationModel};
//!
//! let wght = Tag::new(b"wght");
//! let model = VariationModel::new(
//!     vec![
//!         NormalizedLocation::new(),
//!         NormalizedLocation::new().with(wght, 1.0),
//!     ],
//!     vec![wght],
//! );
//!
//! let halfway = NormalizedLocation::new().with(wght, 0.5);
//! let value = model.interpolate_from_masters(&halfway, &[10.0, 20.0]);
//! assert_eq!(value, Some(15.0));
//! ```

mod designspace;
mod error;
mod location;
mod support;
mod variation_model;

pub use designspace::{Axis, default_location, normalize_location, normalize_value};
pub use error::{Error, Result};
pub use location::{NormalizedLocation, UserLocation};
pub use support::{Support, Tent, support_scalar};
pub use variation_model::VariationModel;
