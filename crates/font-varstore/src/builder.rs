//! Online item variation store builder.
//!
//! Master values are stored one vector at a time against whatever model is
//! current. Regions are pooled across models, pages are shared by every
//! model with the same region list, and identical delta rows are stored
//! once.

use std::collections::HashMap;

use font_types::Tag;
use log::{debug, warn};
use painter_font_varmodel::{Support, VariationModel};

use crate::{
    delta_set::NO_VARIATION_INDEX,
    region::VariationRegion,
    var_data::VarData,
};

/// A finished item variation store, ready for serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemVariationStore {
    pub axis_count: u16,
    pub regions: Vec<VariationRegion>,
    pub var_data: Vec<VarData>,
}

impl ItemVariationStore {
    /// Delta row behind a packed variation index.
    pub fn item(&self, index: u32) -> Option<&[i32]> {
        let outer = (index >> 16) as usize;
        let inner = (index & 0xFFFF) as usize;
        self.var_data
            .get(outer)?
            .items
            .get(inner)
            .map(Vec::as_slice)
    }
}

/// Builds an [`ItemVariationStore`] incrementally.
#[derive(Debug, Default)]
pub struct VarStoreBuilder {
    axis_tags: Vec<Tag>,
    model: Option<VariationModel>,
    /// Supports of the current model, base region removed
    supports: Vec<Support>,
    regions: Vec<VariationRegion>,
    /// Region key -> index in `regions`
    region_map: HashMap<String, u16>,
    var_data: Vec<VarData>,
    /// Region index list -> most recent page for it
    var_data_indices: HashMap<Vec<u16>, usize>,
    /// Region index list -> delta row -> packed index, shared by every page with that list
    var_data_caches: HashMap<Vec<u16>, HashMap<Vec<i32>, u32>>,
    /// Region index list of the current supports, once resolved
    current: Option<Vec<u16>>,
}

impl VarStoreBuilder {
    /// Create a builder for a font with the given axes, in font axis order.
    pub fn new(axis_tags: Vec<Tag>) -> Self {
        Self {
            axis_tags,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.var_data.is_empty()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn page_count(&self) -> usize {
        self.var_data.len()
    }

    /// Make `model` the model for subsequent [`store_masters`](Self::store_masters) calls.
    pub fn set_model(&mut self, model: &VariationModel) {
        if !model.is_anchored_at_default() {
            warn!(
                "Variation model has no default master; regions are relative to {}",
                model.origin()
            );
        }
        self.set_supports(model.supports().to_vec());
        self.model = Some(model.clone());
    }

    /// Use an explicit support list. The base region, if first, is dropped
    /// since its delta lives in the record's default field.
    pub fn set_supports(&mut self, mut supports: Vec<Support>) {
        if supports.first().is_some_and(Support::is_empty) {
            supports.remove(0);
        }
        self.supports = supports;
        self.model = None;
        self.current = None;
    }

    /// Store master values (in the model's original master order).
    ///
    /// Returns the base value and the packed variation index of the deltas.
    ///
    /// # Panics
    ///
    /// Panics if no model has been set.
    pub fn store_masters(&mut self, master_values: &[f64]) -> (f64, u32) {
        let Some(model) = &self.model else {
            panic!("store_masters called before set_model");
        };
        let deltas = model.deltas(master_values);
        let base = deltas.first().copied().unwrap_or_default();
        (base, self.store_deltas(&deltas))
    }

    /// Store a delta vector for the current supports.
    ///
    /// The vector may include the base delta in front, which is not stored.
    /// Returns [`NO_VARIATION_INDEX`] when there is nothing to vary. A page is
    /// only opened when a new row has to be appended.
    ///
    /// # Panics
    ///
    /// Panics if the row width does not match the supports, or if the region
    /// pool outgrows 16-bit indices.
    pub fn store_deltas(&mut self, deltas: &[f64]) -> u32 {
        let mut row: Vec<i32> = deltas.iter().map(|d| ot_round(*d)).collect();
        if row.len() == self.supports.len() + 1 {
            row.remove(0);
        } else {
            assert_eq!(
                row.len(),
                self.supports.len(),
                "delta count must match the current supports"
            );
        }
        if row.is_empty() {
            return NO_VARIATION_INDEX;
        }

        let key = match self.current.take() {
            Some(key) => key,
            None => self.region_indexes(),
        };
        let cached = self
            .var_data_caches
            .get(&key)
            .and_then(|cache| cache.get(&row))
            .copied();
        let index = match cached {
            Some(index) => index,
            None => {
                let outer = self.page_for(&key);
                let inner = self.var_data[outer].add_item(row.clone());
                let index = ((outer as u32) << 16) | inner as u32;
                self.var_data_caches.entry(key.clone()).or_default().insert(row, index);
                index
            }
        };
        self.current = Some(key);
        index
    }

    /// Pool the current supports as regions and return their indices.
    fn region_indexes(&mut self) -> Vec<u16> {
        self.supports
            .iter()
            .map(|support| {
                let region_key = support.key();
                if let Some(&idx) = self.region_map.get(&region_key) {
                    return idx;
                }
                // region counts are 16-bit, so the last index is 0xFFFE
                let idx = u16::try_from(self.regions.len())
                    .ok()
                    .filter(|idx| *idx < u16::MAX);
                let Some(idx) = idx else {
                    panic!("more than 65535 variation regions");
                };
                self.regions
                    .push(VariationRegion::from_support(support, &self.axis_tags));
                self.region_map.insert(region_key, idx);
                idx
            })
            .collect()
    }

    /// Page that takes the next new row for `key`, opened if none has room.
    fn page_for(&mut self, key: &[u16]) -> usize {
        if let Some(&outer) = self.var_data_indices.get(key) {
            if !self.var_data[outer].is_full() {
                return outer;
            }
        }

        let outer = self.var_data.len();
        debug!("Opening variation data page {outer} over regions {key:?}");
        self.var_data.push(VarData::new(key.to_vec()));
        self.var_data_indices.insert(key.to_vec(), outer);
        outer
    }

    /// Freeze every page's column widths and return the store.
    pub fn finish(mut self, optimize: bool) -> ItemVariationStore {
        for data in &mut self.var_data {
            data.calculate_num_shorts(optimize);
        }
        debug!(
            "Finished variation store: {} regions, {} pages, {} items",
            self.regions.len(),
            self.var_data.len(),
            self.var_data.iter().map(VarData::item_count).sum::<usize>()
        );
        ItemVariationStore {
            axis_count: self.axis_tags.len() as u16,
            regions: self.regions,
            var_data: self.var_data,
        }
    }
}

/// Round half up, as OpenType compilers do.
fn ot_round(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
