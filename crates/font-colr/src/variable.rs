//! Values that vary across the design space.
//!
//! A [`Variable`] records master values at normalized locations and answers
//! queries anywhere in between through a lazily built [`VariationModel`].

use std::{
    cell::{OnceCell, RefCell},
    collections::HashMap,
    fmt,
};

use font_types::Tag;
use indexmap::IndexMap;
use kurbo::Affine;
use log::{debug, trace};
use painter_font_varmodel::{Axis, NormalizedLocation, VariationModel};
use painter_font_varstore::VarStoreBuilder;

use crate::{error::Result, matrix::matrix_label};

/// A value type that can be interpolated by a [`VariationModel`].
pub trait Interpolate: Clone + fmt::Debug {
    /// Value of a container with no masters.
    fn identity() -> Self;

    /// Interpolate from master values (in model master order) and the
    /// model's scalars at the query location.
    fn combine_from_masters_and_scalars(model: &VariationModel, masters: &[Self], scalars: &[f64]) -> Self;

    /// Short human-readable form.
    fn label(&self) -> String;
}

impl Interpolate for f64 {
    fn identity() -> Self {
        0.0
    }

    fn combine_from_masters_and_scalars(model: &VariationModel, masters: &[Self], scalars: &[f64]) -> Self {
        model
            .interpolate_from_masters_and_scalars(masters, scalars)
            .unwrap_or(0.0)
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl Interpolate for Affine {
    fn identity() -> Self {
        Affine::IDENTITY
    }

    /// Each of the six coefficients is interpolated independently.
    fn combine_from_masters_and_scalars(model: &VariationModel, masters: &[Self], scalars: &[f64]) -> Self {
        let identity = Affine::IDENTITY.as_coeffs();
        let mut coeffs = [0.0; 6];
        for (idx, coeff) in coeffs.iter_mut().enumerate() {
            let components: Vec<f64> = masters.iter().map(|m| m.as_coeffs()[idx]).collect();
            *coeff = model
                .interpolate_from_masters_and_scalars(&components, scalars)
                .unwrap_or(identity[idx]);
        }
        Affine::new(coeffs)
    }

    fn label(&self) -> String {
        matrix_label(self)
    }
}

/// Master values of type `T` keyed by normalized location.
pub struct Variable<T> {
    axes: Vec<Tag>,
    /// Canonical location key -> (location, master value), in insertion order
    values: IndexMap<String, (NormalizedLocation, T)>,
    model: OnceCell<VariationModel>,
    cache: RefCell<HashMap<String, T>>,
}

/// A varying number, such as an opacity or a gradient coordinate.
pub type VariableScalar = Variable<f64>;

/// A varying 2x3 affine transform.
pub type VariableMatrix = Variable<Affine>;

impl<T: Interpolate> Variable<T> {
    /// An empty container over `axes`.
    pub fn new(axes: Vec<Tag>) -> Self {
        Self {
            axes,
            values: IndexMap::new(),
            model: OnceCell::new(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// A container holding `value` at the default location.
    pub fn with_default(axes: Vec<Tag>, value: T) -> Self {
        let mut out = Self::new(axes);
        let location = out.default_location();
        out.add_value(&location, value);
        out
    }

    /// Rebuild a container from canonical location keys.
    pub fn from_keys<'a>(axes: Vec<Tag>, values: impl IntoIterator<Item = (&'a str, T)>) -> Result<Self> {
        let mut out = Self::new(axes);
        for (key, value) in values {
            let location = NormalizedLocation::from_key(key)?;
            out.add_value(&location, value);
        }
        Ok(out)
    }

    pub fn axes(&self) -> &[Tag] {
        &self.axes
    }

    /// The all-default location over this container's axes.
    pub fn default_location(&self) -> NormalizedLocation {
        self.axes.iter().map(|tag| (*tag, 0.0)).collect()
    }

    /// Store a master value, replacing any value at the same location.
    pub fn add_value(&mut self, location: &NormalizedLocation, value: T) {
        self.values.insert(location.key(), (location.clone(), value));
        self.model = OnceCell::new();
        self.cache.get_mut().clear();
    }

    /// Builder-style variant of [`add_value`](Self::add_value).
    pub fn with_value(mut self, location: &NormalizedLocation, value: T) -> Self {
        self.add_value(location, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether more than one master is stored.
    pub fn does_vary(&self) -> bool {
        self.values.len() > 1
    }

    /// Master locations and values in insertion order.
    pub fn masters(&self) -> impl Iterator<Item = (&NormalizedLocation, &T)> + '_ {
        self.values.values().map(|(location, value)| (location, value))
    }

    /// Master values in insertion order.
    pub fn master_values(&self) -> impl Iterator<Item = &T> + '_ {
        self.values.values().map(|(_, value)| value)
    }

    /// Each master's coordinate on `axis`, in user units.
    pub fn user_locations(&self, axis: &Axis) -> Vec<f64> {
        self.values
            .values()
            .map(|(location, _)| axis.denormalize(location.value(axis.tag)))
            .collect()
    }

    /// The model over the current masters, built on first use.
    pub fn model(&self) -> &VariationModel {
        self.model.get_or_init(|| {
            let locations = self.values.values().map(|(location, _)| location.clone()).collect();
            VariationModel::new(locations, self.axes.clone())
        })
    }

    /// Value at a location.
    ///
    /// With no masters this is the type's identity; with one master it is
    /// that master everywhere.
    pub fn value_at(&self, location: &NormalizedLocation) -> T {
        let mut masters = self.values.values();
        match (masters.next(), masters.next()) {
            (None, _) => return T::identity(),
            (Some((_, only)), None) => return only.clone(),
            _ => {}
        }

        let key = location.key();
        if let Some((_, value)) = self.values.get(&key) {
            return value.clone();
        }
        if let Some(value) = self.cache.borrow().get(&key) {
            return value.clone();
        }

        let model = self.model();
        let scalars = model.scalars(location);
        let masters: Vec<T> = self.master_values().cloned().collect();
        let value = T::combine_from_masters_and_scalars(model, &masters, &scalars);
        trace!("Interpolated {} at {key}", value.label());
        self.cache.borrow_mut().insert(key, value.clone());
        value
    }

    /// Value at the default location.
    pub fn default_value(&self) -> T {
        self.value_at(&self.default_location())
    }

    /// Label of the value at a location.
    pub fn label_at(&self, location: &NormalizedLocation) -> String {
        self.value_at(location).label()
    }

    /// Store the masters, converted to numbers, in `builder`.
    ///
    /// The stored deltas are relative to the value at the default location.
    /// Without a master there, the interpolated default is added as one so
    /// that regions stay measured from the default.
    ///
    /// Returns the packed variation index.
    pub fn add_to_var_store(&self, builder: &mut VarStoreBuilder, convert: impl Fn(&T) -> f64) -> u32 {
        let mut masters: Vec<f64> = self.master_values().map(&convert).collect();
        let model = self.model();
        if model.is_anchored_at_default() {
            builder.set_model(model);
        } else {
            let default = self.default_location();
            debug!("Adding an interpolated default master at {default}");
            masters.push(convert(&self.value_at(&default)));
            let mut locations = model.orig_locations().to_vec();
            locations.push(default);
            builder.set_model(&VariationModel::new(locations, self.axes.clone()));
        }
        let (_, index) = builder.store_masters(&masters);
        index
    }
}

impl<T: Clone> Clone for Variable<T> {
    /// Copies the masters; the model and the interpolation cache start empty.
    fn clone(&self) -> Self {
        Self {
            axes: self.axes.clone(),
            values: self.values.clone(),
            model: OnceCell::new(),
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("axes", &self.axes)
            .field(
                "values",
                &self.values.iter().map(|(key, (_, value))| (key, value)).collect::<Vec<_>>(),
            )
            .finish()
    }
}
