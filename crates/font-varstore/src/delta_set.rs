//! Delta-set index maps.
//!
//! Variable paint records do not hold packed variation indices directly;
//! they point at a run of entries in a delta-set index map, which in turn
//! holds the packed `(outer << 16) | inner` indices.

/// Marks a field whose value does not vary.
pub const NO_VARIATION_INDEX: u32 = 0xFFFF_FFFF;

/// Smallest entry format able to hold every index in `mapping`.
///
/// The low nibble is the inner-index bit count minus one, the high nibble
/// the entry size in bytes minus one.
pub fn compute_delta_set_entry_format(mapping: &[u32]) -> u8 {
    let ored = mapping.iter().fold(0u32, |acc, idx| acc | idx);

    let inner = ored & 0xFFFF;
    let inner_bits = (u32::BITS - inner.leading_zeros()).max(1);
    debug_assert!(inner_bits <= 16);

    let packed = (ored >> (16 - inner_bits)) | (ored & ((1 << inner_bits) - 1));
    let entry_size: u32 = match packed {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    };

    (((entry_size - 1) << 4) | (inner_bits - 1)) as u8
}

/// Packed variation indices in the order paint records reference them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaSetIndexMap {
    pub entries: Vec<u32>,
}

impl DeltaSetIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its position in the map.
    pub fn push(&mut self, index: u32) -> u32 {
        self.entries.push(index);
        (self.entries.len() - 1) as u32
    }

    /// Position the next pushed entry will take.
    pub fn next_index(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_format(&self) -> u8 {
        compute_delta_set_entry_format(&self.entries)
    }
}
