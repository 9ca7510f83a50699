//! Item variation data pages.

/// Flag in `word_delta_count` marking 32-bit "word" columns.
pub const LONG_WORDS: u16 = 0x8000;

/// Maximum number of items in a single page.
pub const MAX_ITEMS_PER_PAGE: usize = 0xFFFF;

/// Storage width needed by a delta column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnBits {
    /// Every delta in the column is zero
    None = 0,
    One = 1,
    Two = 2,
    Four = 4,
}

impl ColumnBits {
    pub fn for_val(val: i32) -> Self {
        if val == 0 {
            Self::None
        } else if i8::try_from(val).is_ok() {
            Self::One
        } else if i16::try_from(val).is_ok() {
            Self::Two
        } else {
            Self::Four
        }
    }

    /// The number of bytes required to store this column
    pub fn cost(self) -> usize {
        self as u8 as _
    }
}

/// One page of an item variation store.
///
/// Every item holds one delta per region in `region_indexes`, in the same
/// order. Rows are referenced from outside as `(page << 16) | row`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarData {
    /// Indices into the store's region list, one per delta column
    pub region_indexes: Vec<u16>,
    /// Delta rows
    pub items: Vec<Vec<i32>>,
    /// Packed count of word-sized columns, with [`LONG_WORDS`] set when the
    /// word columns are 32-bit. Filled in by [`calculate_num_shorts`](Self::calculate_num_shorts).
    pub word_delta_count: u16,
}

impl VarData {
    pub fn new(region_indexes: Vec<u16>) -> Self {
        Self {
            region_indexes,
            items: Vec::new(),
            word_delta_count: 0,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_ITEMS_PER_PAGE
    }

    /// Append a delta row, returning its index within the page.
    ///
    /// # Panics
    ///
    /// Panics if the row width does not match the region count, or the page is full.
    pub fn add_item(&mut self, deltas: Vec<i32>) -> u16 {
        assert_eq!(
            deltas.len(),
            self.region_indexes.len(),
            "delta row must have one value per region"
        );
        assert!(!self.is_full(), "variation data page is full");
        self.items.push(deltas);
        (self.items.len() - 1) as u16
    }

    /// Width of each column: the widest delta stored in it.
    pub fn column_bits(&self) -> Vec<ColumnBits> {
        let mut bits = vec![ColumnBits::None; self.region_indexes.len()];
        for item in &self.items {
            for (column, delta) in bits.iter_mut().zip(item) {
                *column = (*column).max(ColumnBits::for_val(*delta));
            }
        }
        bits
    }

    /// Work out `word_delta_count` for the stored items.
    ///
    /// Word columns must come first in a row. With `optimize` set, columns
    /// are reordered widest first (items and region indexes move together),
    /// which keeps the word count to the number of wide columns. Without it
    /// the order is kept and every column up to the last wide one is stored
    /// as a word.
    pub fn calculate_num_shorts(&mut self, optimize: bool) {
        let mut bits = self.column_bits();
        let long_words = bits.contains(&ColumnBits::Four);
        let wide = if long_words {
            ColumnBits::Four
        } else {
            ColumnBits::Two
        };

        if optimize {
            let mut order: Vec<usize> = (0..bits.len()).collect();
            order.sort_by(|a, b| bits[*b].cmp(&bits[*a]));
            if order.iter().enumerate().any(|(pos, idx)| pos != *idx) {
                self.region_indexes = order.iter().map(|&idx| self.region_indexes[idx]).collect();
                for item in &mut self.items {
                    *item = order.iter().map(|&idx| item[idx]).collect();
                }
                bits = order.iter().map(|&idx| bits[idx]).collect();
            }
        }

        let count = bits
            .iter()
            .rposition(|column| *column >= wide)
            .map(|idx| idx + 1)
            .unwrap_or(0) as u16;
        self.word_delta_count = if long_words { count | LONG_WORDS } else { count };
    }

    /// Number of word-sized columns, without the long flag.
    pub fn word_count(&self) -> u16 {
        self.word_delta_count & !LONG_WORDS
    }

    pub fn has_long_words(&self) -> bool {
        self.word_delta_count & LONG_WORDS != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_bits_for_val() {
        assert_eq!(ColumnBits::for_val(0), ColumnBits::None);
        assert_eq!(ColumnBits::for_val(-128), ColumnBits::One);
        assert_eq!(ColumnBits::for_val(127), ColumnBits::One);
        assert_eq!(ColumnBits::for_val(128), ColumnBits::Two);
        assert_eq!(ColumnBits::for_val(-32768), ColumnBits::Two);
        assert_eq!(ColumnBits::for_val(32768), ColumnBits::Four);
        assert_eq!(ColumnBits::Four.cost(), 4);
    }

    #[test]
    fn byte_columns_need_no_words() {
        let mut data = VarData::new(vec![0, 1]);
        data.add_item(vec![1, -5]);
        data.add_item(vec![127, 0]);
        data.calculate_num_shorts(true);

        assert_eq!(data.word_delta_count, 0);
        assert_eq!(data.region_indexes, vec![0, 1]);
    }

    #[test]
    fn optimize_moves_short_columns_first() {
        let mut data = VarData::new(vec![0, 1, 2]);
        data.add_item(vec![1, 300, 2]);
        data.add_item(vec![3, 4, -400]);
        data.calculate_num_shorts(true);

        assert_eq!(data.word_delta_count, 2);
        assert_eq!(data.region_indexes, vec![1, 2, 0]);
        assert_eq!(data.items, vec![vec![300, 2, 1], vec![4, -400, 3]]);
    }

    #[test]
    fn unoptimized_covers_last_short_column() {
        let mut data = VarData::new(vec![0, 1, 2]);
        data.add_item(vec![1, 2, 300]);
        data.calculate_num_shorts(false);

        assert_eq!(data.word_delta_count, 3);
        assert_eq!(data.region_indexes, vec![0, 1, 2]);
    }

    #[test]
    fn long_words_set_flag() {
        let mut data = VarData::new(vec![0, 1, 2]);
        data.add_item(vec![5, 70000, 300]);
        data.calculate_num_shorts(true);

        assert!(data.has_long_words());
        assert_eq!(data.word_count(), 1);
        assert_eq!(data.word_delta_count, LONG_WORDS | 1);
        assert_eq!(data.region_indexes, vec![1, 2, 0]);
    }

    #[test]
    #[should_panic]
    fn add_item_rejects_wrong_width() {
        let mut data = VarData::new(vec![0, 1]);
        data.add_item(vec![1]);
    }
}
