//! Cell masks — fixed-length bit-vectors over grid cell indices
//!
//! Every set operation returns a new mask. Binary operations require both
//! operands to have the same bit length; a mismatch is a contract violation
//! reported as [`OutcomeError::LengthMismatch`].

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{OutcomeError, OutcomeResult};

const WORD_BITS: usize = 64;

/// Immutable bit-vector over cell indices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MaskRepr", into = "MaskRepr")]
pub struct CellMask {
    bit_length: usize,
    words: Vec<u64>,
}

impl CellMask {
    /// Mask of `bit_length` cells, none set
    pub fn all_false(bit_length: usize) -> Self {
        Self {
            bit_length,
            words: vec![0; bit_length.div_ceil(WORD_BITS)],
        }
    }

    /// Mask of `bit_length` cells, all set
    pub fn all_true(bit_length: usize) -> Self {
        let mut mask = Self {
            bit_length,
            words: vec![u64::MAX; bit_length.div_ceil(WORD_BITS)],
        };
        mask.clear_tail();
        mask
    }

    /// Mask with exactly the given indexes set
    pub fn from_indexes(
        bit_length: usize,
        indexes: impl IntoIterator<Item = usize>,
    ) -> OutcomeResult<Self> {
        let mut mask = Self::all_false(bit_length);
        for index in indexes {
            mask.set(index)?;
        }
        Ok(mask)
    }

    /// Copy of this mask with one more index set
    pub fn with_index(&self, index: usize) -> OutcomeResult<Self> {
        let mut mask = self.clone();
        mask.set(index)?;
        Ok(mask)
    }

    fn set(&mut self, index: usize) -> OutcomeResult<()> {
        if index >= self.bit_length {
            return Err(OutcomeError::IndexOutOfRange {
                index,
                length: self.bit_length,
            });
        }
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
        Ok(())
    }

    fn clear_tail(&mut self) {
        let used = self.bit_length % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }

    /// Number of cells covered
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// Is cell `index` set? Out-of-range indexes are not set.
    pub fn contains(&self, index: usize) -> bool {
        index < self.bit_length && self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Value of cell `index`, or `None` when out of range
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.bit_length).then(|| self.contains(index))
    }

    fn check_length(&self, other: &CellMask) -> OutcomeResult<()> {
        if self.bit_length != other.bit_length {
            return Err(OutcomeError::LengthMismatch {
                left: self.bit_length,
                right: other.bit_length,
            });
        }
        Ok(())
    }

    fn zip_with(&self, other: &CellMask, op: impl Fn(u64, u64) -> u64) -> OutcomeResult<CellMask> {
        self.check_length(other)?;
        Ok(Self {
            bit_length: self.bit_length,
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        })
    }

    /// Cells set in both masks
    pub fn and(&self, other: &CellMask) -> OutcomeResult<CellMask> {
        self.zip_with(other, |a, b| a & b)
    }

    /// Cells set in either mask
    pub fn or(&self, other: &CellMask) -> OutcomeResult<CellMask> {
        self.zip_with(other, |a, b| a | b)
    }

    /// Cells set here but not in `other`
    pub fn and_not(&self, other: &CellMask) -> OutcomeResult<CellMask> {
        self.zip_with(other, |a, b| a & !b)
    }

    /// Complement within the bit length
    pub fn not(&self) -> CellMask {
        let mut mask = Self {
            bit_length: self.bit_length,
            words: self.words.iter().map(|w| !w).collect(),
        };
        mask.clear_tail();
        mask
    }

    /// True iff `self AND other` is non-empty; the intersection is not built
    pub fn and_not_empty(&self, other: &CellMask) -> OutcomeResult<bool> {
        self.check_length(other)?;
        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .any(|(&a, &b)| a & b != 0))
    }

    /// Number of set cells
    pub fn true_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// No cell set?
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Set cell indexes in ascending order
    pub fn enumerate_indexes(&self) -> MaskIndexes<'_> {
        MaskIndexes {
            words: &self.words,
            word_index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl Index<usize> for CellMask {
    type Output = bool;

    /// Panics when `index` is out of range, like slice indexing.
    fn index(&self, index: usize) -> &bool {
        assert!(
            index < self.bit_length,
            "cell index {} out of range for mask of length {}",
            index,
            self.bit_length
        );
        if self.contains(index) { &true } else { &false }
    }
}

/// Lazy ascending iterator over the set cells of a mask
///
/// Scans one 64-bit word at a time and peels bits with `trailing_zeros`.
#[derive(Debug, Clone)]
pub struct MaskIndexes<'a> {
    words: &'a [u64],
    word_index: usize,
    current: u64,
}

impl Iterator for MaskIndexes<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * WORD_BITS + bit);
            }
            self.word_index += 1;
            self.current = *self.words.get(self.word_index)?;
        }
    }
}

/// Serialized form: length plus the list of set indexes
#[derive(Serialize, Deserialize)]
struct MaskRepr {
    bit_length: usize,
    indexes: Vec<usize>,
}

impl From<CellMask> for MaskRepr {
    fn from(mask: CellMask) -> Self {
        Self {
            bit_length: mask.bit_length,
            indexes: mask.enumerate_indexes().collect(),
        }
    }
}

impl TryFrom<MaskRepr> for CellMask {
    type Error = OutcomeError;

    fn try_from(repr: MaskRepr) -> OutcomeResult<Self> {
        CellMask::from_indexes(repr.bit_length, repr.indexes)
    }
}
