//! Patterns — the cell shapes prizes are evaluated over
//!
//! A pattern is an ordered list of groups. A payline has one single-cell
//! group per reel; a ways cluster has one group per reel holding every cell
//! any line visits on that reel. Evaluation walks groups, so both shapes go
//! through the same code.

use serde::{Deserialize, Serialize};

use crate::error::{OutcomeError, OutcomeResult};
use crate::mask::CellMask;

/// One evaluable shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    name: String,
    groups: Vec<CellMask>,
    mask: CellMask,
}

impl Pattern {
    /// Create a pattern from groups over `cell_count` cells
    pub fn new(name: impl Into<String>, cell_count: usize, groups: Vec<CellMask>) -> OutcomeResult<Self> {
        let mask = groups
            .iter()
            .try_fold(CellMask::all_false(cell_count), |acc, group| acc.or(group))?;
        Ok(Self {
            name: name.into(),
            groups,
            mask,
        })
    }

    /// Create a line visiting `cells` in order, one cell per group
    pub fn line(name: impl Into<String>, cell_count: usize, cells: &[usize]) -> OutcomeResult<Self> {
        let groups = cells
            .iter()
            .map(|&cell| CellMask::from_indexes(cell_count, [cell]))
            .collect::<OutcomeResult<Vec<_>>>()?;
        Self::new(name, cell_count, groups)
    }

    /// Pattern name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Groups in walk order
    pub fn groups(&self) -> &[CellMask] {
        &self.groups
    }

    /// Union of all groups
    pub fn mask(&self) -> &CellMask {
        &self.mask
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Has no groups?
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// True when every group is a single cell
    pub fn is_line(&self) -> bool {
        self.groups.iter().all(|g| g.true_count() == 1)
    }
}

/// Line patterns of a paytable, with optional cluster forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patterns {
    lines: Vec<Pattern>,
    clusters: Option<Vec<Pattern>>,
    source: Vec<Option<usize>>,
}

impl Patterns {
    /// Lines only
    pub fn new(lines: Vec<Pattern>) -> OutcomeResult<Self> {
        let cell_count = Self::shared_length(&lines)?;
        let mut source = vec![None; cell_count];
        for (index, line) in lines.iter().enumerate() {
            for cell in line.mask().enumerate_indexes() {
                source[cell].get_or_insert(index);
            }
        }
        Ok(Self {
            lines,
            clusters: None,
            source,
        })
    }

    /// Lines plus explicit clusters
    pub fn with_clusters(lines: Vec<Pattern>, clusters: Vec<Pattern>) -> OutcomeResult<Self> {
        let mut patterns = Self::new(lines)?;
        let cell_count = patterns.source.len();
        if let Some(bad) = clusters.iter().find(|c| c.mask().bit_length() != cell_count) {
            return Err(OutcomeError::LengthMismatch {
                left: cell_count,
                right: bad.mask().bit_length(),
            });
        }
        patterns.clusters = Some(clusters);
        Ok(patterns)
    }

    /// Lines plus a ways cluster derived from them
    ///
    /// Group `g` of the cluster is the union of group `g` of every line. The
    /// conversion needs every line to be a true line of one length; otherwise
    /// the result has no clusters and ways evaluation degrades to lines.
    pub fn with_auto_clusters(lines: Vec<Pattern>) -> OutcomeResult<Self> {
        let mut patterns = Self::new(lines)?;
        let length = patterns.lines.first().map(Pattern::len).unwrap_or(0);
        let convertible = length > 0
            && patterns
                .lines
                .iter()
                .all(|l| l.len() == length && l.is_line());
        if !convertible {
            log::warn!("[Patterns] Lines are not convertible to clusters");
            return Ok(patterns);
        }

        let cell_count = patterns.source.len();
        let groups = (0..length)
            .map(|g| {
                patterns
                    .lines
                    .iter()
                    .try_fold(CellMask::all_false(cell_count), |acc, line| acc.or(&line.groups()[g]))
            })
            .collect::<OutcomeResult<Vec<_>>>()?;
        patterns.clusters = Some(vec![Pattern::new("Ways", cell_count, groups)?]);
        Ok(patterns)
    }

    fn shared_length(lines: &[Pattern]) -> OutcomeResult<usize> {
        let cell_count = lines.first().map(|l| l.mask().bit_length()).unwrap_or(0);
        match lines.iter().find(|l| l.mask().bit_length() != cell_count) {
            Some(bad) => Err(OutcomeError::LengthMismatch {
                left: cell_count,
                right: bad.mask().bit_length(),
            }),
            None => Ok(cell_count),
        }
    }

    /// Line patterns in line order
    pub fn lines(&self) -> &[Pattern] {
        &self.lines
    }

    /// Cluster patterns, if any
    pub fn clusters(&self) -> Option<&[Pattern]> {
        self.clusters.as_deref()
    }

    /// Were clusters configured or derived?
    pub fn has_clusters(&self) -> bool {
        self.clusters.is_some()
    }

    /// First line containing a cell
    pub fn source_pattern(&self, cell: usize) -> Option<&Pattern> {
        self.source_line(cell).map(|index| &self.lines[index])
    }

    /// Index of the first line containing a cell
    pub fn source_line(&self, cell: usize) -> Option<usize> {
        self.source.get(cell).copied().flatten()
    }
}
