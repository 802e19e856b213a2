//! Left-to-right panel ordering and candidate validation.

use crate::MAX_PANELS;
use crate::types::{PanelId, PanelPosition};
use core::fmt;
use heapless::Vec;
use std::collections::BTreeSet;

/// Errors produced while parsing or assembling a panel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// A comma-separated entry is not a panel id.
    InvalidId(String),

    /// The same id appears twice in a stored order.
    Duplicate(PanelId),

    /// More than [`MAX_PANELS`] panels.
    CapacityExceeded,
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::InvalidId(token) => write!(f, "'{}' is not a valid panel id", token),
            OrderError::Duplicate(id) => write!(f, "panel {} appears more than once", id),
            OrderError::CapacityExceeded => {
                write!(f, "panel order exceeds {} panels", MAX_PANELS)
            }
        }
    }
}

impl std::error::Error for OrderError {}

/// A candidate order whose id set disagrees with the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderMismatch {
    /// Stored ids the candidate leaves out.
    pub missing: BTreeSet<PanelId>,
    /// Candidate ids the device does not have.
    pub extra: BTreeSet<PanelId>,
    /// Ids listed more than once in the candidate.
    pub duplicates: BTreeSet<PanelId>,
}

impl OrderMismatch {
    fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.duplicates.is_empty()
    }
}

fn write_ids(f: &mut fmt::Formatter<'_>, ids: &BTreeSet<PanelId>) -> fmt::Result {
    write!(f, "{{")?;
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", id)?;
    }
    write!(f, "}}")
}

impl fmt::Display for OrderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "candidate order does not match the device's panels")?;
        if !self.missing.is_empty() {
            write!(f, "; missing ")?;
            write_ids(f, &self.missing)?;
        }
        if !self.extra.is_empty() {
            write!(f, "; unknown ")?;
            write_ids(f, &self.extra)?;
        }
        if !self.duplicates.is_empty() {
            write!(f, "; duplicated ")?;
            write_ids(f, &self.duplicates)?;
        }
        Ok(())
    }
}

impl std::error::Error for OrderMismatch {}

fn parse_ids(s: &str) -> Result<std::vec::Vec<PanelId>, OrderError> {
    if s.trim().is_empty() {
        return Ok(std::vec::Vec::new());
    }
    s.split(',')
        .map(|token| {
            token
                .parse::<PanelId>()
                .map_err(|_| OrderError::InvalidId(token.trim().to_string()))
        })
        .collect()
}

/// Panel ids in confirmed left-to-right order.
///
/// Never holds the same id twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelOrder {
    ids: Vec<PanelId, MAX_PANELS>,
}

impl PanelOrder {
    /// Creates an empty order.
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Builds an order from ids, rejecting duplicates.
    pub fn from_ids<I>(ids: I) -> Result<Self, OrderError>
    where
        I: IntoIterator<Item = PanelId>,
    {
        let mut order = Self::new();
        for id in ids {
            if order.contains(id) {
                return Err(OrderError::Duplicate(id));
            }
            order
                .ids
                .push(id)
                .map_err(|_| OrderError::CapacityExceeded)?;
        }
        Ok(order)
    }

    /// Parses the comma-separated form written by [`PanelOrder::to_list`].
    pub fn parse(s: &str) -> Result<Self, OrderError> {
        Self::from_ids(parse_ids(s)?)
    }

    /// Comma-separated ids, left to right.
    pub fn to_list(&self) -> String {
        self.ids
            .iter()
            .map(PanelId::to_string)
            .collect::<std::vec::Vec<_>>()
            .join(",")
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[PanelId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = PanelId> + '_ {
        self.ids.iter().copied()
    }

    /// Checks `candidate` against this order's id set.
    ///
    /// Succeeds only when the candidate is a permutation of the stored ids,
    /// returning it as the new order.
    pub fn validate(&self, candidate: &CandidateOrder) -> Result<PanelOrder, OrderMismatch> {
        let stored: BTreeSet<PanelId> = self.iter().collect();
        let mut seen = BTreeSet::new();
        let mut mismatch = OrderMismatch::default();

        for &id in candidate.ids() {
            if !seen.insert(id) {
                mismatch.duplicates.insert(id);
            }
        }
        mismatch.missing = stored.difference(&seen).copied().collect();
        mismatch.extra = seen.difference(&stored).copied().collect();

        if !mismatch.is_empty() {
            return Err(mismatch);
        }

        // Same set and no duplicates, so neither error can occur here.
        PanelOrder::from_ids(candidate.ids().iter().copied()).map_err(|_| mismatch)
    }
}

impl fmt::Display for PanelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_list())
    }
}

/// Operator-proposed left-to-right order, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateOrder {
    ids: std::vec::Vec<PanelId>,
}

impl CandidateOrder {
    pub fn new(ids: std::vec::Vec<PanelId>) -> Self {
        Self { ids }
    }

    /// Parses a comma-separated list such as `"12,7,31"`.
    pub fn parse(s: &str) -> Result<Self, OrderError> {
        parse_ids(s).map(Self::new)
    }

    pub fn ids(&self) -> &[PanelId] {
        &self.ids
    }
}

impl From<&PanelOrder> for CandidateOrder {
    fn from(order: &PanelOrder) -> Self {
        Self::new(order.ids().to_vec())
    }
}

/// Sorts reported positions left to right, breaking ties bottom to top.
///
/// A starting point for calibration; the layout's x axis does not always
/// match how the array is hung.
pub fn left_to_right(positions: &[PanelPosition]) -> std::vec::Vec<PanelPosition> {
    let mut sorted = positions.to_vec();
    sorted.sort_by_key(|p| (p.x, p.y, p.panel));
    sorted
}
