//! Acceptance filtering
//!
//! A fixed allow-list of id/mask entries applied to received frames before
//! they enter the RX queue. The table is built before the CAN task starts
//! and stays static for its lifetime; an empty table accepts everything.

use embedded_can::Id;
use heapless::Vec;

use crate::config::CFG_CAN_FILTER_MAX;
use crate::error::{Error, Result};

/// One id/mask acceptance entry.
///
/// Mask semantics follow hardware convention: a set mask bit is compared,
/// a clear bit is don't-care. Standard and extended identifiers never
/// match each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    id: Id,
    mask: u32,
}

impl Filter {
    /// Match one identifier exactly
    pub fn exact(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            mask: u32::MAX,
        }
    }

    /// Match any identifier equal to `id` under `mask`
    pub fn masked(id: impl Into<Id>, mask: u32) -> Self {
        Self { id: id.into(), mask }
    }

    fn matches(&self, id: &Id) -> bool {
        match (self.id, *id) {
            (Id::Standard(want), Id::Standard(got)) => {
                (u32::from(want.as_raw()) ^ u32::from(got.as_raw())) & self.mask == 0
            }
            (Id::Extended(want), Id::Extended(got)) => {
                (want.as_raw() ^ got.as_raw()) & self.mask == 0
            }
            _ => false,
        }
    }
}

/// Fixed allow-list of acceptance filters
pub struct FilterTable {
    entries: Vec<Filter, CFG_CAN_FILTER_MAX>,
}

impl FilterTable {
    /// Empty table: every identifier is accepted
    pub const fn accept_all() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add an entry; fails with [`Error::FilterTableFull`] at capacity
    pub fn add(&mut self, filter: Filter) -> Result<()> {
        self.entries
            .push(filter)
            .map_err(|_| Error::FilterTableFull)
    }

    /// Check an identifier against the allow-list
    pub fn matches(&self, id: &Id) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        self.entries.iter().any(|f| f.matches(id))
    }

    /// Number of configured entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table accepts everything
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FilterTable {
    fn default() -> Self {
        Self::accept_all()
    }
}

#[cfg(test)]
mod tests {
    use embedded_can::{ExtendedId, StandardId};

    use super::*;

    fn std_id(raw: u16) -> Id {
        Id::Standard(StandardId::new(raw).unwrap())
    }

    #[test]
    fn empty_table_accepts_all() {
        let table = FilterTable::accept_all();
        assert!(table.matches(&std_id(0x000)));
        assert!(table.matches(&std_id(0x7FF)));
    }

    #[test]
    fn exact_filter() {
        let mut table = FilterTable::accept_all();
        table.add(Filter::exact(StandardId::new(0x123).unwrap())).unwrap();

        assert!(table.matches(&std_id(0x123)));
        assert!(!table.matches(&std_id(0x124)));
    }

    #[test]
    fn masked_filter_ignores_dont_care_bits() {
        let mut table = FilterTable::accept_all();
        // Accept 0x100..=0x10F
        table
            .add(Filter::masked(StandardId::new(0x100).unwrap(), !0xF))
            .unwrap();

        assert!(table.matches(&std_id(0x100)));
        assert!(table.matches(&std_id(0x10F)));
        assert!(!table.matches(&std_id(0x110)));
    }

    #[test]
    fn standard_and_extended_do_not_cross_match() {
        let mut table = FilterTable::accept_all();
        table.add(Filter::exact(StandardId::new(0x123).unwrap())).unwrap();

        let ext = Id::Extended(ExtendedId::new(0x123).unwrap());
        assert!(!table.matches(&ext));
    }

    #[test]
    fn table_capacity() {
        let mut table = FilterTable::accept_all();
        for i in 0..CFG_CAN_FILTER_MAX {
            table
                .add(Filter::exact(StandardId::new(i as u16).unwrap()))
                .unwrap();
        }
        let overflow = Filter::exact(StandardId::new(0x700).unwrap());
        assert_eq!(table.add(overflow), Err(Error::FilterTableFull));
    }
}
