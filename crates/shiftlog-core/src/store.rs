use std::fmt;

use chrono::NaiveDate;

use crate::record::ShiftRecord;
use crate::time::month_key;

/// Which collection a mutation touched. Hooks receive this so one
/// listener can serve both stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataChange {
    Records,
    Goals,
}

pub type ChangeHook = Box<dyn FnMut(DataChange) + Send>;

/// Ordered collection of derived shift records. Insertion order is
/// preserved and is the canonical submission order; records are never
/// sorted in place. There is no per-record delete: the only removal
/// path is a whole-set replacement via `replace_all`.
#[derive(Default)]
pub struct RecordStore {
    records: Vec<ShiftRecord>,
    hooks: Vec<ChangeHook>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a post-mutation hook, invoked after every `append` and
    /// `replace_all` once the new collection is fully in place.
    pub fn on_change(&mut self, hook: impl FnMut(DataChange) + Send + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn append(&mut self, record: ShiftRecord) {
        self.records.push(record);
        self.notify();
    }

    /// Bulk import: full replacement, no merge.
    pub fn replace_all(&mut self, records: Vec<ShiftRecord>) {
        self.records = records;
        self.notify();
    }

    /// All records whose date falls in the given `YYYY-MM` month,
    /// preserving store order.
    pub fn records_for_month(&self, month: &str) -> Vec<&ShiftRecord> {
        self.records
            .iter()
            .filter(|record| month_key(record.date) == month)
            .collect()
    }

    /// Exact date matches in store order. Detail views conventionally
    /// use only the first.
    pub fn records_for_date(&self, date: NaiveDate) -> Vec<&ShiftRecord> {
        self.records
            .iter()
            .filter(|record| record.date == date)
            .collect()
    }

    pub fn all(&self) -> &[ShiftRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn notify(&mut self) {
        for hook in &mut self.hooks {
            hook(DataChange::Records);
        }
    }
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("records", &self.records)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::record::{derive_record, tests::sample_input};

    fn record(date: &str, total_sales: u64) -> ShiftRecord {
        let mut input = sample_input(date, "18:00", "23:00");
        input.total_sales = total_sales;
        derive_record(input)
    }

    #[test]
    fn month_filter_matches_month_key_exactly() {
        let mut store = RecordStore::new();
        store.append(record("2024-03-05", 10_000));
        store.append(record("2024-04-01", 20_000));
        store.append(record("2024-03-20", 30_000));

        let march = store.records_for_month("2024-03");
        assert_eq!(march.len(), 2);
        assert!(march.iter().all(|r| month_key(r.date) == "2024-03"));
        // Store order is preserved by the filter.
        assert_eq!(march[0].total_sales, 10_000);
        assert_eq!(march[1].total_sales, 30_000);

        assert!(store.records_for_month("2024-05").is_empty());
    }

    #[test]
    fn date_filter_returns_all_matches_in_order() {
        let mut store = RecordStore::new();
        store.append(record("2024-03-05", 1_000));
        store.append(record("2024-03-05", 2_000));

        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let matches = store.records_for_date(date);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].total_sales, 1_000);
    }

    #[test]
    fn replace_all_swaps_the_whole_set() {
        let mut store = RecordStore::new();
        store.append(record("2024-03-05", 1_000));
        store.replace_all(vec![record("2024-06-01", 9_000)]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].total_sales, 9_000);
    }

    #[test]
    fn hooks_fire_after_every_mutation() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let mut store = RecordStore::new();
        store.on_change(move |change| {
            assert_eq!(change, DataChange::Records);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.append(record("2024-03-05", 1_000));
        store.replace_all(Vec::new());
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
