use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Folds content-equal values onto one canonical instance.
///
/// The first value seen with a given content becomes canonical; every later
/// value with the same content is discarded in favor of the stored one, so
/// the duplicate dies as soon as the caller drops it. Entries are never
/// evicted: the table lives as long as the run, since the retained footprint
/// is the thing under study.
///
/// The table takes `&self` and guards its map internally, so producers may
/// share it across threads.
pub struct InternTable {
    table: Mutex<HashSet<Arc<str>>>,
}

impl InternTable {
    pub fn new() -> Self {
        InternTable {
            table: Mutex::new(HashSet::new()),
        }
    }

    /// Returns the canonical instance for the content of `value`, inserting
    /// `value` itself when the content is new.
    pub fn intern(&self, value: Arc<str>) -> Arc<str> {
        let mut table = self.table.lock().unwrap();

        match table.get(&*value) {
            Some(canonical) => Arc::clone(canonical),
            None => {
                table.insert(Arc::clone(&value));
                value
            }
        }
    }

    /// Number of distinct contents seen so far.
    pub fn len(&self) -> usize {
        self.table.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().unwrap().is_empty()
    }
}

impl Default for InternTable {
    fn default() -> Self {
        Self::new()
    }
}
