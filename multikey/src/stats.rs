use metrics::{counter, describe_counter, describe_gauge, gauge};

const ADDED_ENTRIES: &str = "multikey_added_entries";
const UPDATED_ENTRIES: &str = "multikey_updated_entries";
const REMOVED_ENTRIES: &str = "multikey_removed_entries";
const REJECTED_WRITES: &str = "multikey_rejected_writes";
const CLEARED_ENTRIES: &str = "multikey_cleared_entries";
const STORED_ENTRIES: &str = "multikey_stored_entries";

/// Register descriptions for every collection metric.
/// Only needed once a recorder is installed.
pub fn init() {
    describe_counter!(ADDED_ENTRIES, "number of entries added");
    describe_counter!(UPDATED_ENTRIES, "number of entries whose value was replaced");
    describe_counter!(REMOVED_ENTRIES, "number of entries removed one by one");
    describe_counter!(REJECTED_WRITES, "number of add or set calls that changed nothing");
    describe_counter!(CLEARED_ENTRIES, "number of entries dropped by clear");
    describe_gauge!(STORED_ENTRIES, "number of entries after the last write");

    counter!(ADDED_ENTRIES).absolute(0);
    counter!(UPDATED_ENTRIES).absolute(0);
    counter!(REMOVED_ENTRIES).absolute(0);
    counter!(REJECTED_WRITES).absolute(0);
    counter!(CLEARED_ENTRIES).absolute(0);
}

pub(crate) fn inc_added(len: usize) {
    counter!(ADDED_ENTRIES).increment(1);
    gauge!(STORED_ENTRIES).set(len as f64);
}

pub(crate) fn inc_updated() {
    counter!(UPDATED_ENTRIES).increment(1);
}

pub(crate) fn inc_removed(len: usize) {
    counter!(REMOVED_ENTRIES).increment(1);
    gauge!(STORED_ENTRIES).set(len as f64);
}

pub(crate) fn inc_rejected() {
    counter!(REJECTED_WRITES).increment(1);
}

pub(crate) fn inc_cleared(dropped: usize) {
    counter!(CLEARED_ENTRIES).increment(dropped as u64);
    gauge!(STORED_ENTRIES).set(0.0);
}
