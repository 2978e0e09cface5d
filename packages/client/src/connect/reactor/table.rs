//! Watcher bookkeeping shared by the reactors
//!
//! A callback is moved out of its slot while it runs, so the table is never
//! borrowed across user code and callbacks can freely register or cancel.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{Callback, Readiness, WatcherId};

pub(crate) struct Watcher<K> {
    pub(crate) key: K,
    pub(crate) readiness: Readiness,
    callback: Option<Callback>,
}

pub(crate) struct WatcherTable<K> {
    next_id: u64,
    watchers: HashMap<WatcherId, Watcher<K>>,
}

impl<K: Copy> WatcherTable<K> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            watchers: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: K, readiness: Readiness, callback: Callback) -> WatcherId {
        let id = WatcherId::new(self.next_id);
        self.next_id += 1;
        self.watchers.insert(
            id,
            Watcher {
                key,
                readiness,
                callback: Some(callback),
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: WatcherId) -> Option<Watcher<K>> {
        self.watchers.remove(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.watchers.len()
    }

    pub(crate) fn ids(&self, readiness: Readiness) -> Vec<WatcherId> {
        let mut ids: Vec<WatcherId> = self
            .watchers
            .iter()
            .filter(|(_, watcher)| watcher.readiness == readiness)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Runs the callback of `id` if it is still registered.
///
/// Returns false if the watcher does not exist or is already running.
pub(crate) fn dispatch<K: Copy>(table: &RefCell<WatcherTable<K>>, id: WatcherId) -> bool {
    let callback = table
        .borrow_mut()
        .watchers
        .get_mut(&id)
        .and_then(|watcher| watcher.callback.take());

    let Some(mut callback) = callback else {
        return false;
    };

    callback();

    let mut table = table.borrow_mut();
    match table.watchers.get_mut(&id) {
        Some(watcher) => {
            watcher.callback = Some(callback);
            drop(table);
        }
        None => {
            // cancelled by its own callback
            drop(table);
            drop(callback);
        }
    }
    true
}
