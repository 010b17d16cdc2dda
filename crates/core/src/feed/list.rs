// Live event list keyed by id
//
// Entries live in a map; `order` holds the display order. Every id appears in
// `order` exactly once.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::InsertOrdering;
use crate::event::LiveEvent;

#[derive(Debug, Clone, Default)]
pub struct EventList {
    ordering: InsertOrdering,
    entries: HashMap<Uuid, LiveEvent>,
    order: Vec<Uuid>,
}

impl EventList {
    pub fn new(ordering: InsertOrdering) -> Self {
        Self {
            ordering,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn ordering(&self) -> InsertOrdering {
        self.ordering
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<&LiveEvent> {
        self.entries.get(&id)
    }

    /// Replace the whole list with a fetched snapshot.
    ///
    /// The snapshot is expected ascending by start time; duplicates keep the
    /// last occurrence at the position of the first.
    pub fn load(&mut self, events: Vec<LiveEvent>) {
        self.entries.clear();
        self.order.clear();
        for event in events {
            if self.entries.insert(event.id, event.clone()).is_none() {
                self.order.push(event.id);
            }
        }
        if self.ordering == InsertOrdering::SortedByStart {
            self.resort();
        }
    }

    /// Add an event. An id already present is replaced in place.
    pub fn insert(&mut self, event: LiveEvent) {
        let id = event.id;
        if self.entries.insert(id, event).is_some() {
            if self.ordering == InsertOrdering::SortedByStart {
                self.resort();
            }
            return;
        }

        match self.ordering {
            InsertOrdering::Prepend => self.order.insert(0, id),
            InsertOrdering::SortedByStart => {
                let start = self.entries[&id].start_time;
                // After any entries with the same start time
                let pos = self
                    .order
                    .partition_point(|other| self.entries[other].start_time <= start);
                self.order.insert(pos, id);
            }
        }
    }

    /// Replace an existing event. Unknown ids are ignored.
    ///
    /// Returns whether anything changed.
    pub fn update(&mut self, event: LiveEvent) -> bool {
        let Some(slot) = self.entries.get_mut(&event.id) else {
            return false;
        };
        *slot = event;
        if self.ordering == InsertOrdering::SortedByStart {
            self.resort();
        }
        true
    }

    /// Remove by id; the rest keep their relative order
    pub fn delete(&mut self, id: Uuid) -> bool {
        if self.entries.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|other| *other != id);
        true
    }

    /// Drop events starting before `cutoff`. Returns how many were removed.
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, event| event.start_time >= cutoff);
        let entries = &self.entries;
        self.order.retain(|id| entries.contains_key(id));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LiveEvent> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Events in display order
    pub fn snapshot(&self) -> Vec<LiveEvent> {
        self.iter().cloned().collect()
    }

    fn resort(&mut self) {
        let entries = &self.entries;
        self.order
            .sort_by_key(|id| entries.get(id).map(|e| e.start_time));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(title: &str, hour: u32) -> LiveEvent {
        LiveEvent {
            id: Uuid::now_v7(),
            title: title.to_string(),
            description: None,
            start_time: Utc.with_ymd_and_hms(2030, 1, 1, hour, 0, 0).unwrap(),
            end_time: None,
            location: "Mumbai".to_string(),
            venue: None,
            price: None,
            image_url: None,
            featured: false,
            category: None,
        }
    }

    fn titles(list: &EventList) -> Vec<String> {
        list.iter().map(|e| e.title.clone()).collect()
    }

    #[test]
    fn test_prepend_puts_new_first() {
        let mut list = EventList::new(InsertOrdering::Prepend);
        list.load(vec![event("E1", 10), event("E2", 20)]);
        list.insert(event("E3", 5));
        assert_eq!(titles(&list), vec!["E3", "E1", "E2"]);

        list.insert(event("E4", 23));
        assert_eq!(titles(&list), vec!["E4", "E3", "E1", "E2"]);
    }

    #[test]
    fn test_sorted_insert_by_start() {
        let mut list = EventList::new(InsertOrdering::SortedByStart);
        list.load(vec![event("E1", 10), event("E2", 20)]);
        list.insert(event("E3", 15));
        assert_eq!(titles(&list), vec!["E1", "E3", "E2"]);

        list.insert(event("E0", 1));
        assert_eq!(titles(&list), vec!["E0", "E1", "E3", "E2"]);
    }

    #[test]
    fn test_insert_existing_id_replaces() {
        let mut list = EventList::new(InsertOrdering::Prepend);
        let e1 = event("E1", 10);
        list.load(vec![e1.clone(), event("E2", 20)]);

        let mut renamed = e1;
        renamed.title = "E1 renamed".to_string();
        list.insert(renamed);
        assert_eq!(list.len(), 2);
        assert_eq!(titles(&list), vec!["E1 renamed", "E2"]);
    }

    #[test]
    fn test_update_unknown_id_is_ignored() {
        let mut list = EventList::new(InsertOrdering::SortedByStart);
        list.load(vec![event("E1", 10), event("E2", 20)]);
        let before = list.snapshot();
        assert!(!list.update(event("ghost", 12)));
        assert_eq!(list.snapshot(), before);
    }

    #[test]
    fn test_update_resorts_when_sorted() {
        let mut list = EventList::new(InsertOrdering::SortedByStart);
        let e1 = event("E1", 10);
        list.load(vec![e1.clone(), event("E2", 20)]);

        let mut moved = e1;
        moved.start_time = Utc.with_ymd_and_hms(2030, 1, 1, 22, 0, 0).unwrap();
        assert!(list.update(moved));
        assert_eq!(titles(&list), vec!["E2", "E1"]);
    }

    #[test]
    fn test_update_keeps_position_in_prepend_mode() {
        let mut list = EventList::new(InsertOrdering::Prepend);
        let e1 = event("E1", 10);
        list.load(vec![e1.clone(), event("E2", 20)]);

        let mut moved = e1;
        moved.start_time = Utc.with_ymd_and_hms(2030, 1, 1, 22, 0, 0).unwrap();
        list.update(moved);
        assert_eq!(titles(&list), vec!["E1", "E2"]);
    }

    #[test]
    fn test_delete_keeps_relative_order() {
        let mut list = EventList::new(InsertOrdering::Prepend);
        let e2 = event("E2", 20);
        list.load(vec![event("E1", 10), e2.clone(), event("E3", 30)]);

        assert!(list.delete(e2.id));
        assert_eq!(titles(&list), vec!["E1", "E3"]);
        assert!(!list.delete(e2.id));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_prune_before_keeps_order_of_rest() {
        let mut list = EventList::new(InsertOrdering::Prepend);
        list.load(vec![event("E1", 10), event("E2", 20)]);
        list.insert(event("E0", 5));
        list.insert(event("E3", 15));

        let cutoff = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(list.prune_before(cutoff), 2);
        assert_eq!(titles(&list), vec!["E3", "E2"]);
        assert_eq!(list.prune_before(cutoff), 0);
    }

    #[test]
    fn test_load_deduplicates() {
        let mut list = EventList::new(InsertOrdering::Prepend);
        let e1 = event("E1", 10);
        list.load(vec![e1.clone(), event("E2", 20), e1]);
        assert_eq!(list.len(), 2);
    }
}
