//! Ordered task table.
//!
//! Records live in a generation-tagged arena. Timer jobs refer to tasks by
//! [`TaskSlot`], so a job that outlives its task (or whose slot was recycled
//! for a new task) resolves to nothing instead of the wrong record.

use std::collections::HashMap;

use super::model::TaskRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskSlot {
    index: u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    record: Option<TaskRecord>,
}

#[derive(Debug, Default)]
pub struct TaskTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_id: HashMap<String, TaskSlot>,
    /// Front is newest.
    order: Vec<TaskSlot>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert at the front of the ordering.
    ///
    /// The caller guarantees the identifier is not already live; an existing
    /// entry under the same identifier is evicted first.
    pub fn insert_front(&mut self, record: TaskRecord) -> TaskSlot {
        let identifier = record.item.identifier.clone();
        if let Some(existing) = self.by_id.get(&identifier).copied() {
            self.remove(existing);
        }
        let slot = match self.free.pop() {
            Some(index) => {
                let entry = &mut self.slots[index as usize];
                entry.record = Some(record);
                TaskSlot {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                TaskSlot {
                    index,
                    generation: 0,
                }
            }
        };
        self.by_id.insert(identifier, slot);
        self.order.insert(0, slot);
        slot
    }

    pub fn find(&self, identifier: &str) -> Option<TaskSlot> {
        self.by_id.get(identifier).copied()
    }

    pub fn get(&self, slot: TaskSlot) -> Option<&TaskRecord> {
        let entry = self.slots.get(slot.index as usize)?;
        if entry.generation != slot.generation {
            return None;
        }
        entry.record.as_ref()
    }

    pub fn get_mut(&mut self, slot: TaskSlot) -> Option<&mut TaskRecord> {
        let entry = self.slots.get_mut(slot.index as usize)?;
        if entry.generation != slot.generation {
            return None;
        }
        entry.record.as_mut()
    }

    /// Take a record out; its slot's generation moves on.
    pub fn remove(&mut self, slot: TaskSlot) -> Option<TaskRecord> {
        let entry = self.slots.get_mut(slot.index as usize)?;
        if entry.generation != slot.generation {
            return None;
        }
        let record = entry.record.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(slot.index);
        self.by_id.remove(&record.item.identifier);
        self.order.retain(|s| *s != slot);
        Some(record)
    }

    /// Slots in display order, copied so the caller can mutate while walking.
    pub fn slots(&self) -> Vec<TaskSlot> {
        self.order.clone()
    }

    /// Records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> + '_ {
        self.order.iter().filter_map(|slot| self.get(*slot))
    }

    /// Remove everything, returning records in display order.
    pub fn drain(&mut self) -> Vec<TaskRecord> {
        let order = std::mem::take(&mut self.order);
        let mut records = Vec::with_capacity(order.len());
        for slot in order {
            let entry = &mut self.slots[slot.index as usize];
            if entry.generation != slot.generation {
                continue;
            }
            if let Some(record) = entry.record.take() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(slot.index);
                records.push(record);
            }
        }
        self.by_id.clear();
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::model::TaskItem;

    fn record(id: &str) -> TaskRecord {
        TaskRecord::new(TaskItem::new_switch(id, id, true, 500, 0))
    }

    fn ids(table: &TaskTable) -> Vec<String> {
        table.iter().map(|r| r.item.identifier.clone()).collect()
    }

    #[test]
    fn inserts_newest_first() {
        let mut table = TaskTable::new();
        table.insert_front(record("a"));
        table.insert_front(record("b"));
        table.insert_front(record("c"));
        assert_eq!(ids(&table), vec!["c", "b", "a"]);
        assert!(table.find("b").is_some());
    }

    #[test]
    fn stale_slot_does_not_resolve_after_reuse() {
        let mut table = TaskTable::new();
        let old = table.insert_front(record("a"));
        assert!(table.remove(old).is_some());
        let new = table.insert_front(record("b"));
        assert!(table.get(old).is_none());
        assert!(table.remove(old).is_none());
        assert_eq!(table.get(new).unwrap().item.identifier, "b");
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let mut table = TaskTable::new();
        table.insert_front(record("a"));
        let b = table.insert_front(record("b"));
        table.insert_front(record("c"));
        table.remove(b);
        assert_eq!(ids(&table), vec!["c", "a"]);
        assert!(table.find("b").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_identifier_replaces_entry() {
        let mut table = TaskTable::new();
        let first = table.insert_front(record("a"));
        table.insert_front(record("a"));
        assert_eq!(table.len(), 1);
        assert!(table.get(first).is_none());
    }

    #[test]
    fn drain_empties_table_in_order() {
        let mut table = TaskTable::new();
        let a = table.insert_front(record("a"));
        table.insert_front(record("b"));
        let drained: Vec<_> = table.drain().into_iter().map(|r| r.item.identifier).collect();
        assert_eq!(drained, vec!["b", "a"]);
        assert!(table.is_empty());
        assert!(table.find("a").is_none());
        assert!(table.get(a).is_none());
    }
}
