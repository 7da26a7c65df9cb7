use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::collections::BTreeMap;
use types::{CourseId, GroupId, SemesterId, SlotKey};

/// Slot occupancy map: one cell holds zero or more course instance ids, in
/// insertion order. An absent entry and an empty sequence both mean
/// "unoccupied"; empty sequences are pruned on removal so the two never
/// diverge observably.
#[serde_as]
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Occupancy {
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")]
    slots: BTreeMap<SlotKey, Vec<CourseId>>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SlotKey) -> &[CourseId] {
        self.slots.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_occupied(&self, key: &SlotKey) -> bool {
        !self.get(key).is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&SlotKey, &[CourseId])> {
        self.slots.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Idempotent insert: a no-op when `id` already occupies the slot.
    pub fn add(&mut self, key: SlotKey, id: CourseId) -> bool {
        let ids = self.slots.entry(key).or_default();
        if ids.contains(&id) {
            return false;
        }
        ids.push(id);
        true
    }

    /// Removes `id` from one slot; a no-op when absent.
    pub fn remove_from_slot(&mut self, key: &SlotKey, id: &CourseId) -> bool {
        let Some(ids) = self.slots.get_mut(key) else {
            return false;
        };
        let before = ids.len();
        ids.retain(|x| x != id);
        let removed = ids.len() != before;
        if ids.is_empty() {
            self.slots.remove(key);
        }
        removed
    }

    /// Removes `id` from every slot of one group's week. Returns the keys it
    /// was actually removed from.
    pub fn remove_everywhere_in_week(
        &mut self,
        semester: &SemesterId,
        week: u32,
        group: &GroupId,
        id: &CourseId,
    ) -> Vec<SlotKey> {
        let keys: Vec<SlotKey> = self
            .slots
            .iter()
            .filter(|(k, ids)| {
                &k.semester == semester && k.week == week && &k.group == group && ids.contains(id)
            })
            .map(|(k, _)| k.clone())
            .collect();
        for k in &keys {
            self.remove_from_slot(k, id);
        }
        keys
    }

    /// Removes `id` from the whole map (legacy global clear).
    pub fn remove_everywhere(&mut self, id: &CourseId) -> Vec<SlotKey> {
        let keys: Vec<SlotKey> = self
            .slots
            .iter()
            .filter(|(_, ids)| ids.contains(id))
            .map(|(k, _)| k.clone())
            .collect();
        for k in &keys {
            self.remove_from_slot(k, id);
        }
        keys
    }

    /// Combined-cell unassignment: removes every listed id from every slot.
    pub fn batch_remove(&mut self, ids: &[CourseId]) -> Vec<SlotKey> {
        let mut touched = Vec::new();
        for id in ids {
            for k in self.remove_everywhere(id) {
                if !touched.contains(&k) {
                    touched.push(k);
                }
            }
        }
        touched
    }

    pub fn slots_in_week<'a>(
        &'a self,
        semester: &'a SemesterId,
        week: u32,
        group: &'a GroupId,
    ) -> impl Iterator<Item = (&'a SlotKey, &'a [CourseId])> {
        self.slots
            .iter()
            .filter(move |(k, _)| &k.semester == semester && k.week == week && &k.group == group)
            .map(|(k, v)| (k, v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use types::Day;

    fn key(week: u32, group: &str, day: Day, slot: &str) -> SlotKey {
        SlotKey::new(
            SemesterId("S1".into()),
            week,
            GroupId(group.into()),
            day,
            slot,
        )
    }

    fn id(s: &str) -> CourseId {
        CourseId(s.into())
    }

    #[test]
    fn add_is_idempotent() {
        let mut occ = Occupancy::new();
        let k = key(1, "Groupe 1", Day::Lun, "08:00-09:30");
        assert!(occ.add(k.clone(), id("a")));
        assert!(!occ.add(k.clone(), id("a")));
        assert_eq!(occ.get(&k), &[id("a")]);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut occ = Occupancy::new();
        let k = key(1, "Groupe 1", Day::Lun, "08:00-09:30");
        occ.add(k.clone(), id("a"));
        occ.add(k.clone(), id("b"));
        occ.add(k.clone(), id("a"));
        assert_eq!(occ.get(&k), &[id("a"), id("b")]);
    }

    #[test]
    fn removing_last_id_frees_the_slot() {
        let mut occ = Occupancy::new();
        let k = key(1, "Groupe 1", Day::Lun, "08:00-09:30");
        occ.add(k.clone(), id("a"));
        assert!(occ.remove_from_slot(&k, &id("a")));
        assert!(!occ.is_occupied(&k));
        assert_eq!(occ, Occupancy::new());
    }

    #[test]
    fn remove_of_absent_id_is_a_noop() {
        let mut occ = Occupancy::new();
        let k = key(1, "Groupe 1", Day::Lun, "08:00-09:30");
        occ.add(k.clone(), id("a"));
        let before = occ.clone();
        assert!(!occ.remove_from_slot(&k, &id("zz")));
        assert_eq!(occ, before);
    }

    #[test]
    fn remove_everywhere_in_week_stays_inside_the_prefix() {
        let mut occ = Occupancy::new();
        occ.add(key(1, "Groupe 1", Day::Lun, "08:00-09:30"), id("a"));
        occ.add(key(1, "Groupe 1", Day::Mar, "09:45-11:15"), id("a"));
        occ.add(key(2, "Groupe 1", Day::Lun, "08:00-09:30"), id("a"));
        occ.add(key(1, "Groupe 2", Day::Lun, "08:00-09:30"), id("a"));

        let sem = SemesterId("S1".into());
        let touched =
            occ.remove_everywhere_in_week(&sem, 1, &GroupId("Groupe 1".into()), &id("a"));
        assert_eq!(touched.len(), 2);
        assert!(occ.is_occupied(&key(2, "Groupe 1", Day::Lun, "08:00-09:30")));
        assert!(occ.is_occupied(&key(1, "Groupe 2", Day::Lun, "08:00-09:30")));
    }

    #[test]
    fn batch_remove_clears_combined_cells() {
        let mut occ = Occupancy::new();
        let k = key(1, "Groupe 1", Day::Lun, "08:00-09:30");
        occ.add(k.clone(), id("td"));
        occ.add(k.clone(), id("tp"));
        occ.add(key(1, "Groupe 1", Day::Mar, "08:00-09:30"), id("td"));

        let touched = occ.batch_remove(&[id("td"), id("tp")]);
        assert_eq!(touched.len(), 2);
        assert_eq!(occ, Occupancy::new());
    }

    #[test]
    fn serde_round_trip_uses_string_keys() {
        let mut occ = Occupancy::new();
        occ.add(key(3, "Groupe 1", Day::Lun, "08:00-09:30"), id("a"));
        let json = serde_json::to_string(&occ).unwrap();
        assert!(json.contains("S1|3|Groupe 1|LUN|08:00-09:30"));
        let back: Occupancy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, occ);
    }

    proptest! {
        #[test]
        fn add_twice_equals_add_once(ids in proptest::collection::vec("[a-z]{1,4}", 1..8)) {
            let k = key(1, "Groupe 1", Day::Lun, "08:00-09:30");
            let mut once = Occupancy::new();
            let mut twice = Occupancy::new();
            for i in &ids {
                once.add(k.clone(), id(i));
                twice.add(k.clone(), id(i));
                twice.add(k.clone(), id(i));
            }
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn remove_undoes_add(ids in proptest::collection::vec("[a-z]{1,4}", 1..8)) {
            let k = key(1, "Groupe 1", Day::Lun, "08:00-09:30");
            let mut occ = Occupancy::new();
            for i in &ids {
                occ.add(k.clone(), id(i));
            }
            for i in &ids {
                occ.remove_from_slot(&k, &id(i));
            }
            prop_assert_eq!(occ, Occupancy::new());
        }
    }
}
