use crate::occupancy::Occupancy;
use crate::registry::Registry;
use std::collections::HashSet;
use thiserror::Error;
use types::{CourseId, CourseInstance, Day, GroupId, ScheduleConfig, SemesterId, SlotKey};

/// Placement rejection reasons, surfaced verbatim to the caller. These are
/// ordinary return values; a conflict never aborts the evaluator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    #[error("room {room} is already used in this slot")]
    Room { room: String },
    #[error("teacher {teacher} is already teaching in this slot")]
    Teacher { teacher: String },
    #[error("lecture {lecture} blocks all parallel activity for its group")]
    LectureExclusivity { lecture: String },
    #[error("sub-group {candidate} cannot run in parallel with {occupant}")]
    SubGroupPair { candidate: String, occupant: String },
}

/// `TD`/`TP` base and numeric suffix of a sub-group label, when it has one.
fn sub_group_parts(label: &str) -> Option<(&str, &str)> {
    let base = label.get(..2)?;
    if base != "TD" && base != "TP" {
        return None;
    }
    let digits = &label[2..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((base, digits))
}

/// Pairwise within-group rule. Precedence is fixed (room, teacher, lecture,
/// sub-group pairing): when several rules would fire at once, the first one
/// decides which rejection message the user sees.
pub fn pair_conflict(candidate: &CourseInstance, occupant: &CourseInstance) -> Option<ConflictKind> {
    if let Some(room) = candidate.room.common_token(&occupant.room) {
        return Some(ConflictKind::Room { room: room.into() });
    }
    if let Some(teacher) = candidate.teacher.common_token(&occupant.teacher) {
        return Some(ConflictKind::Teacher {
            teacher: teacher.into(),
        });
    }
    if candidate.id != occupant.id && (candidate.kind.is_lecture() || occupant.kind.is_lecture()) {
        let lecture = if candidate.kind.is_lecture() {
            &candidate.sub_label
        } else {
            &occupant.sub_label
        };
        return Some(ConflictKind::LectureExclusivity {
            lecture: lecture.clone(),
        });
    }
    if let (Some((_, suffix_a)), Some((_, suffix_b))) = (
        sub_group_parts(&candidate.sub_label),
        sub_group_parts(&occupant.sub_label),
    ) {
        // Same numeric suffix is illegal whether the base type differs
        // (paired TD/TP tracks) or matches (duplicate of one sub-group).
        if suffix_a == suffix_b {
            return Some(ConflictKind::SubGroupPair {
                candidate: candidate.sub_label.clone(),
                occupant: occupant.sub_label.clone(),
            });
        }
    }
    None
}

/// Cross-group rule: only resource collisions matter between groups, and a
/// congruent occupant is the same physical session, not a conflict.
fn cross_group_conflict(
    candidate: &CourseInstance,
    occupant: &CourseInstance,
) -> Option<ConflictKind> {
    if candidate.shared_class_with(occupant) {
        return None;
    }
    if let Some(room) = candidate.room.common_token(&occupant.room) {
        return Some(ConflictKind::Room { room: room.into() });
    }
    if let Some(teacher) = candidate.teacher.common_token(&occupant.teacher) {
        return Some(ConflictKind::Teacher {
            teacher: teacher.into(),
        });
    }
    None
}

/// Instant placement check for `course` at `(week, day, slot)`.
///
/// The candidate's own slots are skipped (re-placing in place is a no-op),
/// and occupancy ids that no longer resolve in the registry are treated as
/// already removed.
pub fn can_place(
    registry: &Registry,
    occupancy: &Occupancy,
    config: &ScheduleConfig,
    course: &CourseInstance,
    week: u32,
    day: Day,
    slot: &str,
) -> Result<(), ConflictKind> {
    let groups = registry.groups_sharing(course);

    for group in &groups {
        let key = SlotKey::new(
            course.semester.clone(),
            week,
            group.clone(),
            day,
            slot.to_string(),
        );
        let occupants = occupancy.get(&key);
        if occupants.contains(&course.id) {
            continue;
        }
        for other_id in occupants {
            let Some(other) = registry.get(other_id) else {
                continue;
            };
            // A congruent occupant is this group's copy of the same shared
            // session; re-dropping onto it is a no-op, not a collision.
            if other.congruent_to(course) {
                continue;
            }
            if let Some(conflict) = pair_conflict(course, other) {
                return Err(conflict);
            }
        }
    }

    for group in config.groups() {
        if groups.contains(&group) {
            continue;
        }
        let key = SlotKey::new(
            course.semester.clone(),
            week,
            group,
            day,
            slot.to_string(),
        );
        for other_id in occupancy.get(&key) {
            let Some(other) = registry.get(other_id) else {
                continue;
            };
            if let Some(conflict) = cross_group_conflict(course, other) {
                return Err(conflict);
            }
        }
    }

    Ok(())
}

/// Highlight rules for the week-wide scan: room, teacher and lecture
/// exclusivity. Advisory only, so it must tolerate any pre-existing state.
fn highlight_conflict(a: &CourseInstance, b: &CourseInstance) -> bool {
    a.room.intersects(&b.room)
        || a.teacher.intersects(&b.teacher)
        || (a.id != b.id && (a.kind.is_lecture() || b.kind.is_lecture()))
}

/// Set of course ids currently in conflict in one group's week, for UI
/// highlighting. Flags, never blocks: imported data that is already
/// inconsistent is reported rather than rejected.
pub fn conflicts_for(
    registry: &Registry,
    occupancy: &Occupancy,
    config: &ScheduleConfig,
    semester: &SemesterId,
    week: u32,
    group: &GroupId,
) -> HashSet<CourseId> {
    let mut flagged = HashSet::new();

    // Local pass: co-occupants of the same cell.
    for (_, ids) in occupancy.slots_in_week(semester, week, group) {
        for (i, id_a) in ids.iter().enumerate() {
            let Some(a) = registry.get(id_a) else {
                continue;
            };
            for id_b in &ids[i + 1..] {
                let Some(b) = registry.get(id_b) else {
                    continue;
                };
                if highlight_conflict(a, b) {
                    flagged.insert(id_a.clone());
                    flagged.insert(id_b.clone());
                }
            }
        }
    }

    // Global pass: the same (day, slot) cell in every other group's grid.
    // Only the current group's id is flagged; the other group's view will
    // flag its own side when it is rendered.
    for (key, ids) in occupancy.slots_in_week(semester, week, group) {
        for id_a in ids {
            let Some(a) = registry.get(id_a) else {
                continue;
            };
            for other_group in config.groups() {
                if &other_group == group {
                    continue;
                }
                for id_b in occupancy.get(&key.for_group(other_group.clone())) {
                    let Some(b) = registry.get(id_b) else {
                        continue;
                    };
                    if a.shared_class_with(b) {
                        continue;
                    }
                    if a.room.intersects(&b.room) || a.teacher.intersects(&b.teacher) {
                        flagged.insert(id_a.clone());
                    }
                }
            }
        }
    }

    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{CourseKind, SubjectCode, TokenList};

    fn sem() -> SemesterId {
        SemesterId("S1".into())
    }

    fn course(
        subject: &str,
        kind: CourseKind,
        group: &str,
        teacher: &str,
        room: &str,
    ) -> CourseInstance {
        CourseInstance::new(
            SubjectCode(subject.into()),
            subject,
            kind,
            GroupId(group.into()),
            TokenList(teacher.into()),
            TokenList(room.into()),
            sem(),
        )
    }

    fn key(week: u32, group: &str, day: Day, slot: &str) -> SlotKey {
        SlotKey::new(sem(), week, GroupId(group.into()), day, slot)
    }

    fn config() -> ScheduleConfig {
        ScheduleConfig {
            number_of_groups: 2,
            ..ScheduleConfig::default()
        }
    }

    #[test]
    fn paired_sub_groups_cannot_share_a_slot() {
        let td11 = course("MATH", CourseKind::Tutorial(1), "Groupe 1", "Diallo", "101");
        let tp11 = course("PHYS", CourseKind::Lab(1), "Groupe 1", "Traoré", "102");
        let tp12 = course("PHYS", CourseKind::Lab(2), "Groupe 1", "Traoré", "102");

        let mut occ = Occupancy::new();
        occ.add(key(1, "Groupe 1", Day::Lun, "08:00-09:30"), td11.id.clone());
        let reg = Registry::from_courses(vec![td11, tp11.clone(), tp12.clone()]);

        let rejected = can_place(&reg, &occ, &config(), &tp11, 1, Day::Lun, "08:00-09:30");
        assert!(matches!(rejected, Err(ConflictKind::SubGroupPair { .. })));

        // Different suffix is always legal, whatever the base type.
        assert_eq!(
            can_place(&reg, &occ, &config(), &tp12, 1, Day::Lun, "08:00-09:30"),
            Ok(())
        );
    }

    #[test]
    fn duplicate_sub_group_is_rejected_too() {
        let a = course("MATH", CourseKind::Tutorial(1), "Groupe 1", "Diallo", "101");
        let b = course("PHYS", CourseKind::Tutorial(1), "Groupe 1", "Traoré", "102");

        let mut occ = Occupancy::new();
        occ.add(key(1, "Groupe 1", Day::Lun, "08:00-09:30"), a.id.clone());
        let reg = Registry::from_courses(vec![a, b.clone()]);

        let rejected = can_place(&reg, &occ, &config(), &b, 1, Day::Lun, "08:00-09:30");
        assert!(matches!(rejected, Err(ConflictKind::SubGroupPair { .. })));
    }

    #[test]
    fn lecture_owns_the_whole_slot() {
        let cm = course("MATH", CourseKind::Lecture, "Groupe 1", "Moussa", "Amphi A");
        let td = course("PHYS", CourseKind::Tutorial(1), "Groupe 1", "Diallo", "101");

        let mut occ = Occupancy::new();
        occ.add(key(1, "Groupe 1", Day::Mar, "09:45-11:15"), cm.id.clone());
        let reg = Registry::from_courses(vec![cm, td.clone()]);

        let rejected = can_place(&reg, &occ, &config(), &td, 1, Day::Mar, "09:45-11:15");
        assert!(matches!(
            rejected,
            Err(ConflictKind::LectureExclusivity { .. })
        ));
    }

    #[test]
    fn room_fires_before_teacher_before_lecture() {
        // Same room, same teacher, occupant is a lecture: every rule would
        // fire, the room message must win.
        let cm = course("MATH", CourseKind::Lecture, "Groupe 1", "Moussa", "101");
        let td = course("PHYS", CourseKind::Tutorial(1), "Groupe 1", "Moussa", "101");

        let mut occ = Occupancy::new();
        occ.add(key(1, "Groupe 1", Day::Lun, "08:00-09:30"), cm.id.clone());
        let reg = Registry::from_courses(vec![cm.clone(), td.clone()]);

        assert_eq!(
            can_place(&reg, &occ, &config(), &td, 1, Day::Lun, "08:00-09:30"),
            Err(ConflictKind::Room { room: "101".into() })
        );

        // Same teacher, different rooms: teacher wins over lecture.
        let cm2 = course("MATH", CourseKind::Lecture, "Groupe 1", "Moussa", "Amphi A");
        let td2 = course("PHYS", CourseKind::Tutorial(1), "Groupe 1", "Moussa", "102");
        let mut occ2 = Occupancy::new();
        occ2.add(key(1, "Groupe 1", Day::Lun, "08:00-09:30"), cm2.id.clone());
        let reg2 = Registry::from_courses(vec![cm2, td2.clone()]);
        assert_eq!(
            can_place(&reg2, &occ2, &config(), &td2, 1, Day::Lun, "08:00-09:30"),
            Err(ConflictKind::Teacher {
                teacher: "Moussa".into()
            })
        );
    }

    #[test]
    fn cross_group_teacher_collision_is_rejected() {
        let cm = course("MATH", CourseKind::Lecture, "Groupe 1", "Moussa", "Amphi A");
        let other = course("PHYS", CourseKind::Tutorial(1), "Groupe 2", "Moussa", "102");

        let mut occ = Occupancy::new();
        occ.add(key(1, "Groupe 1", Day::Mar, "09:45-11:15"), cm.id.clone());
        let reg = Registry::from_courses(vec![cm, other.clone()]);

        assert_eq!(
            can_place(&reg, &occ, &config(), &other, 1, Day::Mar, "09:45-11:15"),
            Err(ConflictKind::Teacher {
                teacher: "Moussa".into()
            })
        );
    }

    #[test]
    fn congruent_cross_group_occupant_is_a_shared_class() {
        // Same subject, kind, teacher, room: the Groupe 2 copy of the same
        // lecture may sit in the same cell of Groupe 1's grid.
        let cm1 = course("MATH", CourseKind::Lecture, "Groupe 1", "Moussa", "Amphi A");
        let cm2 = course("MATH", CourseKind::Lecture, "Groupe 2", "Moussa", "Amphi A");

        let mut occ = Occupancy::new();
        occ.add(key(1, "Groupe 1", Day::Mar, "09:45-11:15"), cm1.id.clone());
        // Derivation makes them one shared lecture, so Groupe 1 belongs to
        // groups_sharing(cm2) and the pair is never even cross-checked.
        let reg = Registry::from_courses(vec![cm1.clone(), cm2.clone()]);
        assert_eq!(
            can_place(&reg, &occ, &config(), &cm2, 1, Day::Mar, "09:45-11:15"),
            Ok(())
        );

        // A different teacher still leaves subject, kind and room equal, so
        // the cross-group check treats it as the same shared class.
        let cm2b = course("MATH", CourseKind::Lecture, "Groupe 2", "Autre", "Amphi A");
        let reg2 = Registry::from_courses(vec![cm1.clone(), cm2b.clone()]);
        assert_eq!(
            can_place(&reg2, &occ, &config(), &cm2b, 1, Day::Mar, "09:45-11:15"),
            Ok(())
        );

        // A different subject in the same room is a real collision.
        let tp = course("PHYS", CourseKind::Lab(1), "Groupe 2", "Autre", "Amphi A");
        let reg3 = Registry::from_courses(vec![cm1, tp.clone()]);
        assert_eq!(
            can_place(&reg3, &occ, &config(), &tp, 1, Day::Mar, "09:45-11:15"),
            Err(ConflictKind::Room {
                room: "Amphi A".into()
            })
        );
    }

    #[test]
    fn replacing_a_course_on_its_own_slot_is_legal() {
        let td = course("MATH", CourseKind::Tutorial(1), "Groupe 1", "Diallo", "101");
        let mut occ = Occupancy::new();
        occ.add(key(1, "Groupe 1", Day::Lun, "08:00-09:30"), td.id.clone());
        let reg = Registry::from_courses(vec![td.clone()]);

        assert_eq!(
            can_place(&reg, &occ, &config(), &td, 1, Day::Lun, "08:00-09:30"),
            Ok(())
        );
    }

    #[test]
    fn dangling_occupants_are_ignored() {
        let td = course("MATH", CourseKind::Tutorial(1), "Groupe 1", "Diallo", "101");
        let mut occ = Occupancy::new();
        occ.add(
            key(1, "Groupe 1", Day::Lun, "08:00-09:30"),
            CourseId("deleted-long-ago".into()),
        );
        let reg = Registry::from_courses(vec![td.clone()]);

        assert_eq!(
            can_place(&reg, &occ, &config(), &td, 1, Day::Lun, "08:00-09:30"),
            Ok(())
        );
        assert!(conflicts_for(&reg, &occ, &config(), &sem(), 1, &GroupId("Groupe 1".into()))
            .is_empty());
    }

    #[test]
    fn week_scan_flags_both_local_offenders() {
        let a = course("MATH", CourseKind::Tutorial(1), "Groupe 1", "Diallo", "101");
        let b = course("PHYS", CourseKind::Tutorial(2), "Groupe 1", "Traoré", "101");

        let mut occ = Occupancy::new();
        let k = key(1, "Groupe 1", Day::Lun, "08:00-09:30");
        occ.add(k.clone(), a.id.clone());
        occ.add(k, b.id.clone());
        let reg = Registry::from_courses(vec![a.clone(), b.clone()]);

        let flagged = conflicts_for(&reg, &occ, &config(), &sem(), 1, &GroupId("Groupe 1".into()));
        assert!(flagged.contains(&a.id));
        assert!(flagged.contains(&b.id));
    }

    #[test]
    fn week_scan_flags_only_the_current_group_side_globally() {
        let a = course("MATH", CourseKind::Tutorial(1), "Groupe 1", "Moussa", "101");
        let b = course("PHYS", CourseKind::Tutorial(1), "Groupe 2", "Moussa", "102");

        let mut occ = Occupancy::new();
        occ.add(key(1, "Groupe 1", Day::Lun, "08:00-09:30"), a.id.clone());
        occ.add(key(1, "Groupe 2", Day::Lun, "08:00-09:30"), b.id.clone());
        let reg = Registry::from_courses(vec![a.clone(), b.clone()]);

        let flagged = conflicts_for(&reg, &occ, &config(), &sem(), 1, &GroupId("Groupe 1".into()));
        assert!(flagged.contains(&a.id));
        assert!(!flagged.contains(&b.id));

        let flagged2 = conflicts_for(&reg, &occ, &config(), &sem(), 1, &GroupId("Groupe 2".into()));
        assert!(flagged2.contains(&b.id));
        assert!(!flagged2.contains(&a.id));
    }
}
