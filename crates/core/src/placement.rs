use crate::calendar::{self, CalendarError};
use crate::conflict::{self, ConflictKind};
use crate::occupancy::Occupancy;
use crate::registry::Registry;
use thiserror::Error;
use tracing::{debug, info};
use types::{CourseId, Day, ScheduleConfig, SlotKey};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("unknown course {0}")]
    UnknownCourse(CourseId),
    #[error(transparent)]
    Conflict(#[from] ConflictKind),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Outcome of a successful placement: the ids now occupying the target cell
/// and every slot key the operation touched, for upstream invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub course_ids: Vec<CourseId>,
    pub affected: Vec<SlotKey>,
}

/// Places `course_id` at `(week, day, slot)` for every group sharing it.
///
/// All checks run before any mutation: a rejected placement leaves both the
/// registry and the occupancy map untouched.
pub fn place(
    registry: &mut Registry,
    occupancy: &mut Occupancy,
    config: &ScheduleConfig,
    course_id: &CourseId,
    week: u32,
    day: Day,
    slot: &str,
    copy: bool,
) -> Result<Placed, PlacementError> {
    calendar::week_range(config, week)?;

    let course = registry
        .get(course_id)
        .ok_or_else(|| PlacementError::UnknownCourse(course_id.clone()))?
        .clone();

    if let Err(conflict) = conflict::can_place(registry, occupancy, config, &course, week, day, slot)
    {
        debug!(course = %course.sub_label, %conflict, "placement rejected");
        return Err(conflict.into());
    }

    let groups = registry.groups_sharing(&course);
    let mut affected: Vec<SlotKey> = Vec::new();
    let mut placed_ids: Vec<CourseId> = Vec::new();

    if copy {
        let mut duplicate = course.clone();
        duplicate.id = CourseId::random();
        duplicate.shared_groups = Vec::new();
        let new_id = duplicate.id.clone();
        registry.insert(duplicate);

        for group in &groups {
            let key = SlotKey::new(
                course.semester.clone(),
                week,
                group.clone(),
                day,
                slot.to_string(),
            );
            occupancy.add(key.clone(), new_id.clone());
            affected.push(key);
        }
        placed_ids.push(new_id);
    } else {
        // The dragged course and every congruent sibling relocate together:
        // clear all of them from the week, then re-add one id per group,
        // preferring the sibling that belongs to that group.
        let mut family: Vec<(CourseId, types::GroupId)> =
            vec![(course.id.clone(), course.main_group.clone())];
        for similar in registry.similar_to(&course) {
            family.push((similar.id.clone(), similar.main_group.clone()));
        }

        for group in &groups {
            for (id, _) in &family {
                affected.extend(occupancy.remove_everywhere_in_week(
                    &course.semester,
                    week,
                    group,
                    id,
                ));
            }
            let id_for_group = family
                .iter()
                .find(|(_, main)| main == group)
                .map(|(id, _)| id.clone())
                .unwrap_or_else(|| course.id.clone());

            let key = SlotKey::new(
                course.semester.clone(),
                week,
                group.clone(),
                day,
                slot.to_string(),
            );
            occupancy.add(key.clone(), id_for_group.clone());
            affected.push(key);
            if !placed_ids.contains(&id_for_group) {
                placed_ids.push(id_for_group);
            }
        }
    }

    affected.dedup();
    info!(
        course = %course.sub_label,
        %day,
        slot,
        week,
        copy,
        groups = groups.len(),
        "placed"
    );
    Ok(Placed {
        course_ids: placed_ids,
        affected,
    })
}

/// Removes `id` from one slot, or from the entire occupancy map when no key
/// is given (combined-cell detach where the exact slot is ambiguous).
pub fn unassign(occupancy: &mut Occupancy, id: &CourseId, key: Option<&SlotKey>) -> Vec<SlotKey> {
    let touched = match key {
        Some(k) => {
            if occupancy.remove_from_slot(k, id) {
                vec![k.clone()]
            } else {
                Vec::new()
            }
        }
        None => occupancy.remove_everywhere(id),
    };
    if !touched.is_empty() {
        info!(%id, slots = touched.len(), "unassigned");
    }
    touched
}

/// Batch unassignment for a combined cell.
pub fn unassign_many(occupancy: &mut Occupancy, ids: &[CourseId]) -> Vec<SlotKey> {
    occupancy.batch_remove(ids)
}
