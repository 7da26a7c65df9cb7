use crate::calendar::{self, CalendarError, WeekRange};
use crate::catalog;
use crate::conflict;
use crate::occupancy::Occupancy;
use crate::placement::{self, Placed, PlacementError};
use crate::registry::{Registry, RegistryError};
use std::collections::HashSet;
use types::{
    CourseId, CourseInstance, Day, GroupId, ScheduleConfig, SemesterId, SlotKey, SubjectCatalog,
};

/// The engine with all of its collaborators injected: configuration and the
/// read-only subject catalog come in at construction, and the registry and
/// occupancy map are the only mutable state. One instance per session.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    pub config: ScheduleConfig,
    pub catalog: SubjectCatalog,
    pub registry: Registry,
    pub occupancy: Occupancy,
}

impl Engine {
    pub fn new(config: ScheduleConfig, catalog: SubjectCatalog) -> Self {
        Self {
            config,
            catalog,
            registry: Registry::new(),
            occupancy: Occupancy::new(),
        }
    }

    pub fn week_range(&self, week: u32) -> Result<WeekRange, CalendarError> {
        calendar::week_range(&self.config, week)
    }

    pub fn can_place(
        &self,
        course_id: &CourseId,
        week: u32,
        day: Day,
        slot: &str,
    ) -> Result<(), PlacementError> {
        let course = self
            .registry
            .get(course_id)
            .ok_or_else(|| PlacementError::UnknownCourse(course_id.clone()))?;
        conflict::can_place(
            &self.registry,
            &self.occupancy,
            &self.config,
            course,
            week,
            day,
            slot,
        )
        .map_err(Into::into)
    }

    pub fn place(
        &mut self,
        course_id: &CourseId,
        week: u32,
        day: Day,
        slot: &str,
        copy: bool,
    ) -> Result<Placed, PlacementError> {
        placement::place(
            &mut self.registry,
            &mut self.occupancy,
            &self.config,
            course_id,
            week,
            day,
            slot,
            copy,
        )
    }

    pub fn unassign(&mut self, course_id: &CourseId, key: Option<&SlotKey>) -> Vec<SlotKey> {
        placement::unassign(&mut self.occupancy, course_id, key)
    }

    pub fn unassign_many(&mut self, ids: &[CourseId]) -> Vec<SlotKey> {
        placement::unassign_many(&mut self.occupancy, ids)
    }

    pub fn conflicts_for(
        &self,
        semester: &SemesterId,
        week: u32,
        group: &GroupId,
    ) -> HashSet<CourseId> {
        conflict::conflicts_for(
            &self.registry,
            &self.occupancy,
            &self.config,
            semester,
            week,
            group,
        )
    }

    pub fn update_course(&mut self, course: CourseInstance) -> Result<(), RegistryError> {
        self.registry.update(course, &self.catalog)
    }

    /// Deletes a course and clears its occupancy everywhere. Orphan slot
    /// entries would be tolerated anyway, but there is no reason to leave
    /// them behind on an explicit delete.
    pub fn delete_course(&mut self, id: &CourseId) -> Option<CourseInstance> {
        let removed = self.registry.remove(id);
        if removed.is_some() {
            self.occupancy.remove_everywhere(id);
        }
        removed
    }

    /// Catalog expansion into the registry. Rows whose (subject, kind,
    /// group, semester) already exist are skipped, so re-running after a
    /// catalog edit only fills the gaps. Returns the number of rows added.
    pub fn expand_catalog(&mut self, semester: &SemesterId) -> usize {
        let generated = catalog::expand(&self.catalog, &self.config, semester);
        let mut added = 0;
        for row in generated {
            let exists = self.registry.iter().any(|c| {
                c.subject == row.subject
                    && c.kind == row.kind
                    && c.main_group == row.main_group
                    && c.semester == row.semester
            });
            if !exists {
                self.registry.insert(row);
                added += 1;
            }
        }
        added
    }
}
