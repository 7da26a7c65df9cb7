use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use types::{CourseId, CourseInstance, GroupId, SemesterId, SubjectCatalog, SubjectCode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown course {0}")]
    UnknownCourse(CourseId),
}

/// Authoritative set of course instances, in stable insertion order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Registry {
    courses: Vec<CourseInstance>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_courses(courses: Vec<CourseInstance>) -> Self {
        Self { courses }
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseInstance> {
        self.courses.iter()
    }

    pub fn get(&self, id: &CourseId) -> Option<&CourseInstance> {
        self.courses.iter().find(|c| &c.id == id)
    }

    /// Inserts a new instance, or replaces the one with the same id.
    pub fn insert(&mut self, course: CourseInstance) {
        match self.courses.iter_mut().find(|c| c.id == course.id) {
            Some(slot) => *slot = course,
            None => self.courses.push(course),
        }
    }

    /// Replaces an existing instance. `sub_label` is re-derived so it can
    /// never drift from `kind`/`main_group`, and the denormalized subject
    /// label is refreshed from the catalog when the subject is known there.
    pub fn update(
        &mut self,
        mut course: CourseInstance,
        catalog: &SubjectCatalog,
    ) -> Result<(), RegistryError> {
        let slot = self
            .courses
            .iter_mut()
            .find(|c| c.id == course.id)
            .ok_or_else(|| RegistryError::UnknownCourse(course.id.clone()))?;
        course.refresh_sub_label();
        if let Some(info) = catalog.get(&course.subject) {
            course.subject_label = info.label.clone();
        }
        *slot = course;
        Ok(())
    }

    pub fn remove(&mut self, id: &CourseId) -> Option<CourseInstance> {
        let idx = self.courses.iter().position(|c| &c.id == id)?;
        Some(self.courses.remove(idx))
    }

    pub fn courses_for_group(
        &self,
        group: &GroupId,
        semester: &SemesterId,
    ) -> Vec<&CourseInstance> {
        self.courses
            .iter()
            .filter(|c| &c.main_group == group && &c.semester == semester)
            .collect()
    }

    /// All *other* instances congruent to `course` (same subject, kind,
    /// teacher, room and semester).
    pub fn similar_to(&self, course: &CourseInstance) -> Vec<&CourseInstance> {
        self.courses
            .iter()
            .filter(|c| c.id != course.id && c.congruent_to(course))
            .collect()
    }

    /// Groups that must be placed and removed in lock-step with `course`:
    /// the explicit `shared_groups` when set, otherwise the main groups of
    /// every congruent instance. The derivation is what turns "four
    /// congruent lecture rows" into one shared lecture.
    pub fn groups_sharing(&self, course: &CourseInstance) -> Vec<GroupId> {
        if !course.shared_groups.is_empty() {
            return course.shared_groups.clone();
        }
        let mut groups = vec![course.main_group.clone()];
        for similar in self.similar_to(course) {
            if !groups.contains(&similar.main_group) {
                groups.push(similar.main_group.clone());
            }
        }
        groups
    }

    /// Subjects with at least one instance whose teacher is still the
    /// placeholder, for the completeness report.
    pub fn subjects_missing_teacher(&self, semester: &SemesterId) -> BTreeSet<SubjectCode> {
        self.missing(semester, |c| c.teacher.is_unset())
    }

    pub fn subjects_missing_room(&self, semester: &SemesterId) -> BTreeSet<SubjectCode> {
        self.missing(semester, |c| c.room.is_unset())
    }

    fn missing(
        &self,
        semester: &SemesterId,
        pred: impl Fn(&CourseInstance) -> bool,
    ) -> BTreeSet<SubjectCode> {
        self.courses
            .iter()
            .filter(|c| &c.semester == semester && pred(c))
            .map(|c| c.subject.clone())
            .collect()
    }
}
