use types::{CourseInstance, CourseKind, ScheduleConfig, SemesterId, SubjectCatalog, TokenList};

/// Expands the subject catalog into course instances: per subject per group,
/// one lecture plus one tutorial and one lab per sub-group track. Teachers
/// are defaulted from the catalog entry; rooms start as placeholders.
pub fn expand(
    catalog: &SubjectCatalog,
    config: &ScheduleConfig,
    semester: &SemesterId,
) -> Vec<CourseInstance> {
    let mut out = Vec::new();
    for (code, info) in catalog {
        for group in config.groups() {
            out.push(CourseInstance::new(
                code.clone(),
                info.label.clone(),
                CourseKind::Lecture,
                group.clone(),
                info.lecture_teachers.clone(),
                TokenList::unset(),
                semester.clone(),
            ));
            for track in config.tracks() {
                out.push(CourseInstance::new(
                    code.clone(),
                    info.label.clone(),
                    CourseKind::Tutorial(track),
                    group.clone(),
                    info.tutorial_teachers.clone(),
                    TokenList::unset(),
                    semester.clone(),
                ));
                out.push(CourseInstance::new(
                    code.clone(),
                    info.label.clone(),
                    CourseKind::Lab(track),
                    group.clone(),
                    info.tutorial_teachers.clone(),
                    TokenList::unset(),
                    semester.clone(),
                ));
            }
        }
    }
    out
}
