use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
            PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}
id_newtype!(CourseId);
id_newtype!(GroupId);
id_newtype!(SemesterId);
id_newtype!(SubjectCode);

impl CourseId {
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl GroupId {
    /// Trailing number of the group name ("Groupe 3" -> 3).
    pub fn number(&self) -> Option<u32> {
        let digits: String = self
            .0
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.chars().rev().collect::<String>().parse().ok()
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Serialize,
    Deserialize,
    ToSchema,
    JsonSchema,
    Eq,
    PartialEq,
    Hash,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Lun,
    Mar,
    Mer,
    Jeu,
    Ven,
    Sam,
}

impl Day {
    pub const ALL: [Day; 6] = [Day::Lun, Day::Mar, Day::Mer, Day::Jeu, Day::Ven, Day::Sam];

    pub fn label(&self) -> &'static str {
        match self {
            Day::Lun => "LUN",
            Day::Mar => "MAR",
            Day::Mer => "MER",
            Day::Jeu => "JEU",
            Day::Ven => "VEN",
            Day::Sam => "SAM",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Day {
    type Err = SlotKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LUN" => Ok(Day::Lun),
            "MAR" => Ok(Day::Mar),
            "MER" => Ok(Day::Mer),
            "JEU" => Ok(Day::Jeu),
            "VEN" => Ok(Day::Ven),
            "SAM" => Ok(Day::Sam),
            other => Err(SlotKeyError::BadDay(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CourseKind {
    Lecture,
    Tutorial(u8),
    Lab(u8),
}

impl CourseKind {
    pub fn base_label(&self) -> &'static str {
        match self {
            CourseKind::Lecture => "CM",
            CourseKind::Tutorial(_) => "TD",
            CourseKind::Lab(_) => "TP",
        }
    }

    pub fn track(&self) -> Option<u8> {
        match self {
            CourseKind::Lecture => None,
            CourseKind::Tutorial(t) | CourseKind::Lab(t) => Some(*t),
        }
    }

    pub fn is_lecture(&self) -> bool {
        matches!(self, CourseKind::Lecture)
    }
}

/// `/`-delimited teacher or room names. `"?"` and empty tokens are
/// placeholders and never participate in matching.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(transparent)]
pub struct TokenList(pub String);

impl TokenList {
    pub const PLACEHOLDER: &'static str = "?";

    pub fn unset() -> Self {
        Self(Self::PLACEHOLDER.to_string())
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = tokens
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if joined.is_empty() {
            Self::unset()
        } else {
            Self(joined.join("/"))
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0
            .split('/')
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != Self::PLACEHOLDER)
    }

    pub fn is_unset(&self) -> bool {
        self.tokens().next().is_none()
    }

    /// First token present in both lists, if any.
    pub fn common_token(&self, other: &TokenList) -> Option<&str> {
        self.tokens()
            .find(|t| other.tokens().any(|o| o.eq_ignore_ascii_case(t)))
    }

    pub fn intersects(&self, other: &TokenList) -> bool {
        self.common_token(other).is_some()
    }
}

impl fmt::Display for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
pub struct CourseInstance {
    pub id: CourseId,
    pub subject: SubjectCode,
    /// Denormalized display name; recomputed from the catalog on update.
    pub subject_label: String,
    pub kind: CourseKind,
    pub main_group: GroupId,
    #[serde(default)]
    pub shared_groups: Vec<GroupId>,
    pub sub_label: String,
    pub teacher: TokenList,
    pub room: TokenList,
    pub semester: SemesterId,
}

impl CourseInstance {
    pub fn new(
        subject: SubjectCode,
        subject_label: impl Into<String>,
        kind: CourseKind,
        main_group: GroupId,
        teacher: TokenList,
        room: TokenList,
        semester: SemesterId,
    ) -> Self {
        let sub_label = sub_label_for(kind, &main_group);
        Self {
            id: CourseId::random(),
            subject,
            subject_label: subject_label.into(),
            kind,
            main_group,
            shared_groups: Vec::new(),
            sub_label,
            teacher,
            room,
            semester,
        }
    }

    /// Re-derives `sub_label` from `kind` and `main_group`. Must be called
    /// whenever either of those fields changes.
    pub fn refresh_sub_label(&mut self) {
        self.sub_label = sub_label_for(self.kind, &self.main_group);
    }

    /// Same physical session taught to several groups at once: equal
    /// subject, kind, teacher, room and semester.
    pub fn congruent_to(&self, other: &CourseInstance) -> bool {
        self.subject == other.subject
            && self.kind == other.kind
            && self.teacher == other.teacher
            && self.room == other.room
            && self.semester == other.semester
    }

    /// Weaker cross-group test (subject, kind, room) used to recognize a
    /// shared class in another group's grid.
    pub fn shared_class_with(&self, other: &CourseInstance) -> bool {
        self.subject == other.subject && self.kind == other.kind && self.room == other.room
    }
}

/// `CM<g>`, `TD<g><t>` or `TP<g><t>` where `<g>` is the group number.
pub fn sub_label_for(kind: CourseKind, group: &GroupId) -> String {
    let g = group.number().unwrap_or(0);
    match kind.track() {
        None => format!("{}{}", kind.base_label(), g),
        Some(t) => format!("{}{}{}", kind.base_label(), g, t),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SlotKeyError {
    #[error("malformed slot key: {0}")]
    Malformed(String),
    #[error("malformed slot key: bad week number {0}")]
    BadWeek(String),
    #[error("malformed slot key: unknown day {0}")]
    BadDay(String),
}

/// One cell of one group's weekly grid.
#[derive(
    Clone,
    Debug,
    Serialize,
    Deserialize,
    ToSchema,
    JsonSchema,
    Eq,
    PartialEq,
    Hash,
    PartialOrd,
    Ord,
)]
pub struct SlotKey {
    pub semester: SemesterId,
    pub week: u32,
    pub group: GroupId,
    pub day: Day,
    pub slot: String,
}

impl SlotKey {
    pub fn new(
        semester: SemesterId,
        week: u32,
        group: GroupId,
        day: Day,
        slot: impl Into<String>,
    ) -> Self {
        Self {
            semester,
            week,
            group,
            day,
            slot: slot.into(),
        }
    }

    /// Same cell addressed in a different group's grid.
    pub fn for_group(&self, group: GroupId) -> Self {
        Self {
            group,
            ..self.clone()
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.semester, self.week, self.group, self.day, self.slot
        )
    }
}

impl FromStr for SlotKey {
    type Err = SlotKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('|').collect();
        if parts.len() != 5 {
            return Err(SlotKeyError::Malformed(s.to_string()));
        }
        let week: u32 = parts[1]
            .parse()
            .map_err(|_| SlotKeyError::BadWeek(parts[1].to_string()))?;
        Ok(SlotKey {
            semester: SemesterId(parts[0].to_string()),
            week,
            group: GroupId(parts[2].to_string()),
            day: parts[3].parse()?,
            slot: parts[4].to_string(),
        })
    }
}

/// Inclusive calendar date range.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduleConfig {
    pub start_date: NaiveDate,
    pub total_weeks: u32,
    pub number_of_groups: u32,
    pub sub_groups_per_group: u8,
    #[serde(default)]
    pub vacation_periods: Vec<DateRange>,
    pub time_slots: Vec<String>,
}

impl ScheduleConfig {
    /// Groups are always derived from `number_of_groups`; nothing is cached.
    pub fn groups(&self) -> Vec<GroupId> {
        (1..=self.number_of_groups)
            .map(|i| GroupId(format!("Groupe {i}")))
            .collect()
    }

    pub fn tracks(&self) -> impl Iterator<Item = u8> {
        1..=self.sub_groups_per_group
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date"),
            total_weeks: 14,
            number_of_groups: 4,
            sub_groups_per_group: 2,
            vacation_periods: Vec::new(),
            time_slots: vec![
                "08:00-09:30".into(),
                "09:45-11:15".into(),
                "11:30-13:00".into(),
                "13:30-15:00".into(),
                "15:15-16:45".into(),
            ],
        }
    }
}

/// Catalog entry owned by the subject CRUD side; the engine only reads it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SubjectInfo {
    pub label: String,
    #[serde(default)]
    pub credit: u32,
    #[serde(default)]
    pub lecture_teachers: TokenList,
    #[serde(default)]
    pub tutorial_teachers: TokenList,
}

pub type SubjectCatalog = std::collections::BTreeMap<SubjectCode, SubjectInfo>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_list_filters_placeholders() {
        let t = TokenList("Moussa/?/ Diallo ".into());
        let toks: Vec<&str> = t.tokens().collect();
        assert_eq!(toks, vec!["Moussa", "Diallo"]);
        assert!(!t.is_unset());
        assert!(TokenList::unset().is_unset());
        assert!(TokenList("  /?".into()).is_unset());
    }

    #[test]
    fn token_list_intersection() {
        let a = TokenList("101/102".into());
        let b = TokenList("103/102".into());
        assert_eq!(a.common_token(&b), Some("102"));
        assert!(!a.intersects(&TokenList("?".into())));
        assert!(!TokenList::unset().intersects(&TokenList::unset()));
    }

    #[test]
    fn sub_labels_follow_kind_and_group() {
        let g3 = GroupId("Groupe 3".into());
        assert_eq!(sub_label_for(CourseKind::Lecture, &g3), "CM3");
        assert_eq!(sub_label_for(CourseKind::Tutorial(1), &g3), "TD31");
        assert_eq!(sub_label_for(CourseKind::Lab(2), &g3), "TP32");
    }

    #[test]
    fn refresh_sub_label_tracks_mutations() {
        let mut c = CourseInstance::new(
            SubjectCode("MATH101".into()),
            "Analyse",
            CourseKind::Tutorial(1),
            GroupId("Groupe 1".into()),
            TokenList::unset(),
            TokenList::unset(),
            SemesterId("S1".into()),
        );
        assert_eq!(c.sub_label, "TD11");
        c.main_group = GroupId("Groupe 2".into());
        c.kind = CourseKind::Lab(1);
        c.refresh_sub_label();
        assert_eq!(c.sub_label, "TP21");
    }

    #[test]
    fn slot_key_round_trip() {
        let key = SlotKey::new(
            SemesterId("S1".into()),
            3,
            GroupId("Groupe 1".into()),
            Day::Lun,
            "08:00-09:30",
        );
        let s = key.to_string();
        assert_eq!(s, "S1|3|Groupe 1|LUN|08:00-09:30");
        assert_eq!(s.parse::<SlotKey>().unwrap(), key);
    }

    #[test]
    fn slot_key_rejects_garbage() {
        assert!("S1|x|Groupe 1|LUN|08:00".parse::<SlotKey>().is_err());
        assert!("S1|1|Groupe 1|XXX|08:00".parse::<SlotKey>().is_err());
        assert!("not a key".parse::<SlotKey>().is_err());
    }
}
