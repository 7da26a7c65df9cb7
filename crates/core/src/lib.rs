pub mod calendar;
pub mod catalog;
pub mod conflict;
pub mod engine;
pub mod occupancy;
pub mod placement;
pub mod registry;

pub use calendar::{week_range, CalendarError, WeekRange};
pub use conflict::{can_place, conflicts_for, pair_conflict, ConflictKind};
pub use engine::Engine;
pub use occupancy::Occupancy;
pub use placement::{place, unassign, unassign_many, Placed, PlacementError};
pub use registry::{Registry, RegistryError};

pub use types::{
    CourseId, CourseInstance, CourseKind, DateRange, Day, GroupId, ScheduleConfig, SemesterId,
    SlotKey, SubjectCatalog, SubjectCode, SubjectInfo, TokenList,
};
