pub use crate::domain::entry::{Entry, NO_CARD};
pub use crate::domain::ranking::RankingMap;
pub use crate::domain::rules::{
    ClassSplitRule, RankingKind, SplitMethod, StartOrderMethod, StartOrderRule,
};
pub use crate::domain::schedule::{
    AdjacentClubPair, ClassAssignment, ClassOrderWarning, LaneAssignment, StartTimeRecord,
};
pub use crate::domain::snapshot::{
    SnapshotStatus, SnapshotStore, SnapshotVersion, StartlistSnapshot, StoredStartTime,
};
pub use uuid::Uuid;
