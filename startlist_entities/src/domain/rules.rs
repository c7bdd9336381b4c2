use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub enum SplitMethod {
    Random,
    Balanced,
}

/// Request to divide an oversized class into `part_count` sub-classes.
/// Rules with `part_count < 2` are ignored by the splitter.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct ClassSplitRule {
    pub base_class_id: String,
    pub part_count: u32,
    pub method: SplitMethod,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub enum StartOrderMethod {
    Random,
    WorldRanking,
    JapanRanking,
}

impl StartOrderMethod {
    pub fn ranking_kind(&self) -> Option<RankingKind> {
        match self {
            StartOrderMethod::Random => None,
            StartOrderMethod::WorldRanking => Some(RankingKind::World),
            StartOrderMethod::JapanRanking => Some(RankingKind::Japan),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
pub enum RankingKind {
    World,
    Japan,
}

impl RankingKind {
    pub fn tag(&self) -> &'static str {
        match self {
            RankingKind::World => "world",
            RankingKind::Japan => "japan",
        }
    }
}

/// Per-class start order selection. `data_source` names the loaded ranking
/// data set backing a ranking method; generation must not run for a class
/// whose method needs ranking data while this is empty.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct StartOrderRule {
    pub class_id: String,
    pub method: StartOrderMethod,
    pub data_source: Option<String>,
}

impl StartOrderRule {
    pub fn has_data_source(&self) -> bool {
        self.data_source
            .as_ref()
            .map(|source| !source.trim().is_empty())
            .unwrap_or(false)
    }
}
