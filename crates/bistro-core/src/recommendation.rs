//! # Table Allocation
//!
//! Advisory suggestion of where to seat the next party, balancing wear
//! across tables by historical usage. Nothing is reserved or locked.
//!
//! ## Algorithm
//! ```text
//! candidates = LIBRE tables, stable-sorted by usage ascending
//! free_ratio = |LIBRE| / |all|
//!
//! free_ratio > threshold && |candidates| >= slots
//!     → (slots - 1) lowest as BAJO_USO
//!       + middle of the rest (floor(len / 2)) as ROTACION_MEDIA
//! otherwise
//!     → `slots` lowest as BAJO_USO (fewer if fewer are free)
//! ```
//!
//! The mixed pick keeps a nearly empty room from always being steered to
//! the same dead corner.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum RecommendationReason {
    /// Among the least used tables.
    BajoUso,
    /// Medium rotation pick mixed in when the room is nearly empty.
    RotacionMedia,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Recommendation {
    pub table_id: String,
    pub reason: RecommendationReason,
    pub usage_count: u32,
}

/// Historical performance of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TablePerformance {
    pub table_id: String,
    pub revenue: Money,
    pub occupancy_count: u32,
}

/// Occupancy count per table id. Tables without history count as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageHistory {
    counts: HashMap<String, u32>,
}

impl UsageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_performance(performance: &[TablePerformance]) -> Self {
        let mut history = Self::new();
        for p in performance {
            history.record(&p.table_id, p.occupancy_count);
        }
        history
    }

    /// Adds `count` sessions to a table.
    pub fn record(&mut self, table_id: &str, count: u32) {
        let entry = self.counts.entry(table_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    pub fn usage_of(&self, table_id: &str) -> u32 {
        self.counts.get(table_id).copied().unwrap_or(0)
    }
}

/// Tuning knobs for [`recommend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationParams {
    /// Above this share of free tables the medium-rotation rule kicks in.
    pub free_ratio_threshold: f64,
    /// How many suggestions to return at most.
    pub slots: usize,
}

impl Default for AllocationParams {
    fn default() -> Self {
        Self {
            free_ratio_threshold: 0.8,
            slots: 3,
        }
    }
}

/// Ranks free tables for the next party.
///
/// `tables` is the whole floor in board order; ties in usage keep that order.
pub fn recommend(
    tables: &[Table],
    history: &UsageHistory,
    params: AllocationParams,
) -> Vec<Recommendation> {
    if tables.is_empty() || params.slots == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<(&str, u32)> = tables
        .iter()
        .filter(|t| t.is_free())
        .map(|t| (t.id(), history.usage_of(t.id())))
        .collect();
    // sort_by_key is stable
    candidates.sort_by_key(|(_, usage)| *usage);

    let free_ratio = candidates.len() as f64 / tables.len() as f64;

    let pick = |(id, usage): (&str, u32), reason| Recommendation {
        table_id: id.to_string(),
        reason,
        usage_count: usage,
    };

    if free_ratio > params.free_ratio_threshold && candidates.len() >= params.slots {
        let low = params.slots - 1;
        let remaining = &candidates[low..];
        let middle = remaining[remaining.len() / 2];

        let mut out: Vec<Recommendation> = candidates[..low]
            .iter()
            .map(|c| pick(*c, RecommendationReason::BajoUso))
            .collect();
        out.push(pick(middle, RecommendationReason::RotacionMedia));
        return out;
    }

    candidates
        .into_iter()
        .take(params.slots)
        .map(|c| pick(c, RecommendationReason::BajoUso))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::transition;
    use chrono::Utc;

    fn floor(count: u32) -> Vec<Table> {
        (1..=count).map(|i| Table::new(i.to_string())).collect()
    }

    fn occupy(table: &mut Table) {
        transition::scan(table, Utc::now());
    }

    #[test]
    fn test_nearly_empty_room_mixes_medium_rotation() {
        // 10 free of 12 → ratio 0.833
        let mut tables = floor(12);
        occupy(&mut tables[3]); // "4"
        occupy(&mut tables[6]); // "7"
        let history = UsageHistory::from_performance(&seed::demo_history());

        let picks = recommend(&tables, &history, AllocationParams::default());

        // Free by usage: 12(2) 11(5) 10(8) 8(10) 5(12) 2(15) 6(18) 3(22) 9(40) 1(65)
        assert_eq!(picks.len(), 3);
        assert_eq!(picks[0].table_id, "12");
        assert_eq!(picks[0].reason, RecommendationReason::BajoUso);
        assert_eq!(picks[1].table_id, "11");
        assert_eq!(picks[1].reason, RecommendationReason::BajoUso);
        // remaining 8 → index 4 → table 6
        assert_eq!(picks[2].table_id, "6");
        assert_eq!(picks[2].reason, RecommendationReason::RotacionMedia);
        assert_eq!(picks[2].usage_count, 18);
    }

    #[test]
    fn test_busy_room_takes_lowest_usage() {
        let mut tables = floor(12);
        for t in tables.iter_mut().take(6) {
            occupy(t);
        }
        let history = UsageHistory::from_performance(&seed::demo_history());

        let picks = recommend(&tables, &history, AllocationParams::default());
        let ids: Vec<&str> = picks.iter().map(|p| p.table_id.as_str()).collect();

        assert_eq!(ids, vec!["12", "11", "10"]);
        assert!(picks.iter().all(|p| p.reason == RecommendationReason::BajoUso));
    }

    #[test]
    fn test_fewer_free_than_slots() {
        let mut tables = floor(4);
        occupy(&mut tables[0]);
        occupy(&mut tables[1]);
        let picks = recommend(&tables, &UsageHistory::new(), AllocationParams::default());
        assert_eq!(picks.len(), 2);
    }

    #[test]
    fn test_no_tables_no_picks() {
        assert!(recommend(&[], &UsageHistory::new(), AllocationParams::default()).is_empty());

        let mut tables = floor(2);
        occupy(&mut tables[0]);
        occupy(&mut tables[1]);
        assert!(recommend(&tables, &UsageHistory::new(), AllocationParams::default()).is_empty());
    }

    #[test]
    fn test_ties_keep_board_order() {
        let tables = floor(5);
        let params = AllocationParams {
            free_ratio_threshold: 1.0,
            slots: 3,
        };
        let picks = recommend(&tables, &UsageHistory::new(), params);
        let ids: Vec<&str> = picks.iter().map(|p| p.table_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_history_accumulates() {
        let mut history = UsageHistory::new();
        history.record("3", 2);
        history.record("3", 1);
        assert_eq!(history.usage_of("3"), 3);
        assert_eq!(history.usage_of("99"), 0);
    }
}
