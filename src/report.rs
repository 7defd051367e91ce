//! Utilization summaries handed to renderers and exporters.

use serde::Serialize;

use crate::orchestrator::{GroupIssue, NestingRun};
use crate::types::{Board, GroupKey, PackResult, PackSettings, PieceItem};

/// Placed nominal area over the usable area of every board used, in `[0, 1]`.
/// Zero when no board was used.
pub fn utilization(result: &PackResult, usable_area: f64) -> f64 {
    let board_area = result.board_count() as f64 * usable_area;
    if board_area <= 0.0 {
        return 0.0;
    }
    result.placed_area() / board_area
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub group_key: GroupKey,
    pub board_width_mm: f64,
    pub board_height_mm: f64,
    pub board_count: usize,
    pub piece_count: usize,
    pub unplaced_count: usize,
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub board_count: usize,
    pub placed_count: usize,
    pub unplaced_count: usize,
    pub unresolved_count: usize,
}

/// Per-group layouts for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupLayout {
    pub group_key: GroupKey,
    pub usable_width_mm: f64,
    pub usable_height_mm: f64,
    pub boards: Vec<Board>,
    pub unplaced: Vec<PieceItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestingReport {
    pub settings: PackSettings,
    pub rows: Vec<ReportRow>,
    /// Weighted by board area across all groups.
    pub global_utilization: f64,
    pub totals: Totals,
    pub issues: Vec<GroupIssue>,
    pub layouts: Vec<GroupLayout>,
}

pub fn build(run: &NestingRun) -> NestingReport {
    let rows: Vec<ReportRow> = run
        .groups
        .iter()
        .map(|(key, group)| ReportRow {
            group_key: key.clone(),
            board_width_mm: group.rule.board_width_mm,
            board_height_mm: group.rule.board_height_mm,
            board_count: group.result.board_count(),
            piece_count: group.result.placed_count(),
            unplaced_count: group.result.unplaced.len(),
            utilization: utilization(&group.result, group.usable_area()),
        })
        .collect();

    let placed_area: f64 = run.groups.values().map(|g| g.result.placed_area()).sum();
    let board_area: f64 = run
        .groups
        .values()
        .map(|g| g.result.board_count() as f64 * g.usable_area())
        .sum();
    let global_utilization = if board_area > 0.0 {
        placed_area / board_area
    } else {
        0.0
    };

    let layouts = run
        .groups
        .iter()
        .map(|(key, group)| GroupLayout {
            group_key: key.clone(),
            usable_width_mm: group.usable_width_mm,
            usable_height_mm: group.usable_height_mm,
            boards: group.result.boards.clone(),
            unplaced: group.result.unplaced.clone(),
        })
        .collect();

    NestingReport {
        settings: run.settings,
        rows,
        global_utilization,
        totals: Totals {
            board_count: run.board_count(),
            placed_count: run.placed_count(),
            unplaced_count: run.unplaced_count(),
            unresolved_count: run.unresolved_count(),
        },
        issues: run.issues.clone(),
        layouts,
    }
}
