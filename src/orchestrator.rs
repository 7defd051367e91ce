//! Groups pieces by board kind and packs each group independently.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::guillotine::GuillotinePacker;
use crate::rules::{BoardRuleResolver, normalize_key};
use crate::types::{BoardRule, GroupKey, PackResult, PackSettings, PieceItem, PieceRecord};

/// A group that could not be packed. Its pieces are counted as unresolved,
/// never as unplaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupIssue {
    UnknownMaterial {
        key: GroupKey,
        pieces: Vec<PieceItem>,
    },
}

impl GroupIssue {
    pub fn key(&self) -> &GroupKey {
        match self {
            GroupIssue::UnknownMaterial { key, .. } => key,
        }
    }

    pub fn pieces(&self) -> &[PieceItem] {
        match self {
            GroupIssue::UnknownMaterial { pieces, .. } => pieces,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRun {
    pub rule: BoardRule,
    pub usable_width_mm: f64,
    pub usable_height_mm: f64,
    pub result: PackResult,
}

impl GroupRun {
    pub fn usable_area(&self) -> f64 {
        self.usable_width_mm * self.usable_height_mm
    }
}

/// Everything one orchestrator run produced, ordered by group key.
#[derive(Debug, Clone, PartialEq)]
pub struct NestingRun {
    pub settings: PackSettings,
    pub groups: BTreeMap<GroupKey, GroupRun>,
    pub issues: Vec<GroupIssue>,
}

impl NestingRun {
    pub fn board_count(&self) -> usize {
        self.groups.values().map(|g| g.result.board_count()).sum()
    }

    pub fn placed_count(&self) -> usize {
        self.groups.values().map(|g| g.result.placed_count()).sum()
    }

    pub fn unplaced_count(&self) -> usize {
        self.groups.values().map(|g| g.result.unplaced.len()).sum()
    }

    pub fn unresolved_count(&self) -> usize {
        self.issues.iter().map(|i| i.pieces().len()).sum()
    }
}

pub fn group_key(piece: &PieceRecord, by_project: bool) -> GroupKey {
    GroupKey {
        material: normalize_key(&piece.material),
        finish: normalize_key(&piece.finish),
        project: if by_project {
            piece.project.clone()
        } else {
            None
        },
    }
}

pub fn run(
    pieces: &[PieceRecord],
    resolver: &BoardRuleResolver,
    settings: PackSettings,
) -> Result<NestingRun> {
    settings.validate()?;

    let mut grouped: BTreeMap<GroupKey, Vec<PieceItem>> = BTreeMap::new();
    for piece in pieces {
        grouped
            .entry(group_key(piece, settings.group_by_project))
            .or_default()
            .push(piece.item.clone());
    }

    let packer = GuillotinePacker::new(settings.gap_mm);
    let mut groups = BTreeMap::new();
    let mut issues = Vec::new();

    for (key, items) in grouped {
        let Some(rule) = resolver.resolve(&key.material, &key.finish) else {
            tracing::warn!(group = %key, pieces = items.len(), "no board rule for material");
            issues.push(GroupIssue::UnknownMaterial { key, pieces: items });
            continue;
        };

        let usable = rule.usable(settings.edge_margin_mm);
        let result = if usable.is_degenerate() {
            tracing::warn!(group = %key, usable = %usable, "edge margin leaves no usable area");
            PackResult {
                boards: Vec::new(),
                unplaced: items,
            }
        } else {
            packer.pack(&items, usable.w, usable.h, rule.rotation_allowed)?
        };

        tracing::info!(
            group = %key,
            boards = result.board_count(),
            placed = result.placed_count(),
            unplaced = result.unplaced.len(),
            "packed group"
        );
        groups.insert(
            key,
            GroupRun {
                rule,
                usable_width_mm: usable.w,
                usable_height_mm: usable.h,
                result,
            },
        );
    }

    Ok(NestingRun {
        settings,
        groups,
        issues,
    })
}
