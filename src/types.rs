use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tolerance for millimetre comparisons, absorbs float rounding in splits.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn rotated(&self) -> Self {
        Self {
            w: self.h,
            h: self.w,
        }
    }

    pub fn inflated(&self, gap: f64) -> Self {
        Self {
            w: self.w + gap,
            h: self.h + gap,
        }
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.w <= other.w + EPSILON && self.h <= other.h + EPSILON
    }

    pub fn is_degenerate(&self) -> bool {
        self.w <= EPSILON || self.h <= EPSILON
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// A piece to be placed on a board. Dimensions are validated positive millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceItem {
    pub id: String,
    pub typology: String,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PieceItem {
    pub fn new(
        id: impl Into<String>,
        typology: impl Into<String>,
        width_mm: f64,
        height_mm: f64,
    ) -> Self {
        Self {
            id: id.into(),
            typology: typology.into(),
            width_mm,
            height_mm,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.width_mm, self.height_mm)
    }

    pub fn area(&self) -> f64 {
        self.width_mm * self.height_mm
    }
}

/// A piece together with the attributes it is grouped by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceRecord {
    pub item: PieceItem,
    pub material: String,
    pub finish: String,
    #[serde(default)]
    pub project: Option<String>,
}

/// Board geometry for one (material, finish) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardRule {
    pub board_width_mm: f64,
    pub board_height_mm: f64,
    pub rotation_allowed: bool,
}

impl BoardRule {
    /// Board dimensions minus the edge margin on all four sides.
    pub fn usable(&self, edge_margin_mm: f64) -> Rect {
        Rect::new(
            self.board_width_mm - 2.0 * edge_margin_mm,
            self.board_height_mm - 2.0 * edge_margin_mm,
        )
    }
}

/// Nominal footprint of a placed piece, in usable-area coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub piece_id: String,
    pub typology: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotated: bool,
}

impl PlacedPiece {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// 1-based position of the board within its group.
    pub sequence: usize,
    pub placements: Vec<PlacedPiece>,
}

impl Board {
    pub fn used_area(&self) -> f64 {
        self.placements.iter().map(PlacedPiece::area).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackResult {
    pub boards: Vec<Board>,
    pub unplaced: Vec<PieceItem>,
}

impl PackResult {
    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    pub fn placed_count(&self) -> usize {
        self.boards.iter().map(|b| b.placements.len()).sum()
    }

    pub fn placed_area(&self) -> f64 {
        self.boards.iter().map(Board::used_area).sum()
    }
}

/// Pieces sharing a key are packed onto the same kind of board.
///
/// Material and finish are stored normalized, see [`crate::rules::normalize_key`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub material: String,
    pub finish: String,
    pub project: Option<String>,
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.material, self.finish)?;
        if let Some(project) = &self.project {
            write!(f, " [{project}]")?;
        }
        Ok(())
    }
}

pub const DEFAULT_GAP_MM: f64 = 15.0;
pub const DEFAULT_EDGE_MARGIN_MM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackSettings {
    /// Saw kerf and clearance added to each piece's width and height.
    #[serde(default = "default_gap")]
    pub gap_mm: f64,
    /// Trimmed from every board edge.
    #[serde(default = "default_edge_margin")]
    pub edge_margin_mm: f64,
    #[serde(default)]
    pub group_by_project: bool,
}

fn default_gap() -> f64 {
    DEFAULT_GAP_MM
}

fn default_edge_margin() -> f64 {
    DEFAULT_EDGE_MARGIN_MM
}

impl PackSettings {
    /// Gap and margin must be finite and non-negative. A negative gap lets
    /// footprints overlap, a negative margin grows the board past its edges.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("gap_mm", self.gap_mm),
            ("edge_margin_mm", self.edge_margin_mm),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidSettings(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            gap_mm: DEFAULT_GAP_MM,
            edge_margin_mm: DEFAULT_EDGE_MARGIN_MM,
            group_by_project: false,
        }
    }
}
