use crate::error::{Error, Result};
use crate::free_rects::FreeRectPool;
use crate::types::{Board, PackResult, PieceItem, PlacedPiece, Rect};

/// Greedy first-fit packer over as many boards as the items need.
#[derive(Debug, Clone, Copy)]
pub struct GuillotinePacker {
    gap: f64,
}

impl GuillotinePacker {
    pub fn new(gap: f64) -> Self {
        Self { gap }
    }

    pub fn pack(
        &self,
        items: &[PieceItem],
        usable_w: f64,
        usable_h: f64,
        allow_rotation: bool,
    ) -> Result<PackResult> {
        let usable = Rect::new(usable_w, usable_h);
        let (mut remaining, unplaced): (Vec<&PieceItem>, Vec<&PieceItem>) = items
            .iter()
            .partition(|item| self.fits_empty_board(item, usable, allow_rotation));

        for item in &unplaced {
            tracing::warn!(
                piece = %item.id,
                size = %item.rect(),
                usable = %usable,
                "piece does not fit an empty board"
            );
        }

        // Longest side first, then largest area. Stable, so equal pieces keep input order.
        remaining.sort_by(|a, b| {
            let side_a = a.width_mm.max(a.height_mm);
            let side_b = b.width_mm.max(b.height_mm);
            side_b
                .total_cmp(&side_a)
                .then_with(|| b.area().total_cmp(&a.area()))
        });

        let mut boards = Vec::new();
        while !remaining.is_empty() {
            let mut pool = FreeRectPool::new(usable, self.gap);
            let mut placements = Vec::new();
            let mut deferred = Vec::new();

            for item in remaining {
                match pool.best_fit(item.width_mm, item.height_mm, allow_rotation) {
                    Some(fit) => {
                        let (x, y) =
                            pool.consume_and_split(fit.index, fit.inflated_w, fit.inflated_h);
                        pool.prune();
                        placements.push(PlacedPiece {
                            piece_id: item.id.clone(),
                            typology: item.typology.clone(),
                            x,
                            y,
                            width: fit.nominal_w,
                            height: fit.nominal_h,
                            rotated: fit.rotated,
                        });
                    }
                    None => deferred.push(item),
                }
            }

            if placements.is_empty() {
                return Err(Error::Internal(format!(
                    "fresh {usable} board accepted none of {} pre-filtered pieces",
                    deferred.len()
                )));
            }

            let sequence = boards.len() + 1;
            tracing::debug!(
                board = sequence,
                placed = placements.len(),
                deferred = deferred.len(),
                free_rects = pool.free_rects().len(),
                exhausted = pool.is_empty(),
                "closed board"
            );
            boards.push(Board {
                sequence,
                placements,
            });
            remaining = deferred;
        }

        Ok(PackResult {
            boards,
            unplaced: unplaced.into_iter().cloned().collect(),
        })
    }

    fn fits_empty_board(&self, item: &PieceItem, usable: Rect, allow_rotation: bool) -> bool {
        let inflated = item.rect().inflated(self.gap);
        inflated.fits_in(&usable) || (allow_rotation && inflated.rotated().fits_in(&usable))
    }
}
