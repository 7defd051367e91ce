use crate::types::{EPSILON, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeRect {
    pub x: f64,
    pub y: f64,
    pub rect: Rect,
}

impl FreeRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            rect: Rect::new(w, h),
        }
    }

    /// All four edges of `self` lie within or on the edges of `other`.
    pub fn contained_in(&self, other: &FreeRect) -> bool {
        self.x >= other.x - EPSILON
            && self.y >= other.y - EPSILON
            && self.x + self.rect.w <= other.x + other.rect.w + EPSILON
            && self.y + self.rect.h <= other.y + other.rect.h + EPSILON
    }
}

/// Best-fit candidate returned by [`FreeRectPool::best_fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub index: usize,
    pub inflated_w: f64,
    pub inflated_h: f64,
    pub rotated: bool,
    pub nominal_w: f64,
    pub nominal_h: f64,
}

/// Free regions of the board currently being filled, in insertion order.
#[derive(Debug, Clone)]
pub struct FreeRectPool {
    gap: f64,
    free_rects: Vec<FreeRect>,
}

impl FreeRectPool {
    /// A pool holding one rectangle that spans the whole usable area.
    pub fn new(usable: Rect, gap: f64) -> Self {
        Self {
            gap,
            free_rects: vec![FreeRect {
                x: 0.0,
                y: 0.0,
                rect: usable,
            }],
        }
    }

    pub fn free_rects(&self) -> &[FreeRect] {
        &self.free_rects
    }

    pub fn is_empty(&self) -> bool {
        self.free_rects.is_empty()
    }

    /// Free rectangle leaving the least slack around the gap-inflated piece.
    ///
    /// Slack is `(free.w - inflated_w) + (free.h - inflated_h)`. The first
    /// candidate with minimal slack wins, scanning rectangles in pool order and
    /// trying 0° before 90° within each.
    pub fn best_fit(&self, piece_w: f64, piece_h: f64, allow_rotation: bool) -> Option<Fit> {
        let nominal = Rect::new(piece_w, piece_h);
        let mut best: Option<(f64, Fit)> = None;

        for (index, free) in self.free_rects.iter().enumerate() {
            let orientations: &[bool] = if allow_rotation {
                &[false, true]
            } else {
                &[false]
            };

            for &rotated in orientations {
                let placed = if rotated { nominal.rotated() } else { nominal };
                let inflated = placed.inflated(self.gap);
                if !inflated.fits_in(&free.rect) {
                    continue;
                }
                let slack = (free.rect.w - inflated.w) + (free.rect.h - inflated.h);
                if best.is_none_or(|(best_slack, _)| slack < best_slack) {
                    best = Some((
                        slack,
                        Fit {
                            index,
                            inflated_w: inflated.w,
                            inflated_h: inflated.h,
                            rotated,
                            nominal_w: placed.w,
                            nominal_h: placed.h,
                        },
                    ));
                }
            }
        }

        best.map(|(_, fit)| fit)
    }

    /// Removes the chosen rectangle and returns its origin, which is where the
    /// piece goes. The right and bottom remainders are appended in that order.
    pub fn consume_and_split(
        &mut self,
        index: usize,
        inflated_w: f64,
        inflated_h: f64,
    ) -> (f64, f64) {
        let free = self.free_rects.remove(index);

        let right = FreeRect::new(
            free.x + inflated_w,
            free.y,
            free.rect.w - inflated_w,
            inflated_h,
        );
        let bottom = FreeRect::new(
            free.x,
            free.y + inflated_h,
            free.rect.w,
            free.rect.h - inflated_h,
        );

        for remainder in [right, bottom] {
            if !remainder.rect.is_degenerate() {
                self.free_rects.push(remainder);
            }
        }

        (free.x, free.y)
    }

    /// Drops every rectangle contained in another one. Of two identical
    /// rectangles the earlier is kept.
    pub fn prune(&mut self) {
        let mut keep = vec![true; self.free_rects.len()];
        for i in 0..self.free_rects.len() {
            for j in 0..self.free_rects.len() {
                if i == j || !keep[j] {
                    continue;
                }
                let a = &self.free_rects[i];
                let b = &self.free_rects[j];
                if a.contained_in(b) && (!b.contained_in(a) || j < i) {
                    keep[i] = false;
                    break;
                }
            }
        }

        let mut flags = keep.into_iter();
        self.free_rects.retain(|_| flags.next().unwrap_or(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(w: f64, h: f64, gap: f64) -> FreeRectPool {
        FreeRectPool::new(Rect::new(w, h), gap)
    }

    #[test]
    fn test_best_fit_single_rect() {
        let p = pool(100.0, 100.0, 0.0);
        let fit = p.best_fit(50.0, 30.0, false).unwrap();
        assert_eq!(fit.index, 0);
        assert!(!fit.rotated);
        assert_eq!((fit.nominal_w, fit.nominal_h), (50.0, 30.0));
    }

    #[test]
    fn test_piece_too_large() {
        let p = pool(100.0, 100.0, 0.0);
        assert!(p.best_fit(200.0, 50.0, true).is_none());
    }

    #[test]
    fn test_rotation_fit() {
        let p = pool(100.0, 50.0, 0.0);
        assert!(p.best_fit(50.0, 100.0, false).is_none());
        let fit = p.best_fit(50.0, 100.0, true).unwrap();
        assert!(fit.rotated);
        assert_eq!((fit.nominal_w, fit.nominal_h), (100.0, 50.0));
    }

    #[test]
    fn test_gap_inflates_footprint() {
        let p = pool(100.0, 100.0, 5.0);
        let fit = p.best_fit(95.0, 40.0, false).unwrap();
        assert_eq!((fit.inflated_w, fit.inflated_h), (100.0, 45.0));
        assert_eq!((fit.nominal_w, fit.nominal_h), (95.0, 40.0));
        assert!(p.best_fit(96.0, 40.0, false).is_none());
    }

    #[test]
    fn test_best_fit_prefers_least_slack() {
        let mut p = pool(100.0, 100.0, 0.0);
        p.free_rects = vec![
            FreeRect::new(0.0, 0.0, 80.0, 80.0),
            FreeRect::new(80.0, 0.0, 20.0, 50.0),
            FreeRect::new(0.0, 80.0, 40.0, 20.0),
        ];
        let fit = p.best_fit(20.0, 20.0, false).unwrap();
        assert_eq!(fit.index, 2);
    }

    #[test]
    fn test_best_fit_tie_goes_to_first_rect() {
        let mut p = pool(100.0, 100.0, 0.0);
        p.free_rects = vec![
            FreeRect::new(0.0, 0.0, 30.0, 20.0),
            FreeRect::new(50.0, 50.0, 20.0, 30.0),
        ];
        // Both leave 10 mm of slack, the first rectangle wins.
        let fit = p.best_fit(20.0, 20.0, true).unwrap();
        assert_eq!(fit.index, 0);
        assert!(!fit.rotated);
    }

    #[test]
    fn test_split_produces_right_and_bottom() {
        let mut p = pool(100.0, 100.0, 0.0);
        let origin = p.consume_and_split(0, 60.0, 40.0);
        assert_eq!(origin, (0.0, 0.0));
        assert_eq!(
            p.free_rects(),
            &[
                FreeRect::new(60.0, 0.0, 40.0, 40.0),
                FreeRect::new(0.0, 40.0, 100.0, 60.0),
            ]
        );
    }

    #[test]
    fn test_split_discards_degenerate() {
        let mut p = pool(100.0, 50.0, 0.0);
        p.consume_and_split(0, 100.0, 20.0);
        assert_eq!(p.free_rects(), &[FreeRect::new(0.0, 20.0, 100.0, 30.0)]);

        let mut exact = pool(100.0, 100.0, 0.0);
        exact.consume_and_split(0, 100.0, 100.0);
        assert!(exact.is_empty());
    }

    #[test]
    fn test_prune_removes_contained() {
        let mut p = pool(100.0, 100.0, 0.0);
        p.free_rects = vec![
            FreeRect::new(10.0, 10.0, 20.0, 20.0),
            FreeRect::new(0.0, 0.0, 50.0, 50.0),
            FreeRect::new(60.0, 0.0, 40.0, 10.0),
        ];
        p.prune();
        assert_eq!(
            p.free_rects(),
            &[
                FreeRect::new(0.0, 0.0, 50.0, 50.0),
                FreeRect::new(60.0, 0.0, 40.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_prune_keeps_one_of_duplicates() {
        let mut p = pool(100.0, 100.0, 0.0);
        p.free_rects = vec![
            FreeRect::new(0.0, 0.0, 10.0, 10.0),
            FreeRect::new(0.0, 0.0, 10.0, 10.0),
        ];
        p.prune();
        assert_eq!(p.free_rects().len(), 1);
    }
}
