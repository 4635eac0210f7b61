//! Cost matrices and assignment for track/detection association.

use ndarray::Array2;

use crate::geometry::{Rect, iou_batch};
use crate::types::{Detection, ObjectClass};

/// Cost given to pairs that may never be matched.
pub const NON_MATCHABLE: f32 = 1.0;

/// Class-aware IoU distance matrix between tracks and detections.
///
/// `cost = 1 - IoU`; pairs of different classes are pinned to
/// [`NON_MATCHABLE`].
pub fn iou_cost_matrix(tracks: &[(Rect, ObjectClass)], detections: &[Detection]) -> Array2<f32> {
    let track_boxes: Vec<Rect> = tracks.iter().map(|(bbox, _)| *bbox).collect();
    let det_boxes: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
    let mut cost = iou_batch(&track_boxes, &det_boxes);
    for ((i, j), c) in cost.indexed_iter_mut() {
        *c = if tracks[i].1 == detections[j].class {
            1.0 - *c
        } else {
            NON_MATCHABLE
        };
    }
    cost
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    fn from_matches(matches: Vec<(usize, usize)>, num_rows: usize, num_cols: usize) -> Self {
        let mut row_taken = vec![false; num_rows];
        let mut col_taken = vec![false; num_cols];
        for &(i, j) in &matches {
            row_taken[i] = true;
            col_taken[j] = true;
        }
        Self {
            matches,
            unmatched_tracks: (0..num_rows).filter(|&i| !row_taken[i]).collect(),
            unmatched_detections: (0..num_cols).filter(|&j| !col_taken[j]).collect(),
        }
    }
}

/// A pair is acceptable when it overlaps by at least `iou_thresh` and is not
/// pinned as non-matchable.
#[inline]
fn acceptable(cost: f32, iou_thresh: f32) -> bool {
    cost < NON_MATCHABLE && 1.0 - cost >= iou_thresh
}

/// Greedy global assignment: take the cheapest free pair until none is
/// acceptable.
///
/// Pairs are visited in ascending cost, ties broken by track index then
/// detection index. This approximates minimum-cost matching and can differ from
/// [`linear_assignment`] when a cheap pair blocks two slightly worse ones.
pub fn greedy_assignment(cost_matrix: &Array2<f32>, iou_thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    let mut pairs: Vec<(f32, usize, usize)> = cost_matrix
        .indexed_iter()
        .map(|((i, j), &c)| (c, i, j))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut row_taken = vec![false; num_rows];
    let mut col_taken = vec![false; num_cols];
    let mut matches = Vec::new();
    for (c, i, j) in pairs {
        if row_taken[i] || col_taken[j] {
            continue;
        }
        if acceptable(c, iou_thresh) {
            row_taken[i] = true;
            col_taken[j] = true;
            matches.push((i, j));
        }
    }

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}

/// Minimum-cost assignment via `lapjv`, keeping only acceptable pairs.
pub fn linear_assignment(cost_matrix: &Array2<f32>, iou_thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::from_matches(Vec::new(), num_rows, num_cols);
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), 1e6);
    for ((i, j), &c) in cost_matrix.indexed_iter() {
        padded[[i, j]] = c as f64;
    }

    let mut matches = Vec::new();
    if let Ok((row_to_col, _)) = lapjv::lapjv(&padded) {
        for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
            if col_idx < num_cols && acceptable(cost_matrix[[row_idx, col_idx]], iou_thresh) {
                matches.push((row_idx, col_idx));
            }
        }
    }

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}
