//! 1-D peak detection over point-frequency histograms.
//!
//! Gridlines show up as tall, narrow clusters in the histograms, but they
//! are rarely exactly one pixel wide, so each peak also carries interpolated
//! left/right bounds describing its thickness.

use std::cmp::Ordering;

/// A detected histogram peak.
#[derive(Debug, Clone, Copy)]
pub struct Peak {
    /// Sample index of the peak (middle of a plateau).
    pub position: usize,
    pub height: f64,
    /// Height of the peak above its surrounding valleys.
    pub prominence: f64,
    /// Interpolated left bound at the evaluation height.
    pub left_ips: f64,
    /// Interpolated right bound at the evaluation height.
    pub right_ips: f64,
    /// Position of the valley bounding the peak on the left.
    pub left_base: usize,
    /// Position of the valley bounding the peak on the right.
    pub right_base: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct FindPeaksParams {
    /// Minimum prominence for a peak to be reported.
    pub min_prominence: f64,
    /// Minimum sample distance between neighbouring peaks; smaller peaks
    /// within the window of a taller one are dropped.
    pub min_distance: usize,
    /// Minimum width (in samples) at the evaluation height.
    pub min_width: f64,
    /// Fraction of the prominence at which the width is measured, counted
    /// down from the peak height.
    pub rel_height: f64,
}

impl Default for FindPeaksParams {
    fn default() -> Self {
        Self {
            min_prominence: 1.0,
            min_distance: 1,
            min_width: 1.0,
            rel_height: 0.5,
        }
    }
}

/// Find local maxima and their properties, filtered by distance, prominence
/// and width in that order.
pub fn find_peaks(signal: &[u32], params: &FindPeaksParams) -> Vec<Peak> {
    let x: Vec<f64> = signal.iter().map(|&v| v as f64).collect();

    let mut positions = local_maxima(&x);
    if params.min_distance > 1 && positions.len() > 1 {
        let heights: Vec<f64> = positions.iter().map(|&p| x[p]).collect();
        let keep = select_by_peak_distance(&positions, &heights, params.min_distance);
        positions = positions
            .into_iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(p))
            .collect();
    }

    let mut peaks = Vec::with_capacity(positions.len());
    for position in positions {
        let (prominence, left_base, right_base) = peak_prominence(&x, position);
        if prominence < params.min_prominence {
            continue;
        }
        let (width, left_ips, right_ips) = peak_width(
            &x,
            position,
            prominence,
            left_base,
            right_base,
            params.rel_height,
        );
        if width < params.min_width {
            continue;
        }
        peaks.push(Peak {
            position,
            height: x[position],
            prominence,
            left_ips,
            right_ips,
            left_base,
            right_base,
        });
    }
    peaks
}

/// Indices of strict local maxima; a flat plateau reports its middle sample.
fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut midpoints = Vec::new();
    if x.len() < 3 {
        return midpoints;
    }
    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }
            if x[i_ahead] < x[i] {
                let left_edge = i;
                let right_edge = i_ahead - 1;
                midpoints.push((left_edge + right_edge) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }
    midpoints
}

/// Keep the tallest peaks first, discarding any neighbour closer than
/// `distance` samples to an already-kept peak.
fn select_by_peak_distance(positions: &[usize], priority: &[f64], distance: usize) -> Vec<bool> {
    let m = positions.len();
    let mut keep = vec![true; m];

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        priority[a]
            .partial_cmp(&priority[b])
            .unwrap_or(Ordering::Equal)
    });

    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 {
            k -= 1;
            if positions[j] - positions[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        let mut k = j + 1;
        while k < m && positions[k] - positions[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }
    keep
}

/// Prominence of the peak and the positions of its bounding valleys.
///
/// Walking out from the peak in each direction, the search stops at the
/// first sample higher than the peak (or the signal edge); the lowest sample
/// passed on the way is that side's base. The prominence is the height above
/// the higher of the two bases.
fn peak_prominence(x: &[f64], peak: usize) -> (f64, usize, usize) {
    let mut left_min = x[peak];
    let mut left_base = peak;
    let mut i = peak as isize;
    while i >= 0 && x[i as usize] <= x[peak] {
        if x[i as usize] < left_min {
            left_min = x[i as usize];
            left_base = i as usize;
        }
        i -= 1;
    }

    let mut right_min = x[peak];
    let mut right_base = peak;
    let mut i = peak;
    while i < x.len() && x[i] <= x[peak] {
        if x[i] < right_min {
            right_min = x[i];
            right_base = i;
        }
        i += 1;
    }

    (x[peak] - left_min.max(right_min), left_base, right_base)
}

/// Width of the peak at `rel_height` of its prominence below the peak, with
/// linearly interpolated crossings.
fn peak_width(
    x: &[f64],
    peak: usize,
    prominence: f64,
    left_base: usize,
    right_base: usize,
    rel_height: f64,
) -> (f64, f64, f64) {
    let height = x[peak] - prominence * rel_height;

    let mut i = peak;
    while i > left_base && x[i] > height {
        i -= 1;
    }
    let mut left_ips = i as f64;
    if x[i] < height {
        left_ips += (height - x[i]) / (x[i + 1] - x[i]);
    }

    let mut i = peak;
    while i < right_base && x[i] > height {
        i += 1;
    }
    let mut right_ips = i as f64;
    if x[i] < height {
        right_ips -= (height - x[i]) / (x[i - 1] - x[i]);
    }

    (right_ips - left_ips, left_ips, right_ips)
}
