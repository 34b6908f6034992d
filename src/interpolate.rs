// src/interpolate.rs

/// Reconstructs a dense series from a sparse one aligned to the date axis.
///
/// Gaps between two observations are filled by linear interpolation; gaps
/// before the first or after the last observation continue the line through
/// the two nearest observations at that end. Extrapolated values are not
/// clamped and may leave the plausible range.
///
/// Returns `None` when fewer than two positions are observed, since no line
/// is defined. Observed positions are copied through unchanged.
pub fn fill_gaps(series: &[Option<f64>]) -> Option<Vec<f64>> {
    let observed: Vec<(usize, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    if observed.len() < 2 {
        return None;
    }

    let first = observed[0].0;
    let last = observed[observed.len() - 1].0;
    // index into `observed` of the segment's left point
    let mut segment = 0;

    let dense = series
        .iter()
        .enumerate()
        .map(|(position, value)| {
            if let Some(v) = value {
                return *v;
            }
            let (a, b) = if position < first {
                (observed[0], observed[1])
            } else if position > last {
                (observed[observed.len() - 2], observed[observed.len() - 1])
            } else {
                while observed[segment + 1].0 < position {
                    segment += 1;
                }
                (observed[segment], observed[segment + 1])
            };
            line_at(a, b, position)
        })
        .collect();

    Some(dense)
}

fn line_at((x0, y0): (usize, f64), (x1, y1): (usize, f64), x: usize) -> f64 {
    let slope = (y1 - y0) / (x1 as f64 - x0 as f64);
    y0 + slope * (x as f64 - x0 as f64)
}
