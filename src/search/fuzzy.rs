//! Bounded edit distance
//!
//! Scoring calls this once per index token per query term, so the DP only
//! fills a diagonal band of width `2 * max_dist + 1` and bails out as soon as
//! every cell in a row exceeds the bound.

/// Levenshtein distance between `a` and `b`, capped at `max_dist + 1`
///
/// # Returns
/// * the exact distance when it is `<= max_dist`
/// * `max_dist + 1` ("too far") otherwise, including immediately when the
///   length difference alone exceeds `max_dist`
pub fn edit_distance_at_most(a: &str, b: &str, max_dist: usize) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let too_far = max_dist + 1;

    if a.len().abs_diff(b.len()) > max_dist {
        return too_far;
    }
    if a.is_empty() || b.is_empty() {
        // Length difference already checked against the bound
        return a.len().max(b.len());
    }

    // Cells outside the band are treated as "too far"
    let mut prev: Vec<usize> = (0..=b.len()).map(|j| j.min(too_far)).collect();
    let mut curr = vec![too_far; b.len() + 1];

    for i in 1..=a.len() {
        let lo = i.saturating_sub(max_dist).max(1);
        let hi = (i + max_dist).min(b.len());

        curr.fill(too_far);
        curr[0] = i.min(too_far);

        let mut row_min = curr[0];
        for j in lo..=hi {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let value = (prev[j - 1] + cost)
                .min(prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(too_far);
            curr[j] = value;
            row_min = row_min.min(value);
        }

        if row_min >= too_far {
            return too_far;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()].min(too_far)
}
