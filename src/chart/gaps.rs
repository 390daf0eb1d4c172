use super::series::Sample;

/// Insert a null breakpoint wherever consecutive samples are more than
/// `gap_threshold_seconds` apart, so the chart does not bridge missing data.
///
/// The breakpoint sits at `prev.timestamp + gap_threshold_seconds`, strictly
/// before the next real sample. Input is expected in ascending time order.
/// Timestamps at the ends of the `i64` range saturate instead of wrapping.
#[must_use]
pub fn insert_gaps(samples: &[Sample], gap_threshold_seconds: i64) -> Vec<Sample> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };

    let mut result = Vec::with_capacity(samples.len());
    result.push(*first);

    for pair in samples.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if curr.timestamp.saturating_sub(prev.timestamp) > gap_threshold_seconds {
            let marker = prev.timestamp.saturating_add(gap_threshold_seconds);
            result.push(Sample::gap(marker));
        }
        result.push(curr);
    }

    result
}
