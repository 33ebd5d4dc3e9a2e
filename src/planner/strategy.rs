//! Boundary segment computation

use tracing::debug;

use crate::domain::model::{Segment, SegmentKind, Span, TimeSpec};
use crate::planner::keyframes::KeyframeIndex;

/// Split `[start, end)` into re-encoded boundaries and a stream-copied middle.
///
/// Caller guarantees `start < end`. A bound that falls exactly on a cut point
/// gets no re-encoded segment on that side. When no two cut points lie inside
/// the range the whole range is re-encoded as a single segment.
pub fn plan_segments(index: &KeyframeIndex, start: TimeSpec, end: TimeSpec) -> Vec<Segment> {
    let k_first = index.first_at_or_after(start);
    let k_last = index.last_at_or_before(end);

    let (k_first, k_last) = match (k_first, k_last) {
        (Some(first), Some(last)) if first < last => (first, last),
        _ => {
            debug!("No keyframe pair inside {}-{}, re-encoding whole range", start, end);
            return vec![Segment::new(
                SegmentKind::ReencodeWhole,
                Span { start, end },
            )];
        }
    };

    let mut segments = Vec::with_capacity(3);
    if start < k_first {
        segments.push(Segment::new(
            SegmentKind::ReencodeLead,
            Span {
                start,
                end: k_first,
            },
        ));
    }
    segments.push(Segment::new(
        SegmentKind::StreamCopyMiddle,
        Span {
            start: k_first,
            end: k_last,
        },
    ));
    if k_last < end {
        segments.push(Segment::new(
            SegmentKind::ReencodeTail,
            Span { start: k_last, end },
        ));
    }

    debug!(
        "Planned {} segment(s) for {}-{} (keyframes {} and {})",
        segments.len(),
        start,
        end,
        k_first,
        k_last
    );
    segments
}
