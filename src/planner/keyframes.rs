//! Keyframe index for cut point lookups

use tracing::debug;

use crate::domain::model::TimeSpec;

/// Sorted, de-duplicated cut points of the primary video stream.
///
/// Keyframes outside `[0, duration]` are dropped and `duration` itself is
/// always present, since the end of stream is a valid copy boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyframeIndex {
    points: Vec<TimeSpec>,
    duration: TimeSpec,
}

impl KeyframeIndex {
    pub fn new(keyframes: impl IntoIterator<Item = TimeSpec>, duration: TimeSpec) -> Self {
        let mut points: Vec<TimeSpec> = keyframes
            .into_iter()
            .filter(|k| !k.is_negative() && *k <= duration)
            .collect();
        points.push(duration);
        points.sort_unstable();
        points.dedup();

        debug!(
            "Keyframe index: {} cut points over {}",
            points.len(),
            duration
        );
        Self { points, duration }
    }

    /// Smallest cut point at or after `t`
    pub fn first_at_or_after(&self, t: TimeSpec) -> Option<TimeSpec> {
        let idx = self.points.partition_point(|k| *k < t);
        self.points.get(idx).copied()
    }

    /// Largest cut point at or before `t`
    pub fn last_at_or_before(&self, t: TimeSpec) -> Option<TimeSpec> {
        let idx = self.points.partition_point(|k| *k <= t);
        idx.checked_sub(1).map(|i| self.points[i])
    }

    pub fn contains(&self, t: TimeSpec) -> bool {
        self.points.binary_search(&t).is_ok()
    }

    /// Number of cut points, including the end of stream
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn duration(&self) -> TimeSpec {
        self.duration
    }

    pub fn points(&self) -> &[TimeSpec] {
        &self.points
    }

    /// Average distance between consecutive cut points (the mean GOP length)
    pub fn mean_interval(&self) -> Option<TimeSpec> {
        if self.points.len() < 2 {
            return None;
        }
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        let gaps = (self.points.len() - 1) as i64;
        Some(TimeSpec::from_micros((last - first).as_micros() / gaps))
    }
}
