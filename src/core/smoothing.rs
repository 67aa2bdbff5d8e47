//! Temporal smoothing over history buffers.
//!
//! - Scalars are smoothed with a linearly recency-weighted average.
//! - Labels are stabilized by majority vote with a minimum quorum, so a
//!   single odd frame cannot flip the reported state.

use crate::core::history::HistoryBuffer;

/// Recency-weighted mean of the buffered samples.
///
/// The i-th oldest of `n` samples (1-based) gets weight `i`, so the newest
/// sample weighs `n` times the oldest. Returns `None` for an empty buffer.
pub fn weighted_average(samples: &HistoryBuffer<f64>) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let (weighted_sum, weight_sum) = samples
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(acc, weights), (i, &value)| {
            let weight = (i + 1) as f64;
            (acc + value * weight, weights + weight)
        });

    Some(weighted_sum / weight_sum)
}

/// Majority-vote label stabilizer with quorum.
#[derive(Debug, Clone)]
pub struct LabelStabilizer<L> {
    history: HistoryBuffer<L>,
    quorum: usize,
    current: Option<L>,
}

impl<L: Copy + Eq> LabelStabilizer<L> {
    pub fn new(history_length: usize, quorum: usize) -> Self {
        Self {
            history: HistoryBuffer::new(history_length),
            quorum: quorum.max(1),
            current: None,
        }
    }

    /// Record a new raw label and return the stabilized label.
    ///
    /// The leading label is adopted when it occurs at least `quorum` times
    /// in the window, or while the window still holds fewer than `quorum`
    /// samples. Otherwise the previously reported label stays.
    pub fn observe(&mut self, label: L) -> Option<L> {
        self.history.push(label);

        if let Some((leader, count)) = self.leader() {
            if count >= self.quorum || self.history.len() < self.quorum {
                self.current = Some(leader);
            }
        }

        self.current
    }

    pub fn history(&self) -> &HistoryBuffer<L> {
        &self.history
    }

    /// Most frequent label in the window with its count.
    ///
    /// Ties keep the current label when it is among the leaders, otherwise
    /// the leader that appears earliest in the window wins.
    fn leader(&self) -> Option<(L, usize)> {
        // first-appearance order, oldest first
        let mut tally: Vec<(L, usize)> = Vec::new();
        for &label in self.history.iter() {
            match tally.iter_mut().find(|(l, _)| *l == label) {
                Some((_, count)) => *count += 1,
                None => tally.push((label, 1)),
            }
        }

        let max = tally.iter().map(|&(_, count)| count).max()?;
        if let Some(current) = self.current {
            if tally.iter().any(|&(l, count)| l == current && count == max) {
                return Some((current, max));
            }
        }
        tally.into_iter().find(|&(_, count)| count == max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn buffer_of(values: &[f64]) -> HistoryBuffer<f64> {
        let mut buffer = HistoryBuffer::new(30);
        for &v in values {
            buffer.push(v);
        }
        buffer
    }

    #[test]
    fn test_weighted_average_favors_recent() {
        // weights 1, 2, 3 -> (0*1 + 0*2 + 1*3) / 6
        let avg = weighted_average(&buffer_of(&[0.0, 0.0, 1.0])).unwrap();
        assert!((avg - 0.5).abs() < 1e-12);

        let avg = weighted_average(&buffer_of(&[1.0, 0.0, 0.0])).unwrap();
        assert!((avg - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_average_empty() {
        assert!(weighted_average(&HistoryBuffer::new(5)).is_none());
    }

    #[test]
    fn test_bootstrap_adopts_leader() {
        let mut stabilizer = LabelStabilizer::new(30, 3);
        assert_eq!(stabilizer.observe("happy"), Some("happy"));
        // tie with the current label keeps it
        assert_eq!(stabilizer.observe("sad"), Some("happy"));
    }

    #[test]
    fn test_quorum_blocks_flicker() {
        let mut stabilizer = LabelStabilizer::new(30, 3);
        stabilizer.observe("happy");
        stabilizer.observe("happy");
        assert_eq!(stabilizer.observe("sad"), Some("happy"));
        assert_eq!(stabilizer.observe("sad"), Some("happy"));
        // sad now leads 3 to 2 and meets quorum
        assert_eq!(stabilizer.observe("sad"), Some("sad"));
    }

    #[test]
    fn test_leader_below_quorum_retains_previous() {
        let mut stabilizer = LabelStabilizer::new(4, 3);
        stabilizer.observe('a');
        stabilizer.observe('b');
        stabilizer.observe('c');
        // window full of distinct labels: nobody has quorum
        assert_eq!(stabilizer.observe('d'), Some('a'));
        assert_eq!(stabilizer.history().len(), 4);
    }

    #[test]
    fn test_tie_without_current_prefers_oldest() {
        let mut stabilizer = LabelStabilizer::new(2, 1);
        assert_eq!(stabilizer.observe('a'), Some('a'));
        assert_eq!(stabilizer.observe('b'), Some('a'));
        // window: b c -> current label gone, b is the oldest leader
        assert_eq!(stabilizer.observe('c'), Some('b'));
    }

    #[test]
    fn test_tie_keeps_current() {
        let mut stabilizer = LabelStabilizer::new(6, 2);
        stabilizer.observe('x');
        stabilizer.observe('y');
        stabilizer.observe('y');
        stabilizer.observe('z');
        assert_eq!(stabilizer.observe('z'), Some('y'));
        // window: x y y z z w -> y and z tie at 2, y is current
        assert_eq!(stabilizer.observe('w'), Some('y'));
        // window: y y z z w z -> z leads with 3
        assert_eq!(stabilizer.observe('z'), Some('z'));
    }

    proptest! {
        #[test]
        fn test_weighted_average_within_bounds(
            values in proptest::collection::vec(0.0f64..=1.0, 1..80),
        ) {
            let buffer = buffer_of(&values);
            let min = buffer.iter().copied().fold(f64::INFINITY, f64::min);
            let max = buffer.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = weighted_average(&buffer).unwrap();
            prop_assert!(avg >= min - 1e-12 && avg <= max + 1e-12);
        }
    }
}
