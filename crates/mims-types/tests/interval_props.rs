use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use mims_types::{Interval, IntervalSet};
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn arb_interval() -> impl Strategy<Value = Interval> {
    (0i64..500, 0i64..120).prop_map(|(start, len)| {
        let start = base() + TimeDelta::minutes(start * 15);
        Interval::new(start, start + TimeDelta::minutes(len * 15)).unwrap()
    })
}

fn arb_intervals() -> impl Strategy<Value = Vec<Interval>> {
    proptest::collection::vec(arb_interval(), 0..24)
}

fn covered_by(intervals: &[Interval], instant: DateTime<Utc>) -> bool {
    intervals.iter().any(|iv| iv.contains(instant))
}

proptest! {
    #[test]
    fn subtract_self_is_empty(a in arb_interval()) {
        prop_assert!(a.subtract(&a).is_empty());
    }

    #[test]
    fn subtract_disjoint_is_identity(a in arb_interval(), b in arb_interval()) {
        prop_assume!(!a.overlaps(&b));
        prop_assert_eq!(a.subtract(&b), vec![a]);
    }

    #[test]
    fn subtract_never_emits_inverted_or_larger(a in arb_interval(), b in arb_interval()) {
        for piece in a.subtract(&b) {
            prop_assert!(piece.start() <= piece.end());
            prop_assert!(a.encloses(&piece));
            // Only an untouched degenerate input comes back degenerate.
            if piece != a {
                prop_assert!(!piece.is_degenerate());
            }
        }
    }

    #[test]
    fn overlaps_is_symmetric(a in arb_interval(), b in arb_interval()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn union_encloses_both_inputs(a in arb_interval(), b in arb_interval()) {
        let merged = a.union(&b);
        prop_assert!(merged.iter().any(|m| m.encloses(&a)));
        prop_assert!(merged.iter().any(|m| m.encloses(&b)));
    }

    #[test]
    fn combine_is_sorted_and_disjoint(xs in arb_intervals()) {
        let combined = Interval::combine(xs.iter().copied());
        for pair in combined.windows(2) {
            prop_assert!(pair[0].end() < pair[1].start());
            prop_assert!(!pair[0].overlaps(&pair[1]));
        }
    }

    #[test]
    fn combine_is_idempotent(xs in arb_intervals()) {
        let once = Interval::combine(xs.iter().copied());
        let twice = Interval::combine(once.iter().copied());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn combine_ignores_input_order(xs in arb_intervals()) {
        let forward = Interval::combine(xs.iter().copied());
        let reversed = Interval::combine(xs.iter().rev().copied());
        let mut rotated = xs.clone();
        if !rotated.is_empty() {
            let mid = rotated.len() / 2;
            rotated.rotate_left(mid);
        }
        prop_assert_eq!(&forward, &reversed);
        prop_assert_eq!(&forward, &Interval::combine(rotated));
    }

    #[test]
    fn combine_preserves_coverage(xs in arb_intervals(), probe in 0i64..4_000) {
        let instant = base() + TimeDelta::minutes(probe * 5);
        let combined = Interval::combine(xs.iter().copied());
        prop_assert_eq!(covered_by(&xs, instant), covered_by(&combined, instant));
    }

    #[test]
    fn interval_set_with_matches_combine(xs in arb_intervals(), extra in arb_interval()) {
        let set: IntervalSet = xs.iter().copied().collect();
        let grown = set.with(extra);
        let expected = Interval::combine(xs.iter().copied().chain([extra]));
        prop_assert_eq!(grown.as_slice(), expected.as_slice());
    }
}
