use proptest::prelude::*;
use rangecraft::builder::{BucketingFilterBuilder, GrafiteFilterBuilder};
use rangecraft::core::BitVec;
use rangecraft::prelude::*;

const KEY_SPACE: u64 = 1 << 40;

fn key_set() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0..KEY_SPACE, 1..200).prop_map(|mut keys| {
        // a key at the top keeps any r below KEY_SPACE feasible
        keys.push(KEY_SPACE);
        keys
    })
}

fn sorted_values() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0..50_000u64, 0..300).prop_map(|mut v| {
        v.sort_unstable();
        v
    })
}

fn naive_nonempty(values: &[u64], lo: u64, hi: u64) -> bool {
    values.iter().any(|&v| lo <= v && v <= hi)
}

proptest! {
    #[test]
    fn test_grafite_has_no_false_negatives(
        keys in key_set(),
        universe in 1u64..(1 << 24),
        seed in any::<u64>(),
        offsets in prop::collection::vec((0u64..1 << 26, 0u64..1 << 26), 1..20),
    ) {
        let filter = GrafiteFilterBuilder::new()
            .reduced_universe(universe)
            .seed(seed)
            .build(&keys)
            .unwrap();

        for (i, &(below, above)) in offsets.iter().enumerate() {
            let k = keys[i % keys.len()];
            prop_assert!(filter.query_point(k));
            prop_assert!(filter.query_range(k.saturating_sub(below), k.saturating_add(above)));
        }
    }

    #[test]
    fn test_grafite_point_equals_degenerate_range(
        keys in key_set(),
        universe in 1u64..(1 << 20),
        seed in any::<u64>(),
        probes in prop::collection::vec(0..KEY_SPACE, 1..50),
    ) {
        let filter = GrafiteFilterBuilder::new()
            .store::<SortedVecStore>()
            .reduced_universe(universe)
            .seed(seed)
            .build(&keys)
            .unwrap();
        for x in probes {
            prop_assert_eq!(filter.query_point(x), filter.query_range(x, x));
        }
    }

    #[test]
    fn test_stores_agree(
        values in sorted_values(),
        queries in prop::collection::vec((0..60_000u64, 0..2_000u64), 1..50),
    ) {
        let ef = EliasFanoStore::from_sorted(&values).unwrap();
        let sv = SortedVecStore::from_sorted(&values).unwrap();

        prop_assert_eq!(ef.len(), values.len());
        prop_assert_eq!(ef.min_value(), values.first().copied());
        prop_assert_eq!(ef.max_value(), values.last().copied());
        prop_assert_eq!(ef.iter().collect::<Vec<_>>(), values.clone());

        for (lo, width) in queries {
            let hi = lo + width;
            let expected = naive_nonempty(&values, lo, hi);
            prop_assert_eq!(ef.contains_range(lo, hi), expected);
            prop_assert_eq!(sv.contains_range(lo, hi), expected);
            prop_assert_eq!(ef.count_range(lo, hi), sv.count_range(lo, hi));
            prop_assert_eq!(ef.predecessor(hi), sv.predecessor(hi));
        }
    }

    #[test]
    fn test_bucketing_unit_buckets_are_exact(
        values in sorted_values(),
        queries in prop::collection::vec((0..60_000u64, 0..500u64), 1..50),
    ) {
        let filter = BucketingFilterBuilder::new().bucket_size(1).build(&values).unwrap();
        for (lo, width) in queries {
            let hi = lo + width;
            prop_assert_eq!(filter.query_range(lo, hi), naive_nonempty(&values, lo, hi));
        }
    }

    #[test]
    fn test_bucketing_has_no_false_negatives(
        values in sorted_values(),
        bucket_size in 1u64..5_000,
    ) {
        let filter = BucketingFilterBuilder::new().bucket_size(bucket_size).build(&values).unwrap();
        for &v in &values {
            prop_assert!(filter.query_point(v));
            prop_assert!(filter.query_range(v.saturating_sub(3), v + 3));
        }
    }

    #[test]
    fn test_binary_round_trip_keeps_answers(
        keys in key_set(),
        bpk in 2.0f64..16.0,
        seed in any::<u64>(),
        probes in prop::collection::vec((0..KEY_SPACE, 0u64..1 << 16), 1..30),
    ) {
        let filter = GrafiteFilterBuilder::new().bits_per_key(bpk).seed(seed).build(&keys).unwrap();
        let restored: GrafiteFilter = GrafiteFilter::from_bytes(&filter.to_bytes().unwrap()).unwrap();
        for (left, width) in probes {
            prop_assert_eq!(
                restored.query_range(left, left + width),
                filter.query_range(left, left + width)
            );
        }
    }

    #[test]
    fn test_bitvec_rank_select(
        words in prop::collection::vec(any::<u64>(), 1..40),
        trim in 0..64usize,
    ) {
        let len = (words.len() * 64).saturating_sub(trim);
        let bv = BitVec::from_words(words.clone(), len).unwrap();

        let bit = |i: usize| words[i / 64] >> (i % 64) & 1 == 1;
        let mut ones = 0usize;
        for i in 0..len {
            if i % 7 == 0 {
                prop_assert_eq!(bv.rank1(i), ones);
                prop_assert_eq!(bv.rank0(i), i - ones);
            }
            if bit(i) {
                prop_assert_eq!(bv.select1(ones), Some(i));
                ones += 1;
            } else {
                prop_assert_eq!(bv.select0(i - ones), Some(i));
            }
        }
        prop_assert_eq!(bv.rank1(len), ones);
        prop_assert_eq!(bv.select1(ones), None);
        prop_assert_eq!(bv.select0(len - ones), None);
    }
}
