use proptest::prelude::*;
use scalebench_core::types::{DimensionKind, DimensionPoint, ScalingDimension};

proptest! {
    #[test]
    fn point_equality_ignores_insertion_order(size in any::<u64>(), units in 1u64..64) {
        let a = DimensionPoint::new()
            .with(DimensionKind::InputSize, size)
            .with(DimensionKind::Concurrency, units);
        let b = DimensionPoint::new()
            .with(DimensionKind::Concurrency, units)
            .with(DimensionKind::InputSize, size);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn sorted_sizes_are_non_decreasing(mut values in prop::collection::vec(any::<u64>(), 0..32)) {
        values.sort_unstable();
        prop_assert_eq!(ScalingDimension::input_size(values).first_decrease(), None);
    }

    #[test]
    fn stripping_size_keeps_concurrency(size in any::<u64>(), units in 1u64..64) {
        let p = DimensionPoint::new()
            .with(DimensionKind::InputSize, size)
            .with(DimensionKind::Concurrency, units);
        let stripped = p.without_input_size();
        prop_assert_eq!(stripped.input_size(), None);
        prop_assert_eq!(stripped.concurrency(), units);
    }
}
