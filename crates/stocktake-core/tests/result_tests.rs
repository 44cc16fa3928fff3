//! Algebraic properties of MergeResult

use proptest::prelude::*;
use stocktake_core::MergeResult;

fn merge_result() -> impl Strategy<Value = MergeResult> {
    (0usize..1000, 0usize..1000, 0usize..1000).prop_map(|(unlinked, updated, created)| {
        MergeResult {
            unlinked,
            updated,
            created,
        }
    })
}

proptest! {
    #[test]
    fn zero_is_identity(a in merge_result()) {
        prop_assert_eq!(a + MergeResult::zero(), a);
        prop_assert_eq!(MergeResult::zero() + a, a);
    }

    #[test]
    fn addition_is_commutative(a in merge_result(), b in merge_result()) {
        prop_assert_eq!(a + b, b + a);
    }

    #[test]
    fn addition_is_associative(a in merge_result(), b in merge_result(), c in merge_result()) {
        prop_assert_eq!((a + b) + c, a + (b + c));
    }

    #[test]
    fn combine_matches_fold(results in prop::collection::vec(merge_result(), 0..20)) {
        let folded = results.iter().fold(MergeResult::zero(), |acc, r| acc + *r);
        prop_assert_eq!(MergeResult::combine(results.clone()), folded);
        prop_assert_eq!(results.iter().sum::<MergeResult>(), folded);
    }

    #[test]
    fn total_is_additive(a in merge_result(), b in merge_result()) {
        prop_assert_eq!((a + b).total(), a.total() + b.total());
    }
}

#[test]
fn combine_of_nothing_is_zero() {
    assert_eq!(MergeResult::combine(Vec::new()), MergeResult::zero());
    assert!(MergeResult::zero().is_noop());
}
