use std::collections::HashMap;

use super::types::{Fund, PortfolioStats, RawValue};

/// Aggregate one bucket's allocation map against the fund catalog.
///
/// Iterates the catalog rather than the map, so absent funds count as zero and
/// stray keys are ignored. Total over its sanitized domain; the allocation sum
/// is reported as-is even when it is nowhere near 100%.
pub fn compute_stats(allocations: &HashMap<String, RawValue>, catalog: &[Fund]) -> PortfolioStats {
    let mut total_allocation = 0.0;
    let mut weighted_yield = 0.0;
    for fund in catalog {
        let alloc = allocations
            .get(fund.id)
            .map(RawValue::sanitize_allocation)
            .unwrap_or(0.0);
        total_allocation += alloc;
        weighted_yield += fund.yield_pct * (alloc / 100.0);
    }
    PortfolioStats {
        total_allocation,
        weighted_yield,
    }
}

/// Blend the two bucket yields by the income-vs-hedge split percentage.
pub fn blended_yield(income_split: f64, income: PortfolioStats, hedge: PortfolioStats) -> f64 {
    (income_split * income.weighted_yield + (100.0 - income_split) * hedge.weighted_yield) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::fund_catalog;
    use proptest::prelude::proptest;

    const EPS: f64 = 1e-9;

    fn allocations(entries: &[(&str, RawValue)]) -> HashMap<String, RawValue> {
        entries
            .iter()
            .map(|(id, v)| (id.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_map_yields_zero_stats() {
        let stats = compute_stats(&HashMap::new(), fund_catalog());
        assert_eq!(stats.total_allocation, 0.0);
        assert_eq!(stats.weighted_yield, 0.0);
    }

    #[test]
    fn single_fund_full_allocation_matches_fund_yield() {
        let stats = compute_stats(&allocations(&[("barings", 100.0.into())]), fund_catalog());
        assert!((stats.total_allocation - 100.0).abs() < EPS);
        assert!((stats.weighted_yield - 9.94).abs() < EPS);
    }

    #[test]
    fn split_allocation_weights_each_fund() {
        let stats = compute_stats(
            &allocations(&[("barings", 50.0.into()), ("capital_group", 50.0.into())]),
            fund_catalog(),
        );
        assert!((stats.total_allocation - 100.0).abs() < EPS);
        assert!((stats.weighted_yield - (9.94 * 0.5 + 4.80 * 0.5)).abs() < EPS);
    }

    #[test]
    fn mid_edit_empty_entries_count_as_zero() {
        let stats = compute_stats(
            &allocations(&[("barings", "".into()), ("allianz", "40".into())]),
            fund_catalog(),
        );
        assert!((stats.total_allocation - 40.0).abs() < EPS);
        assert!((stats.weighted_yield - 8.08 * 0.4).abs() < EPS);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let stats = compute_stats(
            &allocations(&[("not_a_fund", 100.0.into()), ("aia", 25.0.into())]),
            fund_catalog(),
        );
        assert!((stats.total_allocation - 25.0).abs() < EPS);
        assert!((stats.weighted_yield - 7.07 * 0.25).abs() < EPS);
    }

    #[test]
    fn oversized_entries_are_clamped_not_rejected() {
        let stats = compute_stats(&allocations(&[("barings", 250.0.into())]), fund_catalog());
        assert!((stats.total_allocation - 100.0).abs() < EPS);
    }

    #[test]
    fn under_allocated_bucket_reports_partial_total() {
        // A 60% total is reported as-is; flagging it is the UI's job.
        let stats = compute_stats(&allocations(&[("fidelity", 60.0.into())]), fund_catalog());
        assert!((stats.total_allocation - 60.0).abs() < EPS);
        assert!((stats.weighted_yield - 7.36 * 0.6).abs() < EPS);
    }

    #[test]
    fn blended_yield_with_all_zero_allocations_is_zero() {
        let zero = compute_stats(&HashMap::new(), fund_catalog());
        assert_eq!(blended_yield(70.0, zero, zero), 0.0);
        assert_eq!(blended_yield(0.0, zero, zero), 0.0);
    }

    proptest! {
        #[test]
        fn prop_blended_yield_stays_between_bucket_yields(
            split_pct in 0u32..=100,
            income_alloc in 0u32..=100,
            hedge_alloc in 0u32..=100
        ) {
            let income = compute_stats(
                &allocations(&[("barings", (income_alloc as f64).into())]),
                fund_catalog(),
            );
            let hedge = compute_stats(
                &allocations(&[("capital_group", (hedge_alloc as f64).into())]),
                fund_catalog(),
            );
            let blended = blended_yield(split_pct as f64, income, hedge);
            let lo = income.weighted_yield.min(hedge.weighted_yield);
            let hi = income.weighted_yield.max(hedge.weighted_yield);
            assert!(blended >= lo - EPS && blended <= hi + EPS);
        }
    }
}
