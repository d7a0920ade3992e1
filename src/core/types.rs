use serde::{Deserialize, Serialize};

/// A numeric input as it arrives from a form field or JSON payload: either an
/// actual number or free-form text, including the empty string a user leaves
/// behind mid-edit. Everything funnels through [`RawValue::sanitize`] before it
/// reaches the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Collapse to a definite number: empty or unparseable text and non-finite
    /// numbers become 0. Idempotent.
    pub fn sanitize(&self) -> f64 {
        match self {
            RawValue::Number(n) if n.is_finite() => *n,
            RawValue::Number(_) => 0.0,
            RawValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return 0.0;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => n,
                    _ => 0.0,
                }
            }
        }
    }

    /// Sanitize a per-fund allocation entry. Entries live in [0, 100]; the
    /// clamp happens here at the input boundary, not inside the engine.
    pub fn sanitize_allocation(&self) -> f64 {
        self.sanitize().clamp(0.0, 100.0)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// One entry of the static fund catalog. The catalog is fixed at build time
/// and passed into the core as read-only configuration.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "yield")]
    pub yield_pct: f64,
    pub risk_level: RiskLevel,
}

/// Derived per-bucket stats. `total_allocation` is informational: the UI flags
/// totals away from 100% but the engine never requires the sum to be 100.
#[derive(Copy, Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub total_allocation: f64,
    pub weighted_yield: f64,
}

/// Fully sanitized engine inputs. All rate fields are plain annual percentage
/// points (e.g. 3.375), not fractions.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub property_value: f64,
    pub mortgage_ltv: f64,
    pub mortgage_rate: f64,
    pub mortgage_tenure: f64,
    pub own_cash: f64,
    pub reserve_cash_percent: f64,
    pub allocation_income: f64,
    pub income_yield: f64,
    pub hedge_yield: f64,
    pub fee_rate_initial: f64,
    pub fee_rate_ongoing: f64,
    pub fee_switch_year: u32,
    pub surrender_penalty_years: u32,
    pub surrender_penalty_rate: f64,
}

/// One row of the 30-year projection. `hedge_av` is the displayed value,
/// floored at zero; the engine's internal hedge trajectory may run negative.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationYear {
    pub year: u32,
    pub income_av: f64,
    pub hedge_av: f64,
    pub reserve_cash: f64,
    pub total_av: f64,
    pub surrender_value: f64,
    pub total_fees_paid: f64,
    pub mortgage_balance: f64,
    pub net_equity: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub loan_amount: f64,
    pub own_cash: f64,
    pub invested_amount: f64,
    pub reserve_cash: f64,
    pub monthly_mortgage: f64,
    pub monthly_dividend: f64,
    pub net_monthly_cash_flow: f64,
    pub yearly_data: Vec<SimulationYear>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::proptest;

    #[test]
    fn sanitize_passes_plain_numbers_through() {
        assert_eq!(RawValue::from(3.375).sanitize(), 3.375);
        assert_eq!(RawValue::from(-12.5).sanitize(), -12.5);
        assert_eq!(RawValue::from(0.0).sanitize(), 0.0);
    }

    #[test]
    fn sanitize_maps_empty_and_garbage_text_to_zero() {
        assert_eq!(RawValue::from("").sanitize(), 0.0);
        assert_eq!(RawValue::from("   ").sanitize(), 0.0);
        assert_eq!(RawValue::from("abc").sanitize(), 0.0);
        assert_eq!(RawValue::from("12px").sanitize(), 0.0);
        assert_eq!(RawValue::from("inf").sanitize(), 0.0);
        assert_eq!(RawValue::from("NaN").sanitize(), 0.0);
    }

    #[test]
    fn sanitize_parses_numeric_text_with_whitespace() {
        assert_eq!(RawValue::from(" 8000000 ").sanitize(), 8_000_000.0);
        assert_eq!(RawValue::from("3.375").sanitize(), 3.375);
        assert_eq!(RawValue::from("-7").sanitize(), -7.0);
    }

    #[test]
    fn sanitize_maps_non_finite_numbers_to_zero() {
        assert_eq!(RawValue::Number(f64::NAN).sanitize(), 0.0);
        assert_eq!(RawValue::Number(f64::INFINITY).sanitize(), 0.0);
        assert_eq!(RawValue::Number(f64::NEG_INFINITY).sanitize(), 0.0);
    }

    #[test]
    fn sanitize_allocation_clamps_to_percent_range() {
        assert_eq!(RawValue::from(150.0).sanitize_allocation(), 100.0);
        assert_eq!(RawValue::from(-5.0).sanitize_allocation(), 0.0);
        assert_eq!(RawValue::from("42").sanitize_allocation(), 42.0);
        assert_eq!(RawValue::from("").sanitize_allocation(), 0.0);
    }

    proptest! {
        // Sanitizing an already-sanitized value changes nothing, whatever the
        // input looked like.
        #[test]
        fn prop_sanitize_is_idempotent_over_numbers(x in proptest::num::f64::ANY) {
            let once = RawValue::Number(x).sanitize();
            assert_eq!(RawValue::Number(once).sanitize(), once);
        }

        #[test]
        fn prop_sanitize_is_idempotent_over_text(s in ".{0,24}") {
            let once = RawValue::Text(s).sanitize();
            assert_eq!(RawValue::Number(once).sanitize(), once);
        }
    }

    #[test]
    fn raw_value_deserializes_from_number_or_string() {
        let n: RawValue = serde_json::from_str("70").expect("number form");
        let s: RawValue = serde_json::from_str("\"70\"").expect("string form");
        let e: RawValue = serde_json::from_str("\"\"").expect("empty form");
        assert_eq!(n.sanitize(), 70.0);
        assert_eq!(s.sanitize(), 70.0);
        assert_eq!(e.sanitize(), 0.0);
    }
}
