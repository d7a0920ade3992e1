use super::types::{Fund, RiskLevel};

/// Static fund catalog for the reference deployment. Loaded once, immutable;
/// the engine only ever sees it as a read-only slice.
pub const FUNDS: [Fund; 5] = [
    Fund {
        id: "barings",
        name: "霸菱環球高收益債券基金",
        yield_pct: 9.94,
        risk_level: RiskLevel::High,
    },
    Fund {
        id: "allianz",
        name: "安聯收益及增長基金",
        yield_pct: 8.08,
        risk_level: RiskLevel::Medium,
    },
    Fund {
        id: "fidelity",
        name: "富達美元高收益基金",
        yield_pct: 7.36,
        risk_level: RiskLevel::Medium,
    },
    Fund {
        id: "aia",
        name: "友邦美國高收益債券基金",
        yield_pct: 7.07,
        risk_level: RiskLevel::Medium,
    },
    Fund {
        id: "capital_group",
        name: "資本集團全球公司債券基金",
        yield_pct: 4.80,
        risk_level: RiskLevel::Low,
    },
];

pub fn fund_catalog() -> &'static [Fund] {
    &FUNDS
}

/// Reference deployment defaults shared by the CLI and the API fallback set.
pub mod defaults {
    pub const PROPERTY_VALUE: f64 = 8_000_000.0;
    pub const MORTGAGE_LTV: f64 = 70.0;
    pub const MORTGAGE_RATE: f64 = 3.375;
    pub const MORTGAGE_TENURE: f64 = 30.0;
    pub const OWN_CASH: f64 = 0.0;
    /// Percentage of total capital kept uninvested as reserve cash.
    pub const RESERVE_CASH_PERCENT: f64 = 10.0;
    /// Percentage allocated to the income bucket; the hedge bucket gets the rest.
    pub const ALLOCATION_INCOME: f64 = 70.0;

    /// % per annum charged on the combined account value for the first years.
    pub const FEE_RATE_INITIAL: f64 = 2.35;
    /// % per annum from `FEE_SWITCH_YEAR + 1` onwards.
    pub const FEE_RATE_ONGOING: f64 = 1.0;
    pub const FEE_SWITCH_YEAR: u32 = 5;

    /// Early-exit penalty applies to the portfolio portion for this many years.
    pub const SURRENDER_PENALTY_YEARS: u32 = 2;
    /// Penalty in percent of the portfolio value; reserve cash is exempt.
    pub const SURRENDER_PENALTY_RATE: f64 = 10.0;
}
