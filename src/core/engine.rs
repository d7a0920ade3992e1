use super::types::{Inputs, SimulationResult, SimulationYear};

/// The projection always covers a fixed 30-year horizon regardless of tenure.
pub const PROJECTION_YEARS: u32 = 30;

/// Run the full projection: mortgage sizing, capital split, initial cash-flow
/// metrics, then the 30-year annual loop.
///
/// Pure and total: pathological inputs (zero property value, zero tenure,
/// empty allocations) degrade to flat or zero output instead of an error.
pub fn simulate(inputs: &Inputs) -> SimulationResult {
    let loan_amount = inputs.property_value * (inputs.mortgage_ltv / 100.0);
    let monthly_rate = (inputs.mortgage_rate / 100.0) / 12.0;
    let num_payments = inputs.mortgage_tenure * 12.0;
    let monthly_mortgage = monthly_payment(loan_amount, monthly_rate, num_payments);

    let total_capital = loan_amount + inputs.own_cash;
    let reserve_cash = total_capital * (inputs.reserve_cash_percent / 100.0);
    let invested_amount = total_capital - reserve_cash;

    let initial_income_av = invested_amount * (inputs.allocation_income / 100.0);
    let initial_hedge_av = invested_amount * ((100.0 - inputs.allocation_income) / 100.0);

    let monthly_dividend = initial_income_av * (inputs.income_yield / 100.0) / 12.0;
    let net_monthly_cash_flow = monthly_dividend - monthly_mortgage;

    let mut yearly_data = Vec::with_capacity(PROJECTION_YEARS as usize);

    // The income bucket pays its yield out as dividends and never compounds;
    // only the hedge bucket carries forward.
    let income_av = initial_income_av;
    let mut hedge_av = initial_hedge_av;
    let mut mortgage_balance = loan_amount;

    for year in 1..=PROJECTION_YEARS {
        // Fees are charged on the combined start-of-year account value but
        // deducted from the hedge bucket alone. Modeling simplification
        // carried over from the product sheet; keep as-is.
        let fee_rate = if year <= inputs.fee_switch_year {
            inputs.fee_rate_initial
        } else {
            inputs.fee_rate_ongoing
        };
        let total_fees = (income_av + hedge_av) * (fee_rate / 100.0);

        let hedge_growth = hedge_av * (inputs.hedge_yield / 100.0);
        hedge_av = hedge_av + hedge_growth - total_fees;

        if mortgage_balance > 0.0 {
            for _ in 0..12 {
                if mortgage_balance > 0.0 {
                    if num_payments > 0.0 {
                        let interest = mortgage_balance * monthly_rate;
                        let principal = monthly_mortgage - interest;
                        mortgage_balance -= principal;
                    }
                    if mortgage_balance < 0.0 {
                        mortgage_balance = 0.0;
                    }
                }
            }
        }

        // Reserve cash is liquid and exempt from the early-exit penalty.
        let portfolio_value = income_av + hedge_av;
        let portfolio_surrender = if year <= inputs.surrender_penalty_years {
            portfolio_value * (1.0 - inputs.surrender_penalty_rate / 100.0)
        } else {
            portfolio_value
        };
        let surrender_value = portfolio_surrender + reserve_cash;

        let total_av = income_av + hedge_av.max(0.0);
        let total_assets = total_av + reserve_cash;

        yearly_data.push(SimulationYear {
            year,
            income_av,
            hedge_av: hedge_av.max(0.0),
            reserve_cash,
            total_av,
            surrender_value,
            total_fees_paid: total_fees,
            mortgage_balance,
            net_equity: total_assets - mortgage_balance,
        });
    }

    SimulationResult {
        loan_amount,
        own_cash: inputs.own_cash,
        invested_amount,
        reserve_cash,
        monthly_mortgage,
        monthly_dividend,
        net_monthly_cash_flow,
        yearly_data,
    }
}

/// Closed-form annuity payment. Zero rate falls back to straight-line
/// principal; zero loan or zero tenure pays nothing.
fn monthly_payment(loan_amount: f64, monthly_rate: f64, num_payments: f64) -> f64 {
    if loan_amount > 0.0 && num_payments > 0.0 && monthly_rate > 0.0 {
        let growth = (1.0 + monthly_rate).powf(num_payments);
        loan_amount * monthly_rate * growth / (growth - 1.0)
    } else if loan_amount > 0.0 && num_payments > 0.0 && monthly_rate == 0.0 {
        loan_amount / num_payments
    } else {
        0.0
    }
}
