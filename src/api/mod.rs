use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    Inputs, PortfolioStats, RawValue, SimulationResult, SimulationYear, blended_yield,
    compute_stats, defaults, fund_catalog,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// How the annual mortgage rate is derived. `H` adds a spread to the live
/// reference rate supplied by the client; `Cap` subtracts a spread from the
/// prime rate. The engine only ever sees the resolved percentage.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRateMode {
    H,
    Cap,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRateMode {
    #[serde(alias = "H", alias = "hibor")]
    H,
    #[serde(alias = "Cap", alias = "prime")]
    Cap,
}

impl From<ApiRateMode> for CliRateMode {
    fn from(value: ApiRateMode) -> Self {
        match value {
            ApiRateMode::H => CliRateMode::H,
            ApiRateMode::Cap => CliRateMode::Cap,
        }
    }
}

impl From<CliRateMode> for ApiRateMode {
    fn from(value: CliRateMode) -> Self {
        match value {
            CliRateMode::H => ApiRateMode::H,
            CliRateMode::Cap => ApiRateMode::Cap,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    property_value: Option<RawValue>,
    mortgage_ltv: Option<RawValue>,
    mortgage_rate: Option<RawValue>,
    mortgage_tenure: Option<RawValue>,
    own_cash: Option<RawValue>,
    reserve_cash_percent: Option<RawValue>,
    allocation_income: Option<RawValue>,

    rate_mode: Option<ApiRateMode>,
    hibor_rate: Option<RawValue>,
    spread_rate: Option<RawValue>,
    prime_rate: Option<RawValue>,
    cap_spread: Option<RawValue>,

    income_allocations: Option<HashMap<String, RawValue>>,
    hedge_allocations: Option<HashMap<String, RawValue>>,

    fee_rate_initial: Option<RawValue>,
    fee_rate_ongoing: Option<RawValue>,
    fee_switch_year: Option<u32>,
    surrender_penalty_years: Option<u32>,
    surrender_penalty_rate: Option<RawValue>,
}

#[derive(Parser, Debug)]
#[command(
    name = "propsim",
    about = "Property leverage projection: mortgage amortization + two-bucket fund portfolio over 30 years"
)]
struct Cli {
    #[arg(long, default_value_t = defaults::PROPERTY_VALUE)]
    property_value: f64,
    #[arg(long, default_value_t = defaults::MORTGAGE_LTV, help = "Loan-to-value ratio in percent")]
    mortgage_ltv: f64,
    #[arg(
        long,
        help = "Annual mortgage rate in percent; overridden by --rate-mode derivation when that flag is set"
    )]
    mortgage_rate: Option<f64>,
    #[arg(
        long,
        value_enum,
        help = "Derive the rate instead: h = reference + spread, cap = prime - cap spread"
    )]
    rate_mode: Option<CliRateMode>,
    #[arg(
        long,
        default_value_t = 3.66,
        help = "Reference interbank rate in percent (supplied externally, e.g. 1M HIBOR)"
    )]
    hibor_rate: f64,
    #[arg(long, default_value_t = 1.3, help = "Spread over the reference rate in percent")]
    spread_rate: f64,
    #[arg(long, default_value_t = 5.875, help = "Prime rate in percent")]
    prime_rate: f64,
    #[arg(long, default_value_t = 2.5, help = "Discount below prime in percent")]
    cap_spread: f64,
    #[arg(long, default_value_t = defaults::MORTGAGE_TENURE, help = "Mortgage tenure in years")]
    mortgage_tenure: f64,
    #[arg(long, default_value_t = defaults::OWN_CASH, help = "Supplementary own cash added to the invested capital")]
    own_cash: f64,
    #[arg(
        long,
        default_value_t = defaults::RESERVE_CASH_PERCENT,
        help = "Percent of total capital held as uninvested reserve cash (0-50)"
    )]
    reserve_cash_percent: f64,
    #[arg(
        long,
        default_value_t = defaults::ALLOCATION_INCOME,
        help = "Percent of invested capital in the income bucket; the hedge bucket takes the rest"
    )]
    allocation_income: f64,
    #[arg(
        long,
        value_name = "FUND=PCT",
        help = "Income bucket allocation entry, repeatable; defaults to 100% in the first catalog fund"
    )]
    income_allocation: Vec<String>,
    #[arg(
        long,
        value_name = "FUND=PCT",
        help = "Hedge bucket allocation entry, repeatable; defaults to 100% in the first catalog fund"
    )]
    hedge_allocation: Vec<String>,
    #[arg(long, default_value_t = defaults::FEE_RATE_INITIAL, help = "Annual fee percent for the initial years")]
    fee_rate_initial: f64,
    #[arg(long, default_value_t = defaults::FEE_RATE_ONGOING, help = "Annual fee percent afterwards")]
    fee_rate_ongoing: f64,
    #[arg(long, default_value_t = defaults::FEE_SWITCH_YEAR, help = "Last year charged at the initial fee rate")]
    fee_switch_year: u32,
    #[arg(long, default_value_t = defaults::SURRENDER_PENALTY_YEARS)]
    surrender_penalty_years: u32,
    #[arg(long, default_value_t = defaults::SURRENDER_PENALTY_RATE, help = "Early-exit penalty percent on the portfolio portion")]
    surrender_penalty_rate: f64,
}

/// Everything a response needs: the resolved engine inputs plus the derived
/// portfolio context the engine itself does not care about.
#[derive(Debug)]
struct SimRequest {
    inputs: Inputs,
    rate_mode: Option<CliRateMode>,
    income_stats: PortfolioStats,
    hedge_stats: PortfolioStats,
    blended_yield: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    rate_mode: Option<ApiRateMode>,
    effective_rate: f64,
    income_stats: PortfolioStats,
    hedge_stats: PortfolioStats,
    blended_yield: f64,
    loan_amount: f64,
    own_cash: f64,
    invested_amount: f64,
    reserve_cash: f64,
    monthly_mortgage: f64,
    monthly_dividend: f64,
    net_monthly_cash_flow: f64,
    yearly_data: Vec<SimulationYear>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn parse_allocation_entries(
    flag: &str,
    entries: &[String],
) -> Result<HashMap<String, RawValue>, String> {
    let mut map = HashMap::new();
    for entry in entries {
        let Some((id, value)) = entry.split_once('=') else {
            return Err(format!("{flag} entries must look like FUND=PCT, got '{entry}'"));
        };
        let id = id.trim();
        if !fund_catalog().iter().any(|f| f.id == id) {
            return Err(format!("unknown fund id '{id}' in {flag}"));
        }
        map.insert(id.to_string(), RawValue::from(value.trim()));
    }
    Ok(map)
}

fn default_allocations() -> HashMap<String, RawValue> {
    let mut map = HashMap::new();
    if let Some(first) = fund_catalog().first() {
        map.insert(first.id.to_string(), RawValue::from(100.0));
    }
    map
}

/// Rate precedence: an explicit mode wins, then a directly supplied rate,
/// then the reference default.
fn resolve_rate(cli: &Cli) -> f64 {
    match cli.rate_mode {
        Some(CliRateMode::H) => cli.hibor_rate + cli.spread_rate,
        Some(CliRateMode::Cap) => cli.prime_rate - cli.cap_spread,
        None => cli.mortgage_rate.unwrap_or(defaults::MORTGAGE_RATE),
    }
}

fn build_request(
    cli: Cli,
    income_allocations: HashMap<String, RawValue>,
    hedge_allocations: HashMap<String, RawValue>,
) -> SimRequest {
    let catalog = fund_catalog();
    let income_stats = compute_stats(&income_allocations, catalog);
    let hedge_stats = compute_stats(&hedge_allocations, catalog);

    // Bounded UI controls clamp here rather than erroring; everything else is
    // already a definite number and the engine is total over it.
    let allocation_income = cli.allocation_income.clamp(0.0, 100.0);
    let reserve_cash_percent = cli.reserve_cash_percent.clamp(0.0, 50.0);

    let inputs = Inputs {
        property_value: cli.property_value,
        mortgage_ltv: cli.mortgage_ltv,
        mortgage_rate: resolve_rate(&cli),
        mortgage_tenure: cli.mortgage_tenure,
        own_cash: cli.own_cash,
        reserve_cash_percent,
        allocation_income,
        income_yield: income_stats.weighted_yield,
        hedge_yield: hedge_stats.weighted_yield,
        fee_rate_initial: cli.fee_rate_initial,
        fee_rate_ongoing: cli.fee_rate_ongoing,
        fee_switch_year: cli.fee_switch_year,
        surrender_penalty_years: cli.surrender_penalty_years,
        surrender_penalty_rate: cli.surrender_penalty_rate,
    };

    SimRequest {
        blended_yield: blended_yield(allocation_income, income_stats, hedge_stats),
        rate_mode: cli.rate_mode,
        income_stats,
        hedge_stats,
        inputs,
    }
}

fn request_from_payload(payload: SimulatePayload) -> SimRequest {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.property_value {
        cli.property_value = v.sanitize();
    }
    if let Some(v) = payload.mortgage_ltv {
        cli.mortgage_ltv = v.sanitize();
    }
    if let Some(v) = payload.mortgage_rate {
        cli.mortgage_rate = Some(v.sanitize());
    }
    if let Some(v) = payload.mortgage_tenure {
        cli.mortgage_tenure = v.sanitize();
    }
    if let Some(v) = payload.own_cash {
        cli.own_cash = v.sanitize();
    }
    if let Some(v) = payload.reserve_cash_percent {
        cli.reserve_cash_percent = v.sanitize();
    }
    if let Some(v) = payload.allocation_income {
        cli.allocation_income = v.sanitize();
    }

    if let Some(v) = payload.rate_mode {
        cli.rate_mode = Some(v.into());
    }
    if let Some(v) = payload.hibor_rate {
        cli.hibor_rate = v.sanitize();
    }
    if let Some(v) = payload.spread_rate {
        cli.spread_rate = v.sanitize();
    }
    if let Some(v) = payload.prime_rate {
        cli.prime_rate = v.sanitize();
    }
    if let Some(v) = payload.cap_spread {
        cli.cap_spread = v.sanitize();
    }

    if let Some(v) = payload.fee_rate_initial {
        cli.fee_rate_initial = v.sanitize();
    }
    if let Some(v) = payload.fee_rate_ongoing {
        cli.fee_rate_ongoing = v.sanitize();
    }
    if let Some(v) = payload.fee_switch_year {
        cli.fee_switch_year = v;
    }
    if let Some(v) = payload.surrender_penalty_years {
        cli.surrender_penalty_years = v;
    }
    if let Some(v) = payload.surrender_penalty_rate {
        cli.surrender_penalty_rate = v.sanitize();
    }

    let income = payload.income_allocations.unwrap_or_else(default_allocations);
    let hedge = payload.hedge_allocations.unwrap_or_else(default_allocations);
    build_request(cli, income, hedge)
}

fn default_cli_for_api() -> Cli {
    Cli {
        property_value: defaults::PROPERTY_VALUE,
        mortgage_ltv: defaults::MORTGAGE_LTV,
        mortgage_rate: None,
        rate_mode: None,
        hibor_rate: 3.66,
        spread_rate: 1.3,
        prime_rate: 5.875,
        cap_spread: 2.5,
        mortgage_tenure: defaults::MORTGAGE_TENURE,
        own_cash: defaults::OWN_CASH,
        reserve_cash_percent: defaults::RESERVE_CASH_PERCENT,
        allocation_income: defaults::ALLOCATION_INCOME,
        income_allocation: Vec::new(),
        hedge_allocation: Vec::new(),
        fee_rate_initial: defaults::FEE_RATE_INITIAL,
        fee_rate_ongoing: defaults::FEE_RATE_ONGOING,
        fee_switch_year: defaults::FEE_SWITCH_YEAR,
        surrender_penalty_years: defaults::SURRENDER_PENALTY_YEARS,
        surrender_penalty_rate: defaults::SURRENDER_PENALTY_RATE,
    }
}

fn run_request(request: &SimRequest) -> SimulateResponse {
    let result: SimulationResult = crate::core::simulate(&request.inputs);
    SimulateResponse {
        rate_mode: request.rate_mode.map(ApiRateMode::from),
        effective_rate: request.inputs.mortgage_rate,
        income_stats: request.income_stats,
        hedge_stats: request.hedge_stats,
        blended_yield: request.blended_yield,
        loan_amount: result.loan_amount,
        own_cash: result.own_cash,
        invested_amount: result.invested_amount,
        reserve_cash: result.reserve_cash,
        monthly_mortgage: result.monthly_mortgage,
        monthly_dividend: result.monthly_dividend,
        net_monthly_cash_flow: result.net_monthly_cash_flow,
        yearly_data: result.yearly_data,
    }
}

/// One-shot CLI mode: build inputs from flags, run the projection, print JSON.
pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let income = if cli.income_allocation.is_empty() {
        default_allocations()
    } else {
        parse_allocation_entries("--income-allocation", &cli.income_allocation)?
    };
    let hedge = if cli.hedge_allocation.is_empty() {
        default_allocations()
    } else {
        parse_allocation_entries("--hedge-allocation", &cli.hedge_allocation)?
    };

    let request = build_request(cli, income, hedge);
    let response = run_request(&request);
    let json = serde_json::to_string_pretty(&response)
        .map_err(|e| format!("Failed to serialize result: {e}"))?;
    println!("{json}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/funds", get(funds_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("propsim HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn funds_handler() -> Response {
    json_response(StatusCode::OK, fund_catalog())
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = request_from_payload(payload);
    json_response(StatusCode::OK, run_request(&request))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<SimRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(request_from_payload(payload))
}
