use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{ArgAction, Parser, error::ErrorKind};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    GrowthSample, MAX_MONTHS, MONTHS_PER_YEAR, SimulationParameters, SimulationResult,
    derive_target_from_spending, required_monthly_contribution, simulate,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const DEFAULT_INITIAL_BALANCE: f64 = 55_000.0;
const DEFAULT_MONTHLY_CONTRIBUTION: f64 = 2_000.0;
const DEFAULT_ANNUAL_SPENDING: f64 = 100_000.0;
const DEFAULT_WITHDRAWAL_RATE: f64 = 4.0;
const DEFAULT_RETURN_RATE: f64 = 7.0;
const DEFAULT_INFLATION_RATE: f64 = 2.5;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    initial_balance: Option<f64>,
    monthly_contribution: Option<f64>,
    return_rate: Option<f64>,
    inflation_rate: Option<f64>,
    adjust_for_inflation: Option<bool>,

    target_balance: Option<f64>,
    annual_spending: Option<f64>,
    withdrawal_rate: Option<f64>,

    target_years: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "fire-sim simulate",
    about = "Project how long compounding savings take to reach a FIRE target",
    allow_negative_numbers = true
)]
struct Cli {
    #[arg(long, default_value_t = DEFAULT_INITIAL_BALANCE, help = "Current invested savings")]
    initial_balance: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_MONTHLY_CONTRIBUTION,
        help = "Amount invested each month; negative models a withdrawal"
    )]
    monthly_contribution: f64,
    #[arg(long, default_value_t = DEFAULT_RETURN_RATE, help = "Expected annual return (%)")]
    return_rate: f64,
    #[arg(long, default_value_t = DEFAULT_INFLATION_RATE, help = "Expected annual inflation (%)")]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        help = "Report balances in today's money"
    )]
    adjust_for_inflation: bool,
    #[arg(
        long,
        help = "Explicit FIRE number; overrides --annual-spending / --withdrawal-rate"
    )]
    target_balance: Option<f64>,
    #[arg(long, default_value_t = DEFAULT_ANNUAL_SPENDING, help = "Desired annual spending in retirement")]
    annual_spending: f64,
    #[arg(long, default_value_t = DEFAULT_WITHDRAWAL_RATE, help = "Safe withdrawal rate (%)")]
    withdrawal_rate: f64,
    #[arg(
        long,
        help = "Also solve for the monthly contribution that hits the target in this many years"
    )]
    target_years: Option<f64>,
    #[arg(long, help = "Print the JSON document the HTTP API returns")]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
struct ApiRequest {
    params: SimulationParameters,
    horizon_months: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    target_balance: f64,
    adjust_for_inflation: bool,
    years_to_target: f64,
    crossover_years: Option<f64>,
    target_reached: bool,
    months_simulated: usize,
    horizon_years: Option<f64>,
    required_monthly_contribution: Option<f64>,
    samples: Vec<GrowthSample>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_request(cli: &Cli) -> Result<ApiRequest, String> {
    for (name, value) in [
        ("--initial-balance", cli.initial_balance),
        ("--monthly-contribution", cli.monthly_contribution),
        ("--return-rate", cli.return_rate),
        ("--inflation-rate", cli.inflation_rate),
        ("--annual-spending", cli.annual_spending),
        ("--withdrawal-rate", cli.withdrawal_rate),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }

    if cli.initial_balance < 0.0 {
        return Err("--initial-balance must be >= 0".to_string());
    }

    let target_balance = match cli.target_balance {
        Some(v) if !v.is_finite() => {
            return Err("--target-balance must be a finite number".to_string());
        }
        Some(v) => v,
        None => {
            let derived = derive_target_from_spending(cli.annual_spending, cli.withdrawal_rate)
                .map_err(|e| format!("--withdrawal-rate: {e}"))?;
            if !derived.is_finite() {
                return Err(
                    "--withdrawal-rate is too small to derive a finite FIRE number".to_string(),
                );
            }
            derived
        }
    };

    let max_years = MAX_MONTHS as f64 / MONTHS_PER_YEAR;
    let horizon_months = match cli.target_years {
        Some(years) if !years.is_finite() || years < 0.0 => {
            return Err("--target-years must be >= 0".to_string());
        }
        Some(years) if years > max_years => {
            return Err(format!("--target-years must be <= {max_years:.0}"));
        }
        Some(years) => Some((years * MONTHS_PER_YEAR).round() as u32),
        None => None,
    };

    Ok(ApiRequest {
        params: SimulationParameters {
            initial_balance: cli.initial_balance,
            monthly_contribution: cli.monthly_contribution,
            annual_return_rate: cli.return_rate / 100.0,
            annual_inflation_rate: cli.inflation_rate / 100.0,
            target_balance,
            adjust_for_inflation: cli.adjust_for_inflation,
        },
        horizon_months,
    })
}

fn resolve_required_contribution(request: &ApiRequest) -> Result<Option<f64>, String> {
    let Some(months) = request.horizon_months else {
        return Ok(None);
    };
    let params = &request.params;
    required_monthly_contribution(
        params.target_balance,
        params.initial_balance,
        params.annual_return_rate / MONTHS_PER_YEAR,
        months,
    )
    .map(Some)
    .map_err(|e| format!("--target-years: {e}"))
}

/// Parses `simulate` flags (the first element is the command name) and renders
/// either the text report or the JSON response body.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(e.to_string());
        }
        Err(e) => return Err(e.to_string()),
    };

    let request = build_request(&cli)?;
    let required = resolve_required_contribution(&request)?;
    let result = simulate(&request.params);
    log_outcome(&request, &result);
    let response = build_simulate_response(&request, &result, required);

    if cli.json {
        serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode JSON: {e}"))
    } else {
        Ok(render_report(&response))
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "FIRE HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/");

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

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    let required = match resolve_required_contribution(&request) {
        Ok(required) => required,
        Err(msg) => {
            warn!(error = %msg, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    debug!(
        target_balance = request.params.target_balance,
        horizon_months = ?request.horizon_months,
        "simulate request accepted"
    );
    let result = simulate(&request.params);
    log_outcome(&request, &result);
    json_response(
        StatusCode::OK,
        build_simulate_response(&request, &result, required),
    )
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Outcome {
    AlreadyMet,
    Reached,
    Capped,
}

fn classify_outcome(result: &SimulationResult, target_balance: f64) -> Outcome {
    if result.samples.is_empty() {
        Outcome::AlreadyMet
    } else if result.reached_target(target_balance) {
        Outcome::Reached
    } else {
        Outcome::Capped
    }
}

fn log_outcome(request: &ApiRequest, result: &SimulationResult) {
    let target_balance = request.params.target_balance;
    match classify_outcome(result, target_balance) {
        Outcome::AlreadyMet => debug!(
            target_balance,
            initial_balance = request.params.initial_balance,
            "target already met by initial balance"
        ),
        Outcome::Reached => debug!(
            target_balance,
            years_to_target = result.years_to_target,
            crossover_years = ?result.crossover_years,
            "simulation reached target"
        ),
        Outcome::Capped => info!(
            target_balance,
            max_months = MAX_MONTHS,
            "target not reached before the month cap"
        ),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
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
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_balance {
        cli.initial_balance = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.return_rate {
        cli.return_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.adjust_for_inflation {
        cli.adjust_for_inflation = v;
    }

    cli.target_balance = payload.target_balance;
    if let Some(v) = payload.annual_spending {
        cli.annual_spending = v;
    }
    if let Some(v) = payload.withdrawal_rate {
        cli.withdrawal_rate = v;
    }
    cli.target_years = payload.target_years;

    build_request(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_balance: DEFAULT_INITIAL_BALANCE,
        monthly_contribution: DEFAULT_MONTHLY_CONTRIBUTION,
        return_rate: DEFAULT_RETURN_RATE,
        inflation_rate: DEFAULT_INFLATION_RATE,
        adjust_for_inflation: true,
        target_balance: None,
        annual_spending: DEFAULT_ANNUAL_SPENDING,
        withdrawal_rate: DEFAULT_WITHDRAWAL_RATE,
        target_years: None,
        json: false,
    }
}

fn build_simulate_response(
    request: &ApiRequest,
    result: &SimulationResult,
    required_monthly_contribution: Option<f64>,
) -> SimulateResponse {
    let target_balance = request.params.target_balance;
    SimulateResponse {
        target_balance,
        adjust_for_inflation: request.params.adjust_for_inflation,
        years_to_target: result.years_to_target,
        crossover_years: result.crossover_years,
        target_reached: result.reached_target(target_balance),
        months_simulated: result.months_simulated(),
        horizon_years: request
            .horizon_months
            .map(|months| months as f64 / MONTHS_PER_YEAR),
        required_monthly_contribution,
        samples: result.samples.clone(),
    }
}

fn render_report(response: &SimulateResponse) -> String {
    let mut lines = vec![format!(
        "FIRE Number: {}",
        format_currency(response.target_balance)
    )];

    if response.target_reached || response.months_simulated == 0 {
        lines.push(format!("Years to FIRE: {:.1} years", response.years_to_target));
    } else {
        lines.push(format!(
            "Years to FIRE: not reached within {:.0} years",
            response.years_to_target
        ));
    }

    if let Some(crossover) = response.crossover_years {
        lines.push(format!("Compound Interest Crossover: {crossover:.1} years"));
    }

    if let (Some(pmt), Some(years)) = (
        response.required_monthly_contribution,
        response.horizon_years,
    ) {
        lines.push(format!(
            "Required Monthly Contribution: {} (to reach target in {years:.1} years)",
            format_currency(pmt)
        ));
    }

    if let Some(last) = response.samples.last() {
        let label = if response.adjust_for_inflation {
            "today's money"
        } else {
            "nominal"
        };
        lines.push(format!(
            "Final Balance: {} ({label})",
            format_currency(last.balance)
        ));
    }

    lines.join("\n")
}

/// Whole dollars with thousands separators, e.g. `$2,500,000`.
fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
