//! HTTP routes for quotes and health

use crate::error::{ApiError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sluice_amm::{FeeSchedule, ImpactLevel, ImpactPolicy, PoolSnapshot, QuoteEngine, SwapDirection};
use sluice_config::QuoteConfig;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Server-side defaults for parameters a request may omit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteDefaults {
    pub slippage_bps: u32,
    pub policy: ImpactPolicy,
}

impl From<&QuoteConfig> for QuoteDefaults {
    fn from(config: &QuoteConfig) -> Self {
        Self {
            slippage_bps: config.default_slippage_bps,
            policy: ImpactPolicy {
                warn_pct: config.warn_impact_pct,
                block_pct: config.block_impact_pct,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub pool_id: String,
    pub amount_in: String,
    pub amount_out: String,
    pub min_out: String,
    pub price_impact_pct: Decimal,
    pub impact_level: ImpactLevel,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub fn routes(
    defaults: QuoteDefaults,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let quote = warp::path("quote")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(move |params: HashMap<String, String>| match quote_from_params(&params, &defaults) {
            Ok(response) => warp::reply::with_status(warp::reply::json(&response), StatusCode::OK),
            Err(e) => {
                debug!("Rejected quote request: {}", e);
                warp::reply::with_status(
                    warp::reply::json(&ErrorBody {
                        error: e.to_string(),
                    }),
                    e.status(),
                )
            }
        });

    health.or(quote)
}

/// Quote a swap from raw query parameters
pub fn quote_from_params(params: &HashMap<String, String>, defaults: &QuoteDefaults) -> Result<QuoteResponse> {
    let pool_id = required(params, "pool_id")?.to_string();
    let amount_in: u128 = parse(params, "amount")?;
    let direction = direction(params)?;

    let snapshot = PoolSnapshot {
        pool_id: pool_id.clone(),
        reserve_a: parse(params, "reserve_a")?,
        reserve_b: parse(params, "reserve_b")?,
        fees: FeeSchedule {
            lp_builder_bps: parse_or(params, "lp_builder_fee", 0)?,
            burn_bps: parse_or(params, "burn_fee", 0)?,
            creator_royalty_bps: parse_or(params, "creator_royalty_fee", 0)?,
            rewards_bps: parse_or(params, "rewards_fee", 0)?,
        },
        ..Default::default()
    };
    let slippage_bps = parse_or(params, "slippage_bps", defaults.slippage_bps)?;
    if slippage_bps > 10_000 {
        return Err(ApiError::InvalidParam {
            name: "slippage_bps",
            value: slippage_bps.to_string(),
        });
    }

    let quote = QuoteEngine::quote_swap(&snapshot, direction, amount_in, slippage_bps)?;
    Ok(QuoteResponse {
        pool_id,
        amount_in: quote.amount_in.to_string(),
        amount_out: quote.amount_out.to_string(),
        min_out: quote.min_out.to_string(),
        price_impact_pct: quote.price_impact_pct,
        impact_level: defaults.policy.classify(quote.price_impact_pct),
    })
}

/// `sell_a` and `buy_b` must agree when both are given
fn direction(params: &HashMap<String, String>) -> Result<SwapDirection> {
    let sell_a = optional::<bool>(params, "sell_a")?;
    let buy_b = optional::<bool>(params, "buy_b")?;
    let a_to_b = match (sell_a, buy_b) {
        (Some(sell_a), Some(buy_b)) if sell_a != buy_b => return Err(ApiError::InconsistentDirection),
        (Some(flag), _) | (None, Some(flag)) => flag,
        (None, None) => return Err(ApiError::MissingParam("sell_a")),
    };
    Ok(SwapDirection::from_a_to_b(a_to_b))
}

fn required<'a>(params: &'a HashMap<String, String>, name: &'static str) -> Result<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingParam(name))
}

fn parse<T: FromStr>(params: &HashMap<String, String>, name: &'static str) -> Result<T> {
    optional(params, name)?.ok_or(ApiError::MissingParam(name))
}

fn parse_or<T: FromStr>(params: &HashMap<String, String>, name: &'static str, default: T) -> Result<T> {
    Ok(optional(params, name)?.unwrap_or(default))
}

fn optional<T: FromStr>(params: &HashMap<String, String>, name: &'static str) -> Result<Option<T>> {
    match params.get(name).map(|value| value.trim()) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| ApiError::InvalidParam {
            name,
            value: value.to_string(),
        }),
    }
}
