use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, warn};

use super::ledger::StrikeLedger;
use super::metrics;
use crate::model::coerce::round2;
use crate::model::{DerivedRow, OptionQuote, OptionType, RawOption, SnapshotContext};

const NARROW_WING: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
const WIDE_WING: Decimal = Decimal::from_parts(40, 0, 0, false, 0);
const SPREAD_WIDTH: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Coerce raw records into quotes, skipping the ones without a usable strike
/// or option type.
pub fn parse_chain(records: &[RawOption]) -> Vec<OptionQuote> {
    records
        .iter()
        .filter_map(|raw| match OptionQuote::from_raw(raw) {
            Ok(quote) => Some(quote),
            Err(e) => {
                debug!(option = %raw.label(), error = %e, "skipping option record");
                None
            }
        })
        .collect()
}

/// One row per quote, in input order.
pub fn build_rows(
    quotes: &[OptionQuote],
    ledger: &StrikeLedger<'_>,
    ctx: &SnapshotContext,
) -> Vec<DerivedRow> {
    let time = ctx.time_label();
    quotes
        .iter()
        .map(|quote| derive_row(quote, ledger, ctx, &time))
        .collect()
}

pub fn derive_row(
    quote: &OptionQuote,
    ledger: &StrikeLedger<'_>,
    ctx: &SnapshotContext,
    time: &str,
) -> DerivedRow {
    let strike = quote.strike;
    let strike_f64 = strike.to_f64().unwrap_or(0.0);
    let underlying = ctx.market.underlying;

    let mid = quote.mid();
    let intrinsic = metrics::intrinsic_value(underlying, strike_f64, quote.option_type);
    let extrinsic = metrics::extrinsic_value(mid, intrinsic);

    DerivedRow {
        time: time.to_string(),
        symbol: ctx.symbol.clone(),
        price: round2(underlying),
        vix: round2(ctx.market.vix),
        vix1d: round2(ctx.market.vix1d),
        option: quote.symbol.clone(),
        option_type: quote.type_label.clone(),
        strike: round2(strike_f64),
        last: round2(quote.last),
        bid: round2(quote.bid),
        ask: round2(quote.ask),
        mid,
        width: quote.width(),
        expiration: ctx.expiration.format("%Y-%m-%d").to_string(),
        dte: ctx.dte(),
        straddle: metrics::straddle_value(ledger, strike),
        atm: u8::from(ledger.atm_strike() == Some(strike)),
        ib_20: metrics::butterfly_value(ledger, strike, NARROW_WING),
        ib_40: metrics::butterfly_value(ledger, strike, WIDE_WING),
        call_spread_10: metrics::spread_value(ledger, strike, SPREAD_WIDTH, OptionType::Call),
        put_spread_10: metrics::spread_value(ledger, strike, SPREAD_WIDTH, OptionType::Put),
        delta: round2(quote.greeks.delta),
        gamma: round2(quote.greeks.gamma),
        theta: round2(quote.greeks.theta),
        vega: round2(quote.greeks.vega),
        rho: round2(quote.greeks.rho),
        phi: round2(quote.greeks.phi),
        description: quote.description.clone(),
        exchange: quote.exchange.clone(),
        change: round2(quote.change),
        volume: quote.volume,
        open: round2(quote.open),
        high: round2(quote.high),
        low: round2(quote.low),
        close: round2(quote.close),
        change_percentage: round2(quote.change_percentage),
        average_volume: quote.average_volume,
        last_volume: quote.last_volume,
        trade_date: quote.trade_date.clone(),
        prev_close: round2(quote.prev_close),
        week_52_high: round2(quote.week_52_high),
        week_52_low: round2(quote.week_52_low),
        bid_size: quote.bid_size,
        bid_exchange: quote.bid_exchange.clone(),
        bid_date: quote.bid_date.clone(),
        ask_size: quote.ask_size,
        ask_exchange: quote.ask_exchange.clone(),
        ask_date: quote.ask_date.clone(),
        open_interest: quote.open_interest,
        contract_size: quote.contract_size,
        expiration_type: quote.expiration_type.clone(),
        root_symbol: quote.root_symbol.clone(),
        intrinsic: round2(intrinsic),
        extrinsic: round2(extrinsic),
    }
}

/// Full snapshot transformation: parse, index, value.
///
/// Returns `None` when the chain is empty or no record survives parsing, so
/// the caller can skip persistence and try again next cycle.
pub fn process_snapshot(records: &[RawOption], ctx: &SnapshotContext) -> Option<Vec<DerivedRow>> {
    if records.is_empty() {
        warn!(symbol = %ctx.symbol, expiration = %ctx.expiration, "no options data available");
        return None;
    }

    let quotes = parse_chain(records);
    let ledger = StrikeLedger::build(&quotes, ctx.market.underlying);
    let rows = build_rows(&quotes, &ledger, ctx);

    if rows.is_empty() {
        warn!(
            symbol = %ctx.symbol,
            expiration = %ctx.expiration,
            records = records.len(),
            "no valid options data processed"
        );
        return None;
    }

    debug!(
        symbol = %ctx.symbol,
        expiration = %ctx.expiration,
        rows = rows.len(),
        strikes = ledger.len(),
        atm = ?ledger.atm_strike(),
        "snapshot processed"
    );
    Some(rows)
}
