//! Spread and butterfly valuation over a [`StrikeLedger`].
//!
//! Every metric needs specific legs; when one is missing (or unquoted) the
//! metric is `None` rather than an error.

use rust_decimal::Decimal;

use super::ledger::StrikeLedger;
use crate::model::OptionType;
use crate::model::coerce::round2;

/// Vertical spread: long `strike`, short the same side `width` further out of
/// the money (above for calls, below for puts).
pub fn spread_value(
    ledger: &StrikeLedger<'_>,
    strike: Decimal,
    width: Decimal,
    side: OptionType,
) -> Option<f64> {
    let far_strike = match side {
        OptionType::Call => strike.checked_add(width)?,
        OptionType::Put => strike.checked_sub(width)?,
    };
    let near = ledger.mid(strike, side)?;
    let far = ledger.mid(far_strike, side)?;
    Some(round2(near - far))
}

/// Iron butterfly credit: short straddle at `strike`, long call at
/// `strike + width`, long put at `strike - width`.
pub fn butterfly_value(ledger: &StrikeLedger<'_>, strike: Decimal, width: Decimal) -> Option<f64> {
    let center_call = ledger.mid(strike, OptionType::Call)?;
    let center_put = ledger.mid(strike, OptionType::Put)?;
    let wing_call = ledger.mid(strike.checked_add(width)?, OptionType::Call)?;
    let wing_put = ledger.mid(strike.checked_sub(width)?, OptionType::Put)?;
    Some(round2(center_call + center_put - wing_call - wing_put))
}

pub fn straddle_value(ledger: &StrikeLedger<'_>, strike: Decimal) -> Option<f64> {
    let call = ledger.mid(strike, OptionType::Call)?;
    let put = ledger.mid(strike, OptionType::Put)?;
    Some(round2(call + put))
}

pub fn intrinsic_value(underlying: f64, strike: f64, side: OptionType) -> f64 {
    match side {
        OptionType::Call => (underlying - strike).max(0.0),
        OptionType::Put => (strike - underlying).max(0.0),
    }
}

pub fn extrinsic_value(mid: f64, intrinsic: f64) -> f64 {
    (mid - intrinsic).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionQuote;
    use crate::model::quote::RawOption;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn quote(strike: f64, side: &str, bid: f64, ask: f64) -> OptionQuote {
        let raw: RawOption = serde_json::from_value(json!({
            "strike": strike, "option_type": side, "bid": bid, "ask": ask
        }))
        .unwrap();
        OptionQuote::from_raw(&raw).unwrap()
    }

    /// 4980..=5020 by 10, calls fall and puts rise by 5 per strike.
    fn chain() -> Vec<OptionQuote> {
        let mut quotes = Vec::new();
        for (i, strike) in [4980.0, 4990.0, 5000.0, 5010.0, 5020.0].iter().enumerate() {
            let call = 25.0 - 5.0 * i as f64;
            let put = 5.0 + 5.0 * i as f64;
            quotes.push(quote(*strike, "call", call - 0.1, call + 0.1));
            quotes.push(quote(*strike, "put", put - 0.1, put + 0.1));
        }
        quotes
    }

    #[test]
    fn test_spreads() {
        let quotes = chain();
        let ledger = StrikeLedger::build(&quotes, 5000.0);

        assert_eq!(spread_value(&ledger, dec!(5000), dec!(10), OptionType::Call), Some(5.0));
        assert_eq!(spread_value(&ledger, dec!(5000), dec!(10), OptionType::Put), Some(5.0));
        // No 5030 call
        assert_eq!(spread_value(&ledger, dec!(5020), dec!(10), OptionType::Call), None);
        // No 4970 put
        assert_eq!(spread_value(&ledger, dec!(4980), dec!(10), OptionType::Put), None);
    }

    #[test]
    fn test_butterfly_needs_both_wings() {
        let quotes = chain();
        let ledger = StrikeLedger::build(&quotes, 5000.0);

        // 15 + 15 - 5 - 5
        assert_eq!(butterfly_value(&ledger, dec!(5000), dec!(20)), Some(20.0));
        assert_eq!(butterfly_value(&ledger, dec!(5000), dec!(40)), None);
        assert_eq!(butterfly_value(&ledger, dec!(5010), dec!(20)), None);
    }

    #[test]
    fn test_unquoted_leg_is_absent() {
        let mut quotes = chain();
        quotes.push(quote(5020.0, "call", 0.0, 0.0));
        let ledger = StrikeLedger::build(&quotes, 5000.0);

        assert_eq!(ledger.mid(dec!(5020), OptionType::Call), None);
        assert_eq!(spread_value(&ledger, dec!(5010), dec!(10), OptionType::Call), None);
        assert_eq!(butterfly_value(&ledger, dec!(5000), dec!(20)), None);
        assert_eq!(straddle_value(&ledger, dec!(5020)), None);
    }

    #[test]
    fn test_intrinsic_and_extrinsic() {
        assert_eq!(intrinsic_value(5005.0, 5000.0, OptionType::Call), 5.0);
        assert_eq!(intrinsic_value(5005.0, 5000.0, OptionType::Put), 0.0);
        assert_eq!(intrinsic_value(4990.0, 5000.0, OptionType::Put), 10.0);
        assert_eq!(extrinsic_value(7.5, 5.0), 2.5);
        assert_eq!(extrinsic_value(3.0, 5.0), 0.0);
    }
}
