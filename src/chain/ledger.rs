use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::model::{OptionQuote, OptionType};

/// One side of a strike: the contract and its mid (`None` when unquoted).
#[derive(Debug, Clone, Copy)]
pub struct Leg<'a> {
    pub quote: &'a OptionQuote,
    pub mid: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StrikeEntry<'a> {
    pub call: Option<Leg<'a>>,
    pub put: Option<Leg<'a>>,
}

impl<'a> StrikeEntry<'a> {
    pub fn side(&self, side: OptionType) -> Option<&Leg<'a>> {
        match side {
            OptionType::Call => self.call.as_ref(),
            OptionType::Put => self.put.as_ref(),
        }
    }

    fn side_mut(&mut self, side: OptionType) -> &mut Option<Leg<'a>> {
        match side {
            OptionType::Call => &mut self.call,
            OptionType::Put => &mut self.put,
        }
    }
}

/// Call/put pairs of one chain snapshot keyed by exact strike.
///
/// Borrows the quotes it indexes and is read-only once built.
#[derive(Debug, Clone, Default)]
pub struct StrikeLedger<'a> {
    strikes: BTreeMap<Decimal, StrikeEntry<'a>>,
    atm_strike: Option<Decimal>,
}

impl<'a> StrikeLedger<'a> {
    /// Index `quotes` by strike and find the strike nearest `underlying`.
    ///
    /// A later quote for the same strike and side replaces the earlier one.
    /// On equal distance the first strike seen keeps the ATM slot.
    pub fn build(quotes: &'a [OptionQuote], underlying: f64) -> Self {
        let mut strikes: BTreeMap<Decimal, StrikeEntry<'a>> = BTreeMap::new();
        let mut atm_strike = None;
        let mut min_distance = f64::INFINITY;

        for quote in quotes {
            let entry = strikes.entry(quote.strike).or_default();
            *entry.side_mut(quote.option_type) = Some(Leg {
                quote,
                mid: quote.quoted_mid(),
            });

            if let Some(strike) = quote.strike.to_f64() {
                let distance = (strike - underlying).abs();
                if distance < min_distance {
                    min_distance = distance;
                    atm_strike = Some(quote.strike);
                }
            }
        }

        StrikeLedger {
            strikes,
            atm_strike,
        }
    }

    pub fn atm_strike(&self) -> Option<Decimal> {
        self.atm_strike
    }

    pub fn get(&self, strike: Decimal) -> Option<&StrikeEntry<'a>> {
        self.strikes.get(&strike)
    }

    pub fn leg(&self, strike: Decimal, side: OptionType) -> Option<&Leg<'a>> {
        self.get(strike)?.side(side)
    }

    /// Mid of a quoted leg. Missing and unquoted legs both yield `None`.
    pub fn mid(&self, strike: Decimal, side: OptionType) -> Option<f64> {
        self.leg(strike, side)?.mid
    }

    /// Strikes in ascending order.
    pub fn strikes(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.strikes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }
}
