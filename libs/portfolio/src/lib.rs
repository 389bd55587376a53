//! Portfolio ledger
//!
//! Authoritative record of participant cash and per-symbol positions. The
//! matching engine consults it for pre-trade checks (`can_buy`/`can_sell`)
//! and settles executed trades into it. One mutex covers the whole ledger,
//! so buyer and seller legs applied through [`Portfolio::settle`] are never
//! observable half-done.
//!
//! Accounting rules:
//! - a successful BUY never drives cash negative (`can_buy` gates at
//!   `qty × price ≤ cash`, equality accepted)
//! - a successful SELL never drives a position negative (`can_sell` gates
//!   at `position ≥ qty`)
//! - `set_initial_position` with a cost basis debits cash by
//!   `qty × cost_basis` even when that makes cash negative
//!
//! P&L is mark-to-market against a caller-supplied price map; cost basis is
//! not tracked per lot.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;
use types::errors::PortfolioError;
use types::ids::{ParticipantId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// Library version constant
pub const VERSION: &str = "0.1.0";

/// Cash and positions for one participant
#[derive(Debug, Clone)]
struct ParticipantRecord {
    cash: Decimal,
    initial_cash: Decimal,
    /// Signed share counts; trading never drives these negative, but
    /// initial positions may be seeded to any value
    positions: HashMap<Symbol, i64>,
}

impl ParticipantRecord {
    fn new(initial_cash: Decimal) -> Self {
        Self {
            cash: initial_cash,
            initial_cash,
            positions: HashMap::new(),
        }
    }

    fn position(&self, symbol: &Symbol) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    /// Mark-to-market value of all positions; symbols absent from the
    /// price map contribute nothing
    fn position_value(&self, prices: &HashMap<Symbol, Price>) -> Decimal {
        let mut value = Decimal::ZERO;
        for (symbol, quantity) in &self.positions {
            if let Some(price) = prices.get(symbol) {
                value += price.as_decimal() * Decimal::from(*quantity);
            }
        }
        value
    }
}

/// Thread-safe book of participant cash and positions
pub struct Portfolio {
    participants: Mutex<HashMap<ParticipantId, ParticipantRecord>>,
}

impl Portfolio {
    /// Create a ledger with each participant initialized to their opening
    /// cash (`initial_cash = cash`)
    pub fn new(initial_cash_by_participant: HashMap<ParticipantId, Decimal>) -> Self {
        let participants = initial_cash_by_participant
            .into_iter()
            .map(|(id, cash)| (id, ParticipantRecord::new(cash)))
            .collect();
        Self {
            participants: Mutex::new(participants),
        }
    }

    /// Create (or replace) a participant record
    pub fn add_participant(&self, participant_id: ParticipantId, initial_cash: Decimal) {
        let mut participants = self.participants.lock().unwrap();
        participants.insert(participant_id, ParticipantRecord::new(initial_cash));
    }

    /// Seed a position, optionally debiting cash by `quantity × cost_basis`
    ///
    /// The debit applies whenever `cost_basis > 0` and may drive cash
    /// negative; the caller owns that tradeoff.
    pub fn set_initial_position(
        &self,
        participant_id: &ParticipantId,
        symbol: Symbol,
        quantity: i64,
        cost_basis: Decimal,
    ) -> Result<(), PortfolioError> {
        let mut participants = self.participants.lock().unwrap();
        let record = participants
            .get_mut(participant_id)
            .ok_or_else(|| PortfolioError::ParticipantNotFound(participant_id.clone()))?;

        record.positions.insert(symbol, quantity);

        if cost_basis > Decimal::ZERO {
            record.cash -= Decimal::from(quantity) * cost_basis;
            if record.cash < Decimal::ZERO {
                warn!(
                    participant = %participant_id,
                    cash = %record.cash,
                    "cost basis debit drove cash negative"
                );
            }
        }

        Ok(())
    }

    /// True iff the participant exists and `qty × price ≤ cash`
    pub fn can_buy(
        &self,
        participant_id: &ParticipantId,
        _symbol: &Symbol,
        quantity: Quantity,
        price: Price,
    ) -> bool {
        let participants = self.participants.lock().unwrap();
        match participants.get(participant_id) {
            Some(record) => quantity * price <= record.cash,
            None => false,
        }
    }

    /// True iff the participant exists and holds at least `qty` of `symbol`
    pub fn can_sell(&self, participant_id: &ParticipantId, symbol: &Symbol, quantity: Quantity) -> bool {
        let participants = self.participants.lock().unwrap();
        match participants.get(participant_id) {
            Some(record) => record.position(symbol) >= quantity.as_u32() as i64,
            None => false,
        }
    }

    /// Apply one leg of a trade to one participant
    ///
    /// BUY: position += qty, cash −= qty × price. SELL: the reverse.
    pub fn execute_trade(
        &self,
        participant_id: &ParticipantId,
        trade: &Trade,
        side: Side,
    ) -> Result<(), PortfolioError> {
        let mut participants = self.participants.lock().unwrap();
        Self::apply_leg(&mut participants, participant_id, trade, side)
    }

    /// Apply both legs of a trade as one observable step
    ///
    /// Both participants are verified before either record is touched, so a
    /// missing participant leaves the ledger unchanged.
    pub fn settle(&self, trade: &Trade) -> Result<(), PortfolioError> {
        let mut participants = self.participants.lock().unwrap();

        for id in [&trade.buyer_id, &trade.seller_id] {
            if !participants.contains_key(id) {
                return Err(PortfolioError::ParticipantNotFound(id.clone()));
            }
        }

        Self::apply_leg(&mut participants, &trade.buyer_id, trade, Side::BUY)?;
        Self::apply_leg(&mut participants, &trade.seller_id, trade, Side::SELL)?;
        Ok(())
    }

    fn apply_leg(
        participants: &mut HashMap<ParticipantId, ParticipantRecord>,
        participant_id: &ParticipantId,
        trade: &Trade,
        side: Side,
    ) -> Result<(), PortfolioError> {
        let record = participants
            .get_mut(participant_id)
            .ok_or_else(|| PortfolioError::ParticipantNotFound(participant_id.clone()))?;

        let shares = trade.quantity.as_u32() as i64;
        let notional = trade.notional();

        match side {
            Side::BUY => {
                *record.positions.entry(trade.symbol.clone()).or_insert(0) += shares;
                record.cash -= notional;
            }
            Side::SELL => {
                *record.positions.entry(trade.symbol.clone()).or_insert(0) -= shares;
                record.cash += notional;
            }
        }

        Ok(())
    }

    /// `Σ position × price + cash − initial_cash`
    pub fn get_pnl(
        &self,
        participant_id: &ParticipantId,
        prices: &HashMap<Symbol, Price>,
    ) -> Result<Decimal, PortfolioError> {
        let participants = self.participants.lock().unwrap();
        let record = participants
            .get(participant_id)
            .ok_or_else(|| PortfolioError::ParticipantNotFound(participant_id.clone()))?;
        Ok(record.position_value(prices) + record.cash - record.initial_cash)
    }

    /// `cash + Σ position × price`
    pub fn get_portfolio_value(
        &self,
        participant_id: &ParticipantId,
        prices: &HashMap<Symbol, Price>,
    ) -> Result<Decimal, PortfolioError> {
        let participants = self.participants.lock().unwrap();
        let record = participants
            .get(participant_id)
            .ok_or_else(|| PortfolioError::ParticipantNotFound(participant_id.clone()))?;
        Ok(record.cash + record.position_value(prices))
    }

    /// Current cash
    pub fn get_cash(&self, participant_id: &ParticipantId) -> Result<Decimal, PortfolioError> {
        let participants = self.participants.lock().unwrap();
        participants
            .get(participant_id)
            .map(|record| record.cash)
            .ok_or_else(|| PortfolioError::ParticipantNotFound(participant_id.clone()))
    }

    /// Spendable cash; no margin, so identical to [`Portfolio::get_cash`]
    pub fn get_buying_power(&self, participant_id: &ParticipantId) -> Result<Decimal, PortfolioError> {
        self.get_cash(participant_id)
    }

    /// Position in one symbol, 0 if never traded
    pub fn get_position(
        &self,
        participant_id: &ParticipantId,
        symbol: &Symbol,
    ) -> Result<i64, PortfolioError> {
        let participants = self.participants.lock().unwrap();
        participants
            .get(participant_id)
            .map(|record| record.position(symbol))
            .ok_or_else(|| PortfolioError::ParticipantNotFound(participant_id.clone()))
    }

    /// `Σ |position| × price` over the supplied price map
    pub fn get_total_exposure(
        &self,
        participant_id: &ParticipantId,
        prices: &HashMap<Symbol, Price>,
    ) -> Result<Decimal, PortfolioError> {
        let participants = self.participants.lock().unwrap();
        let record = participants
            .get(participant_id)
            .ok_or_else(|| PortfolioError::ParticipantNotFound(participant_id.clone()))?;

        let mut exposure = Decimal::ZERO;
        for (symbol, quantity) in &record.positions {
            if let Some(price) = prices.get(symbol) {
                exposure += price.as_decimal() * Decimal::from(quantity.abs());
            }
        }
        Ok(exposure)
    }
}
