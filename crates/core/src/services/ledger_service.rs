use chrono::Utc;
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::validation::ValidationIssue;

/// Applies share movements to a holdings list.
///
/// Pure business logic with no I/O and no API calls. Cost basis follows the
/// weighted-average method:
/// - a buy adds `quantity * price` to `total_cost` and recomputes
///   `avg_price = total_cost / shares`;
/// - a partial sell removes the sold fraction of `total_cost` and keeps
///   `avg_price` as it was;
/// - selling every share removes the holding.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Add `quantity` shares bought at `price`, merging into an existing
    /// position or opening a new one at the end of the list.
    pub fn add_shares(
        &self,
        holdings: &mut Vec<Holding>,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<(), CoreError> {
        Self::check_quantity(quantity)?;
        if price <= Decimal::ZERO {
            return Err(CoreError::Validation(
                ValidationIssue::InvalidField {
                    field: "price",
                    message: format!("must be positive (got {price})"),
                }
                .into(),
            ));
        }

        let symbol = symbol.to_uppercase();
        match holdings.iter_mut().find(|h| h.symbol == symbol) {
            Some(holding) => {
                let total_cost = holding.total_cost + Decimal::from(quantity) * price;
                let shares = holding.shares + quantity;
                holding.shares = shares;
                holding.total_cost = total_cost;
                holding.avg_price = total_cost / Decimal::from(shares);
                holding.last_updated = Utc::now();
            }
            None => holdings.push(Holding::open(symbol, quantity, price)),
        }
        Ok(())
    }

    /// Remove `quantity` shares of `symbol`.
    ///
    /// Fails with `HoldingNotFound` when there is no position and with
    /// `InsufficientShares` when more shares are asked for than are held.
    pub fn remove_shares(
        &self,
        holdings: &mut Vec<Holding>,
        symbol: &str,
        quantity: u64,
    ) -> Result<(), CoreError> {
        Self::check_quantity(quantity)?;

        let symbol = symbol.to_uppercase();
        let idx = holdings
            .iter()
            .position(|h| h.symbol == symbol)
            .ok_or_else(|| CoreError::HoldingNotFound(symbol.clone()))?;

        let held = holdings[idx].shares;
        if quantity > held {
            return Err(CoreError::InsufficientShares {
                symbol,
                requested: quantity,
                available: held,
            });
        }

        if quantity == held {
            holdings.remove(idx);
            return Ok(());
        }

        let holding = &mut holdings[idx];
        // Multiply before dividing so the sold fraction loses as little
        // precision as possible.
        let sold_cost =
            holding.total_cost * Decimal::from(quantity) / Decimal::from(holding.shares);
        holding.total_cost -= sold_cost;
        holding.shares -= quantity;
        holding.last_updated = Utc::now();
        Ok(())
    }

    fn check_quantity(quantity: u64) -> Result<(), CoreError> {
        if quantity == 0 {
            return Err(CoreError::InvalidQuantity(
                "quantity must be a positive whole number".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
