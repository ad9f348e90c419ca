use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::favorite::{Favorite, FavoriteRequest, FavoriteView};
use crate::services::quote_service::QuoteService;
use crate::storage::traits::Store;
use crate::validation;

/// Change shown for a favorite that has never been priced.
const UNKNOWN_CHANGE: &str = "0.00%";

/// Manages a user's watchlist.
pub struct FavoritesService;

impl FavoritesService {
    pub fn new() -> Self {
        Self
    }

    /// The watchlist with fresh quotes.
    ///
    /// Quotes are fetched concurrently. A favorite whose quote fails keeps
    /// its stored figures and is marked stale. Refreshed figures are saved
    /// back, but a failed save does not fail the listing.
    pub async fn list(
        &self,
        quotes: &QuoteService,
        store: &dyn Store,
        user_id: Uuid,
    ) -> Result<Vec<FavoriteView>, CoreError> {
        let mut account = store.load_account(user_id).await?;
        if account.favorites.is_empty() {
            return Ok(Vec::new());
        }

        let symbols: Vec<String> = account.favorites.iter().map(|f| f.symbol.clone()).collect();
        let fresh = quotes.get_quotes_batch(&symbols).await;

        let mut refreshed = false;
        let mut views = Vec::with_capacity(account.favorites.len());
        for favorite in &mut account.favorites {
            match fresh.get(&favorite.symbol).and_then(Option::as_ref) {
                Some(quote) => {
                    favorite.last_price = Some(quote.price);
                    favorite.last_change = Some(quote.change_percent.clone());
                    favorite.last_change_amount = Some(quote.change_amount);
                    refreshed = true;
                    views.push(Self::view(favorite, false));
                }
                None => views.push(Self::view(favorite, true)),
            }
        }

        if refreshed {
            if let Err(e) = store.save_account(&account).await {
                tracing::warn!(%user_id, error = %e, "Could not save refreshed favorites");
            }
        }
        Ok(views)
    }

    /// Add a symbol to the watchlist. The symbol must resolve to a quote.
    pub async fn add(
        &self,
        quotes: &QuoteService,
        store: &dyn Store,
        user_id: Uuid,
        request: &FavoriteRequest,
    ) -> Result<FavoriteView, CoreError> {
        let (symbol, name) = validation::validate_favorite_request(request)?;
        let mut account = store.load_account(user_id).await?;
        if account.favorite(&symbol).is_some() {
            return Err(CoreError::FavoriteExists(symbol));
        }

        let quote = quotes.get_quote(&symbol).await?;
        let favorite = Favorite {
            name: name.unwrap_or_else(|| symbol.clone()),
            symbol,
            last_price: Some(quote.price),
            last_change: Some(quote.change_percent),
            last_change_amount: Some(quote.change_amount),
            added_at: Utc::now(),
        };
        let view = Self::view(&favorite, false);

        account.favorites.push(favorite);
        store.save_account(&account).await?;
        tracing::info!(%user_id, symbol = %view.symbol, "Favorite added");
        Ok(view)
    }

    /// Remove a symbol from the watchlist.
    pub async fn remove(
        &self,
        store: &dyn Store,
        user_id: Uuid,
        symbol: &str,
    ) -> Result<(), CoreError> {
        let symbol = validation::normalize_symbol(symbol)
            .map_err(|issue| CoreError::Validation(issue.into()))?;
        let mut account = store.load_account(user_id).await?;

        let idx = account
            .favorites
            .iter()
            .position(|f| f.symbol == symbol)
            .ok_or_else(|| CoreError::FavoriteNotFound(symbol.clone()))?;
        account.favorites.remove(idx);

        store.save_account(&account).await?;
        tracing::info!(%user_id, %symbol, "Favorite removed");
        Ok(())
    }

    fn view(favorite: &Favorite, stale: bool) -> FavoriteView {
        FavoriteView {
            symbol: favorite.symbol.clone(),
            name: favorite.name.clone(),
            price: favorite.last_price.unwrap_or(Decimal::ZERO),
            change: favorite
                .last_change
                .clone()
                .unwrap_or_else(|| UNKNOWN_CHANGE.to_string()),
            change_amount: favorite.last_change_amount.unwrap_or(Decimal::ZERO),
            added_at: favorite.added_at,
            stale,
        }
    }
}

impl Default for FavoritesService {
    fn default() -> Self {
        Self::new()
    }
}
