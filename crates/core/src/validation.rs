//! Boundary validation.
//!
//! Raw requests are checked here before any domain entity is built or any
//! quote is fetched. Every check runs, so the caller gets the full list of
//! problems in one round trip.

use serde_json::Value;

use crate::models::favorite::FavoriteRequest;
use crate::models::trade::{TradeAction, TradeOrder, TradeRequest};

/// Longest ticker accepted (e.g. "BRK.B", "RDS-A").
pub const MAX_SYMBOL_LEN: usize = 10;

/// Longest display name accepted for a favorite.
pub const MAX_FAVORITE_NAME_LEN: usize = 100;

/// Largest page size for trade history.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// A single problem found in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A required field was absent or blank.
    MissingField(&'static str),
    /// Quantity was not a positive whole number.
    InvalidQuantity(String),
    /// Action was neither BUY nor SELL.
    InvalidAction(String),
    /// Symbol contained characters a ticker cannot have, or was too long.
    InvalidSymbol(String),
    /// Free-form field failed a length or range rule.
    InvalidField { field: &'static str, message: String },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::MissingField(field) => write!(f, "{field} is required"),
            ValidationIssue::InvalidQuantity(raw) => {
                write!(f, "quantity must be a positive whole number (got {raw})")
            }
            ValidationIssue::InvalidAction(raw) => {
                write!(f, "action must be either BUY or SELL (got {raw})")
            }
            ValidationIssue::InvalidSymbol(raw) => write!(f, "invalid stock symbol: {raw}"),
            ValidationIssue::InvalidField { field, message } => write!(f, "{field}: {message}"),
        }
    }
}

/// Non-empty list of validation issues.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.0.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    /// `Ok(value)` when no issue was recorded.
    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationIssue> for ValidationErrors {
    fn from(issue: ValidationIssue) -> Self {
        Self(vec![issue])
    }
}

/// Trim and uppercase a ticker, then check its shape.
pub fn normalize_symbol(raw: &str) -> Result<String, ValidationIssue> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ValidationIssue::MissingField("symbol"));
    }
    let well_formed = symbol.len() <= MAX_SYMBOL_LEN
        && symbol.starts_with(|c: char| c.is_ascii_alphanumeric())
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !well_formed {
        return Err(ValidationIssue::InvalidSymbol(raw.trim().to_string()));
    }
    Ok(symbol)
}

/// Validate an optional raw symbol coming from a query string or body.
pub fn validate_symbol(raw: Option<&str>) -> Result<String, ValidationErrors> {
    match raw {
        Some(s) => normalize_symbol(s).map_err(ValidationErrors::from),
        None => Err(ValidationIssue::MissingField("symbol").into()),
    }
}

/// Accepts JSON integers and integral strings ("10"); rejects 0, negatives,
/// fractions and anything non-numeric.
pub fn parse_quantity(raw: &Value) -> Result<u64, ValidationIssue> {
    let invalid = || ValidationIssue::InvalidQuantity(raw.to_string());
    match raw {
        Value::Number(n) => match n.as_u64() {
            Some(q) if q > 0 => Ok(q),
            Some(_) => Err(invalid()),
            None => match n.as_f64() {
                // 10.0 is still a whole number
                Some(f) if f.fract() == 0.0 && f >= 1.0 && f <= u64::MAX as f64 => Ok(f as u64),
                _ => Err(invalid()),
            },
        },
        Value::String(s) => match s.trim().parse::<u64>() {
            Ok(q) if q > 0 => Ok(q),
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

/// Validate a raw trade request into a well-formed order.
pub fn validate_trade_request(request: &TradeRequest) -> Result<TradeOrder, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let symbol = match request.symbol.as_deref() {
        Some(raw) => normalize_symbol(raw).map_err(|e| errors.push(e)).ok(),
        None => {
            errors.push(ValidationIssue::MissingField("symbol"));
            None
        }
    };

    let quantity = match &request.quantity {
        None | Some(Value::Null) => {
            errors.push(ValidationIssue::MissingField("quantity"));
            None
        }
        Some(raw) => parse_quantity(raw).map_err(|e| errors.push(e)).ok(),
    };

    let action = match request.action.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(ValidationIssue::MissingField("action"));
            None
        }
        Some(raw) => raw
            .parse::<TradeAction>()
            .map_err(|_| errors.push(ValidationIssue::InvalidAction(raw.to_string())))
            .ok(),
    };

    match (symbol, quantity, action) {
        (Some(symbol), Some(quantity), Some(action)) => errors.finish(|| TradeOrder {
            symbol,
            quantity,
            action,
        }),
        _ => Err(errors),
    }
}

/// Validate a request to add a favorite; returns `(symbol, name)`.
pub fn validate_favorite_request(
    request: &FavoriteRequest,
) -> Result<(String, Option<String>), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let symbol = match request.symbol.as_deref() {
        Some(raw) => normalize_symbol(raw).map_err(|e| errors.push(e)).ok(),
        None => {
            errors.push(ValidationIssue::MissingField("symbol"));
            None
        }
    };

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    if let Some(n) = &name {
        if n.chars().count() > MAX_FAVORITE_NAME_LEN {
            errors.push(ValidationIssue::InvalidField {
                field: "name",
                message: format!("cannot exceed {MAX_FAVORITE_NAME_LEN} characters"),
            });
        }
    }

    match symbol {
        Some(symbol) => errors.finish(|| (symbol, name)),
        None => Err(errors),
    }
}

/// Resolve history paging parameters, applying the default and the cap.
pub fn validate_page(
    limit: Option<usize>,
    offset: Option<usize>,
) -> Result<(usize, usize), ValidationErrors> {
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err(ValidationIssue::InvalidField {
            field: "limit",
            message: format!("must be between 1 and {MAX_HISTORY_LIMIT}"),
        }
        .into());
    }
    Ok((limit, offset.unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quantity_accepts_integral_float() {
        assert_eq!(parse_quantity(&json!(10.0)).unwrap(), 10);
    }

    #[test]
    fn quantity_rejects_fraction_zero_and_negative() {
        assert!(parse_quantity(&json!(1.5)).is_err());
        assert!(parse_quantity(&json!(0)).is_err());
        assert!(parse_quantity(&json!(-3)).is_err());
        assert!(parse_quantity(&json!("abc")).is_err());
        assert!(parse_quantity(&json!(true)).is_err());
    }

    #[test]
    fn symbol_is_uppercased_and_trimmed() {
        assert_eq!(normalize_symbol("  aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
    }

    #[test]
    fn symbol_shape_is_checked() {
        assert!(matches!(
            normalize_symbol("AA PL"),
            Err(ValidationIssue::InvalidSymbol(_))
        ));
        assert!(matches!(
            normalize_symbol("TOOLONGSYMBOL"),
            Err(ValidationIssue::InvalidSymbol(_))
        ));
        assert!(matches!(
            normalize_symbol("   "),
            Err(ValidationIssue::MissingField("symbol"))
        ));
    }

    #[test]
    fn finish_reports_every_issue() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationIssue::MissingField("symbol"));
        errors.push(ValidationIssue::MissingField("action"));
        let result = errors.finish(|| ());
        assert_eq!(result.unwrap_err().issues().len(), 2);
    }
}
