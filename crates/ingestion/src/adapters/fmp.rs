//! FinancialModelingPrep insider-trading rows.
//!
//! Rows are flat: one trade per record, with the relationship given as free
//! text (`"director, officer: CEO"`) and the code embedded in
//! `transactionType` (`"P-Purchase"`).

use insider_core::{Error, InsiderRole, NormalizerConfig, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{EntryFields, EntryResult, FilingContext};
use crate::fields::{
    clean_name, clean_ticker, mentions_trading_plan, non_blank, number_or_zero, parse_date,
    require_date, LenientNumber,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    symbol: Option<String>,
    reporting_name: Option<String>,
    company_name: Option<String>,
    type_of_owner: Option<String>,
    filing_date: Option<String>,
    transaction_date: Option<String>,
    transaction_type: Option<String>,
    securities_transacted: Option<Value>,
    price: Option<Value>,
    securities_owned: Option<Value>,
    footnotes: Option<Value>,
    remarks: Option<Value>,
}

/// Map one FMP row.
pub fn adapt(payload: &Value, config: &NormalizerConfig) -> Result<Vec<EntryResult>> {
    let row = Row::deserialize(payload).map_err(|e| Error::malformed(format!("fmp row: {e}")))?;

    let context = FilingContext {
        ticker: clean_ticker(row.symbol.as_deref())?,
        insider: clean_name(
            non_blank(row.reporting_name.as_deref()).or(row.company_name.as_deref()),
            &config.unknown_name,
        ),
        role: parse_owner_type(row.type_of_owner.as_deref()),
        filed_date: require_date(row.filing_date.as_deref(), "filingDate")?,
        is_planned: row.footnotes.as_ref().is_some_and(mentions_trading_plan)
            || row.remarks.as_ref().is_some_and(mentions_trading_plan),
    };

    Ok(vec![adapt_trade(&row, &context)])
}

fn adapt_trade(row: &Row, context: &FilingContext) -> EntryResult {
    let fields = EntryFields {
        trade_date: row.transaction_date.as_deref().and_then(parse_date),
        code: transaction_code(row.transaction_type.as_deref()),
        shares: amount(row.securities_transacted.as_ref(), "securitiesTransacted")?,
        price_per_share: amount(row.price.as_ref(), "price")?,
        shares_owned_after: amount(row.securities_owned.as_ref(), "securitiesOwned")?,
        is_planned: false,
    };
    Ok(context.transaction(fields))
}

/// Amounts are resolved per trade, so a mistyped one fails the trade rather
/// than the row.
fn amount(value: Option<&Value>, field: &str) -> Result<f64> {
    let number = value
        .filter(|v| !v.is_null())
        .map(LenientNumber::deserialize)
        .transpose()
        .map_err(|e| Error::malformed(format!("{field}: {e}")))?;
    number_or_zero(number.as_ref(), field)
}

/// `"P-Purchase"` -> `"P"`, `"S-Sale+OE"` -> `"S"`.
fn transaction_code(raw: Option<&str>) -> String {
    raw.and_then(|t| t.split('-').next())
        .map(|code| code.trim().to_string())
        .unwrap_or_default()
}

fn parse_owner_type(raw: Option<&str>) -> InsiderRole {
    let Some(text) = raw.map(str::to_ascii_lowercase) else {
        return InsiderRole::Other;
    };
    InsiderRole::from_flags(
        text.contains("officer"),
        text.contains("director"),
        text.contains("10 percent") || text.contains("10%") || text.contains("ten percent"),
    )
}
