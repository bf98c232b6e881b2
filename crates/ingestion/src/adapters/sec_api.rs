//! sec-api.io insider-trading filings.
//!
//! One filing carries a `nonDerivativeTable.transactions` list; each entry is
//! mapped separately so a malformed trade does not reject its siblings.

use insider_core::{Error, InsiderRole, NormalizerConfig, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{EntryFields, EntryResult, FilingContext};
use crate::fields::{
    clean_name, clean_ticker, flag_set, mentions_trading_plan, non_blank, number_or_zero,
    parse_date, require_date, Flag, LenientNumber,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Filing {
    ticker: Option<String>,
    issuer: Option<Issuer>,
    reporting_owner: Option<ReportingOwner>,
    reporting_name: Option<String>,
    filed_at: Option<String>,
    non_derivative_table: Option<NonDerivativeTable>,
    footnotes: Option<Value>,
    remarks: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Issuer {
    trading_symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportingOwner {
    name: Option<String>,
    relationship: Option<Relationship>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Relationship {
    is_officer: Option<Flag>,
    is_director: Option<Flag>,
    is_ten_percent_owner: Option<Flag>,
}

#[derive(Debug, Deserialize)]
struct NonDerivativeTable {
    transactions: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    transaction_date: Option<String>,
    coding: Option<Coding>,
    amounts: Option<Amounts>,
    post_transaction_amounts: Option<PostTransactionAmounts>,
    footnotes: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Coding {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Amounts {
    shares: Option<LenientNumber>,
    price_per_share: Option<LenientNumber>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostTransactionAmounts {
    shares_owned_following_transaction: Option<LenientNumber>,
}

/// Map one sec-api.io filing.
pub fn adapt(payload: &Value, config: &NormalizerConfig) -> Result<Vec<EntryResult>> {
    let filing = Filing::deserialize(payload)
        .map_err(|e| Error::malformed(format!("sec-api filing: {e}")))?;

    let ticker = clean_ticker(
        non_blank(filing.ticker.as_deref())
            .or_else(|| filing.issuer.as_ref()?.trading_symbol.as_deref()),
    )?;
    let filed_date = require_date(filing.filed_at.as_deref(), "filedAt")?;

    let owner_name = non_blank(filing.reporting_owner.as_ref().and_then(|o| o.name.as_deref()));
    let insider = clean_name(
        owner_name.or(filing.reporting_name.as_deref()),
        &config.unknown_name,
    );

    let relationship = filing
        .reporting_owner
        .as_ref()
        .and_then(|o| o.relationship.as_ref());
    let role = relationship.map_or(InsiderRole::Other, |r| {
        InsiderRole::from_flags(
            flag_set(r.is_officer.as_ref()),
            flag_set(r.is_director.as_ref()),
            flag_set(r.is_ten_percent_owner.as_ref()),
        )
    });

    let is_planned = filing.footnotes.as_ref().is_some_and(mentions_trading_plan)
        || filing.remarks.as_ref().is_some_and(mentions_trading_plan);

    let context = FilingContext {
        ticker,
        insider,
        role,
        filed_date,
        is_planned,
    };

    let entries = filing
        .non_derivative_table
        .and_then(|t| t.transactions)
        .unwrap_or_default();

    Ok(entries
        .iter()
        .map(|entry| adapt_entry(entry, &context))
        .collect())
}

fn adapt_entry(value: &Value, context: &FilingContext) -> EntryResult {
    let entry = Entry::deserialize(value)
        .map_err(|e| Error::malformed(format!("sec-api transaction: {e}")))?;

    let amounts = entry.amounts.as_ref();
    let fields = EntryFields {
        trade_date: entry.transaction_date.as_deref().and_then(parse_date),
        code: entry.coding.and_then(|c| c.code).unwrap_or_default(),
        shares: number_or_zero(amounts.and_then(|a| a.shares.as_ref()), "shares")?,
        price_per_share: number_or_zero(
            amounts.and_then(|a| a.price_per_share.as_ref()),
            "pricePerShare",
        )?,
        shares_owned_after: number_or_zero(
            entry
                .post_transaction_amounts
                .as_ref()
                .and_then(|p| p.shares_owned_following_transaction.as_ref()),
            "sharesOwnedFollowingTransaction",
        )?,
        is_planned: entry.footnotes.as_ref().is_some_and(mentions_trading_plan),
    };
    Ok(context.transaction(fields))
}
