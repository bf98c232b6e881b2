//! SEC EDGAR Form 4 ownership documents.
//!
//! The fetch layer converts the filing XML to JSON and adds the feed entry's
//! timestamp as `filedAt`, either beside the document fields or around a
//! nested `ownershipDocument` object. Scalars may be wrapped as
//! `{"value": ...}` and single children may appear without an array.

use insider_core::{Error, InsiderRole, NormalizerConfig, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{EntryFields, EntryResult, FilingContext};
use crate::fields::{
    clean_name, clean_ticker, flag_set, mentions_trading_plan, non_blank, number_or_zero,
    parse_date, require_date, Flag, LenientNumber, OneOrMany, Wrapped,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnershipDocument {
    issuer: Option<DocIssuer>,
    reporting_owner: Option<OneOrMany<DocOwner>>,
    filed_at: Option<String>,
    period_of_report: Option<Wrapped<String>>,
    #[serde(rename = "aff10b5One")]
    aff_10b5_one: Option<Wrapped<Flag>>,
    non_derivative_table: Option<NonDerivativeTable>,
    footnotes: Option<Value>,
    remarks: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocIssuer {
    issuer_trading_symbol: Option<Wrapped<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocOwner {
    reporting_owner_id: Option<OwnerId>,
    reporting_owner_relationship: Option<OwnerRelationship>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerId {
    rpt_owner_name: Option<Wrapped<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerRelationship {
    is_officer: Option<Wrapped<Flag>>,
    is_director: Option<Wrapped<Flag>>,
    is_ten_percent_owner: Option<Wrapped<Flag>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NonDerivativeTable {
    non_derivative_transaction: Option<OneOrMany<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocTransaction {
    transaction_date: Option<Wrapped<String>>,
    transaction_coding: Option<DocCoding>,
    transaction_amounts: Option<DocAmounts>,
    post_transaction_amounts: Option<DocPostAmounts>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocCoding {
    transaction_code: Option<Wrapped<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocAmounts {
    transaction_shares: Option<Wrapped<LenientNumber>>,
    transaction_price_per_share: Option<Wrapped<LenientNumber>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocPostAmounts {
    shares_owned_following_transaction: Option<Wrapped<LenientNumber>>,
}

fn flag(value: Option<&Wrapped<Flag>>) -> bool {
    flag_set(value.and_then(Wrapped::as_inner))
}

fn wrapped_number(value: Option<&Wrapped<LenientNumber>>, field: &str) -> Result<f64> {
    number_or_zero(value.and_then(Wrapped::as_inner), field)
}

/// Map one EDGAR ownership document.
pub fn adapt(payload: &Value, config: &NormalizerConfig) -> Result<Vec<EntryResult>> {
    let (document, outer_filed_at) = match payload.get("ownershipDocument") {
        Some(inner) => (inner, payload.get("filedAt").and_then(Value::as_str)),
        None => (payload, None),
    };
    let doc = OwnershipDocument::deserialize(document)
        .map_err(|e| Error::malformed(format!("edgar ownership document: {e}")))?;

    let ticker = clean_ticker(
        doc.issuer
            .as_ref()
            .and_then(|i| i.issuer_trading_symbol.as_ref())
            .and_then(Wrapped::as_inner)
            .map(String::as_str),
    )?;

    let filed_at = non_blank(outer_filed_at)
        .or(non_blank(doc.filed_at.as_deref()))
        .or_else(|| doc.period_of_report.as_ref()?.as_inner().map(String::as_str));
    let filed_date = require_date(filed_at, "filedAt")?;

    // Joint filings list several owners; the first is the designated filer.
    let owner = doc
        .reporting_owner
        .and_then(|owners| owners.into_vec().into_iter().next());
    let insider = clean_name(
        owner
            .as_ref()
            .and_then(|o| o.reporting_owner_id.as_ref())
            .and_then(|id| id.rpt_owner_name.as_ref())
            .and_then(Wrapped::as_inner)
            .map(String::as_str),
        &config.unknown_name,
    );
    let role = owner
        .as_ref()
        .and_then(|o| o.reporting_owner_relationship.as_ref())
        .map_or(InsiderRole::Other, |r| {
            InsiderRole::from_flags(
                flag(r.is_officer.as_ref()),
                flag(r.is_director.as_ref()),
                flag(r.is_ten_percent_owner.as_ref()),
            )
        });

    let is_planned = flag(doc.aff_10b5_one.as_ref())
        || doc.footnotes.as_ref().is_some_and(mentions_trading_plan)
        || doc.remarks.as_ref().is_some_and(mentions_trading_plan);

    let context = FilingContext {
        ticker,
        insider,
        role,
        filed_date,
        is_planned,
    };

    let entries = doc
        .non_derivative_table
        .and_then(|t| t.non_derivative_transaction)
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    Ok(entries
        .iter()
        .map(|entry| adapt_entry(entry, &context))
        .collect())
}

fn adapt_entry(value: &Value, context: &FilingContext) -> EntryResult {
    let entry = DocTransaction::deserialize(value)
        .map_err(|e| Error::malformed(format!("edgar transaction: {e}")))?;

    let amounts = entry.transaction_amounts.as_ref();
    let fields = EntryFields {
        trade_date: entry
            .transaction_date
            .and_then(Wrapped::into_inner)
            .as_deref()
            .and_then(parse_date),
        code: entry
            .transaction_coding
            .and_then(|c| c.transaction_code)
            .and_then(Wrapped::into_inner)
            .unwrap_or_default(),
        shares: wrapped_number(
            amounts.and_then(|a| a.transaction_shares.as_ref()),
            "transactionShares",
        )?,
        price_per_share: wrapped_number(
            amounts.and_then(|a| a.transaction_price_per_share.as_ref()),
            "transactionPricePerShare",
        )?,
        shares_owned_after: wrapped_number(
            entry
                .post_transaction_amounts
                .as_ref()
                .and_then(|p| p.shares_owned_following_transaction.as_ref()),
            "sharesOwnedFollowingTransaction",
        )?,
        is_planned: false,
    };
    Ok(context.transaction(fields))
}
