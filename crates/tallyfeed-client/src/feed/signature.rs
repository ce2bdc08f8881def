use crate::feed::record::RawTransaction;

/// Heuristic identity of an economic event: same amount, same calendar
/// date, same counterparty. Only ever used as an in-memory dedupe key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    pub amount_minor: i64,
    pub date: String,
    pub name: String,
}

impl Signature {
    pub fn of(record: &RawTransaction) -> Self {
        Self {
            amount_minor: record.amount_minor,
            date: record.occurred_date().to_string(),
            name: normalize_name(&counterparty_name(record)),
        }
    }
}

/// Provider counterparty name when present, otherwise the ledger's person name.
pub fn counterparty_name(record: &RawTransaction) -> String {
    record
        .raw_field("counterPartyName")
        .unwrap_or_else(|| record.person_name.clone())
}

pub fn normalize_name(value: &str) -> String {
    value.trim().to_uppercase()
}
