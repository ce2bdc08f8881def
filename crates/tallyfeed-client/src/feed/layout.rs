use crate::feed::normalize::{NormalizedTransaction, format_major};
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    All,
    ApiOnly,
    WithDirection,
    Complete,
    Deduplicated,
}

/// Which in-scope records a layout writes, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSelection {
    Everything,
    ApiOnly,
    Deduplicated,
}

const ALL_COLUMNS: [&str; 23] = [
    "id",
    "provider",
    "externalId",
    "feedItemUid",
    "amountMinor",
    "amountGBP",
    "currency",
    "occurredAt",
    "personName",
    "counterPartyName",
    "productType",
    "status",
    "confidence",
    "description",
    "reference",
    "direction",
    "spendingCategory",
    "source",
    "settlementTime",
    "transactionTime",
    "createdAt",
    "updatedAt",
    "leadId",
];

const API_ONLY_COLUMNS: [&str; 28] = [
    "direction",
    "feedItemUid",
    "transactionTime",
    "settlementTime",
    "occurredAt",
    "amountGBP",
    "amountMinor",
    "currency",
    "status",
    "spendingCategory",
    "source",
    "counterPartyName",
    "counterPartyType",
    "counterPartyUid",
    "counterPartySubEntityIdentifier",
    "counterPartySubEntitySubIdentifier",
    "reference",
    "description",
    "country",
    "merchantUid",
    "hasReceipt",
    "hasAttachment",
    "externalId",
    "id",
    "leadId",
    "confidence",
    "createdAt",
    "updatedAt",
];

const WITH_DIRECTION_COLUMNS: [&str; 28] = [
    "direction",
    "feedItemUid",
    "externalId",
    "id",
    "transactionTime",
    "settlementTime",
    "occurredAt",
    "updatedAt",
    "amountGBP",
    "amountMinor",
    "currency",
    "status",
    "spendingCategory",
    "source",
    "counterPartyName",
    "counterPartyType",
    "personName",
    "reference",
    "description",
    "country",
    "counterPartySubEntityName",
    "counterPartySubEntityIdentifier",
    "counterPartySubEntitySubIdentifier",
    "hasReceipt",
    "hasAttachment",
    "leadId",
    "confidence",
    "createdAt",
];

const COMPLETE_COLUMNS: [&str; 29] = [
    "direction",
    "direction_source",
    "feedItemUid",
    "externalId",
    "id",
    "transactionTime",
    "settlementTime",
    "occurredAt",
    "amountGBP",
    "amountMinor",
    "currency",
    "status",
    "spendingCategory",
    "source",
    "productType",
    "counterPartyName",
    "counterPartyType",
    "personName",
    "reference",
    "description",
    "data_source",
    "sourceFile",
    "country",
    "counterPartySubEntityIdentifier",
    "counterPartySubEntitySubIdentifier",
    "leadId",
    "confidence",
    "createdAt",
    "updatedAt",
];

const DEDUPLICATED_COLUMNS: [&str; 29] = [
    "direction",
    "data_source",
    "feedItemUid",
    "transactionTime",
    "settlementTime",
    "occurredAt",
    "amountGBP",
    "amountMinor",
    "currency",
    "status",
    "spendingCategory",
    "source",
    "counterPartyName",
    "counterPartyType",
    "personName",
    "reference",
    "description",
    "country",
    "counterPartySubEntityIdentifier",
    "counterPartySubEntitySubIdentifier",
    "hasReceipt",
    "hasAttachment",
    "externalId",
    "id",
    "leadId",
    "confidence",
    "sourceFile",
    "createdAt",
    "updatedAt",
];

pub const ALL_LAYOUTS: [Layout; 5] = [
    Layout::All,
    Layout::ApiOnly,
    Layout::WithDirection,
    Layout::Complete,
    Layout::Deduplicated,
];

impl Layout {
    pub fn parse(value: &str) -> ClientResult<Self> {
        ALL_LAYOUTS
            .iter()
            .copied()
            .find(|layout| layout.slug() == value)
            .ok_or_else(|| {
                ClientError::invalid_argument_for_command(
                    &format!(
                        "Unknown layout `{value}`. Expected one of: all, api-only, with-direction, complete, deduplicated."
                    ),
                    Some("export"),
                )
            })
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ApiOnly => "api-only",
            Self::WithDirection => "with-direction",
            Self::Complete => "complete",
            Self::Deduplicated => "deduplicated",
        }
    }

    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::All => "all_transactions",
            Self::ApiOnly => "api_only",
            Self::WithDirection => "with_direction",
            Self::Complete => "complete_with_direction",
            Self::Deduplicated => "deduplicated_final",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::All => "Every in-scope record in service order",
            Self::ApiOnly => "Live provider records with provider identifiers",
            Self::WithDirection => "Live provider records with direction resolved first",
            Self::Complete => "Every in-scope record, newest first, with direction and data source",
            Self::Deduplicated => "Live records plus imported history with restatements removed",
        }
    }

    pub const fn selection(self) -> RecordSelection {
        match self {
            Self::All | Self::Complete => RecordSelection::Everything,
            Self::ApiOnly | Self::WithDirection => RecordSelection::ApiOnly,
            Self::Deduplicated => RecordSelection::Deduplicated,
        }
    }

    pub const fn sorts_newest_first(self) -> bool {
        matches!(self, Self::Complete | Self::Deduplicated)
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::All => &ALL_COLUMNS,
            Self::ApiOnly => &API_ONLY_COLUMNS,
            Self::WithDirection => &WITH_DIRECTION_COLUMNS,
            Self::Complete => &COMPLETE_COLUMNS,
            Self::Deduplicated => &DEDUPLICATED_COLUMNS,
        }
    }
}

/// Cell text for one column of one normalized record, `None` for unknown columns.
pub fn cell(column: &str, normalized: &NormalizedTransaction<'_>) -> Option<String> {
    let record = normalized.record;
    let value = match column {
        "direction" => normalized.direction.as_str().to_string(),
        "direction_source" => normalized.direction_source.as_str().to_string(),
        "data_source" => normalized.data_source.as_str().to_string(),
        "amountGBP" => format_major(record.amount_minor),
        "amountMinor" => record.amount_minor.to_string(),
        "id" => record.id.clone(),
        "externalId" => record.external_id.clone(),
        "provider" => record.provider.clone(),
        "currency" => record.currency.clone(),
        "productType" => record.product_type.clone(),
        "occurredAt" => record.occurred_at.clone(),
        "personName" => record.person_name.clone(),
        "description" => record.description.clone(),
        "leadId" => record.lead_id.clone(),
        "confidence" => record.confidence.clone(),
        "sourceFile" => record.source_file.clone(),
        "createdAt" => record.created_at.clone(),
        "updatedAt" => record.updated_at.clone(),
        "status" => record
            .raw_field("status")
            .unwrap_or_else(|| record.status.clone()),
        "reference" => record
            .raw_field("reference")
            .unwrap_or_else(|| record.reference.clone()),
        "spendingCategory" => record
            .raw_field("spendingCategory")
            .or_else(|| record.metadata_field("spendingCategory"))
            .unwrap_or_default(),
        "feedItemUid"
        | "transactionTime"
        | "settlementTime"
        | "source"
        | "counterPartyName"
        | "counterPartyType"
        | "counterPartyUid"
        | "counterPartySubEntityName"
        | "counterPartySubEntityIdentifier"
        | "counterPartySubEntitySubIdentifier"
        | "country"
        | "merchantUid"
        | "hasReceipt"
        | "hasAttachment" => record.raw_text(column),
        _ => return None,
    };
    Some(value)
}

pub fn row(layout: Layout, normalized: &NormalizedTransaction<'_>) -> Vec<String> {
    layout
        .columns()
        .iter()
        .map(|column| cell(column, normalized).unwrap_or_default())
        .collect()
}
