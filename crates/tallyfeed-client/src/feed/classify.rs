use crate::feed::record::RawTransaction;

/// Raw payload keys that only live provider sync or webhook ingestion fills in.
pub const PROVIDER_MARKER_KEYS: [&str; 2] = ["feedItemUid", "source"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataSource {
    Api,
    Imported,
}

impl DataSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Imported => "csv_import",
        }
    }

    pub const fn is_authoritative(self) -> bool {
        matches!(self, Self::Api)
    }
}

pub fn data_source_of(record: &RawTransaction) -> DataSource {
    if has_provider_marker(record) {
        DataSource::Api
    } else {
        DataSource::Imported
    }
}

pub fn has_provider_marker(record: &RawTransaction) -> bool {
    PROVIDER_MARKER_KEYS
        .iter()
        .any(|key| record.raw_field(key).is_some())
}

pub fn in_scope(record: &RawTransaction, provider: &str) -> bool {
    record.provider == provider
}
