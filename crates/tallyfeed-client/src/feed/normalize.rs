use tracing::debug;

use crate::feed::classify::{DataSource, data_source_of};
use crate::feed::record::RawTransaction;
use crate::feed::signature::Signature;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    In,
    Out,
    /// Explicit provider value that is neither `IN` nor `OUT`, kept verbatim.
    Other(String),
}

impl Direction {
    pub fn from_explicit(value: &str) -> Self {
        match value {
            "IN" => Self::In,
            "OUT" => Self::Out,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn inferred_from_amount(amount_minor: i64) -> Self {
        if amount_minor >= 0 { Self::In } else { Self::Out }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Other(value) => value.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectionSource {
    Raw,
    Metadata,
    Inferred,
}

impl DirectionSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Metadata => "metadata",
            Self::Inferred => "inferred",
        }
    }

    pub const fn is_explicit(self) -> bool {
        !matches!(self, Self::Inferred)
    }
}

type DirectionResolver = fn(&RawTransaction) -> Option<String>;

/// Explicit direction tiers in priority order. Amount-sign inference runs
/// only when every tier comes back empty.
const EXPLICIT_DIRECTION_TIERS: [(DirectionSource, DirectionResolver); 2] = [
    (DirectionSource::Raw, direction_from_raw),
    (DirectionSource::Metadata, direction_from_metadata),
];

fn direction_from_raw(record: &RawTransaction) -> Option<String> {
    record.raw_field("direction")
}

fn direction_from_metadata(record: &RawTransaction) -> Option<String> {
    record.metadata_field("direction")
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTransaction<'a> {
    pub record: &'a RawTransaction,
    pub direction: Direction,
    pub direction_source: DirectionSource,
    pub data_source: DataSource,
    pub amount_major: f64,
    pub signature: Signature,
}

pub fn normalize(record: &RawTransaction) -> NormalizedTransaction<'_> {
    let (direction, direction_source) = resolve_direction(record);
    NormalizedTransaction {
        record,
        direction,
        direction_source,
        data_source: data_source_of(record),
        amount_major: amount_major(record.amount_minor),
        signature: Signature::of(record),
    }
}

pub fn resolve_direction(record: &RawTransaction) -> (Direction, DirectionSource) {
    let explicit = EXPLICIT_DIRECTION_TIERS.iter().find_map(|(source, resolve)| {
        let value = resolve(record)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some((Direction::from_explicit(trimmed), *source))
    });

    if let Some(resolved) = explicit {
        return resolved;
    }

    debug!(
        id = record.id.as_str(),
        amount_minor = record.amount_minor,
        "no explicit direction, inferring from amount sign"
    );
    (
        Direction::inferred_from_amount(record.amount_minor),
        DirectionSource::Inferred,
    )
}

/// Minor units to major units, rounded to the nearest cent with ties away
/// from zero.
pub fn amount_major(amount_minor: i64) -> f64 {
    let value = amount_minor as f64 / 100.0;
    (value * 100.0).round() / 100.0
}

/// Two-decimal display form of a minor-unit amount, computed without floats.
pub fn format_major(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let magnitude = amount_minor.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}
