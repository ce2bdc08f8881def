use std::collections::BTreeMap;

use crate::contracts::types::{DateRange, DirectionCount, SampleRow, SourceCount};
use crate::feed::classify::DataSource;
use crate::feed::normalize::{Direction, NormalizedTransaction, format_major};
use crate::feed::signature::counterparty_name;

pub(crate) const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, Default)]
struct DirectionTally {
    explicit: i64,
    inferred: i64,
}

impl DirectionTally {
    fn total(&self) -> i64 {
        self.explicit + self.inferred
    }
}

pub(crate) fn direction_breakdown(rows: &[NormalizedTransaction<'_>]) -> Vec<DirectionCount> {
    let mut tallies: BTreeMap<Direction, DirectionTally> = BTreeMap::new();
    for row in rows {
        let tally = tallies.entry(row.direction.clone()).or_default();
        if row.direction_source.is_explicit() {
            tally.explicit += 1;
        } else {
            tally.inferred += 1;
        }
    }

    tallies
        .into_iter()
        .map(|(direction, tally)| DirectionCount {
            direction: direction.as_str().to_string(),
            count: tally.total(),
            explicit: tally.explicit,
            inferred: tally.inferred,
        })
        .collect()
}

/// Both data sources are always listed so the report shape stays fixed.
pub(crate) fn source_breakdown(rows: &[NormalizedTransaction<'_>]) -> Vec<SourceCount> {
    let total = rows.len() as i64;
    [DataSource::Api, DataSource::Imported]
        .into_iter()
        .map(|source| {
            let count = rows.iter().filter(|row| row.data_source == source).count() as i64;
            SourceCount {
                data_source: source.as_str().to_string(),
                count,
                percent: percent_of(count, total),
            }
        })
        .collect()
}

pub(crate) fn date_range(rows: &[NormalizedTransaction<'_>]) -> DateRange {
    let mut dates = rows
        .iter()
        .map(|row| row.record.occurred_date())
        .filter(|date| !date.is_empty());
    let Some(first) = dates.next() else {
        return DateRange {
            earliest: None,
            latest: None,
        };
    };

    let (earliest, latest) = dates.fold((first, first), |(low, high), date| {
        (low.min(date), high.max(date))
    });
    DateRange {
        earliest: Some(earliest.to_string()),
        latest: Some(latest.to_string()),
    }
}

pub(crate) fn newest_sample(rows: &[NormalizedTransaction<'_>]) -> Vec<SampleRow> {
    let mut ordered = rows.iter().collect::<Vec<&NormalizedTransaction<'_>>>();
    ordered.sort_by(|left, right| right.record.occurred_at.cmp(&left.record.occurred_at));
    ordered
        .into_iter()
        .take(SAMPLE_SIZE)
        .map(|row| SampleRow {
            occurred_on: row.record.occurred_date().to_string(),
            direction: row.direction.as_str().to_string(),
            amount: format_major(row.record.amount_minor),
            counterparty: counterparty_name(row.record).trim().to_string(),
            data_source: row.data_source.as_str().to_string(),
        })
        .collect()
}

fn percent_of(count: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let percent = (count as f64) * 100.0 / (total as f64);
    (percent * 10.0).round() / 10.0
}
