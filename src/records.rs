// src/records.rs

use crate::error::ReportResult;
use crate::model::{Entry, Meet, Record, SwimmerKey};
use chrono::NaiveDate;
use tracing::debug;

/// Flattens parsed meets into individual-swimmer records sorted by date.
///
/// The first parse error ends the stream and is returned as-is. Entries
/// without exactly one swimmer, without a positive finals time, or without
/// any date are dropped.
pub fn collect_records<I>(meets: I) -> ReportResult<Vec<Record>>
where
    I: IntoIterator<Item = ReportResult<Meet>>,
{
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for meet in meets {
        let meet = meet?;
        for event in &meet.events {
            let event_key = event.key();
            for entry in &event.entries {
                match record_from_entry(&meet, entry) {
                    Some((swimmer, date, time)) => records.push(Record {
                        swimmer,
                        event: event_key,
                        date,
                        time,
                    }),
                    None => dropped += 1,
                }
            }
        }
    }

    // sort_by_key is stable: same-day swims keep encounter order
    records.sort_by_key(|r| r.date);
    debug!(kept = records.len(), dropped, "collected records");
    Ok(records)
}

fn record_from_entry(
    meet: &Meet,
    entry: &Entry,
) -> Option<(SwimmerKey, NaiveDate, f64)> {
    let [swimmer] = entry.swimmers.as_slice() else {
        return None;
    };
    let time = entry.finals_time.filter(|t| *t > 0.0)?;
    let date = entry.finals_date.or(meet.start_date)?;
    Some((swimmer.key(), date, time))
}
