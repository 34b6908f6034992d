// src/analyzer.rs

use crate::model::{EventKey, Record, SwimmerKey};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Finals times of one swimmer in one event, keyed by swim date.
pub type TimeSeries = BTreeMap<NaiveDate, f64>;

/// Two-level map `outer -> inner -> date -> time`.
///
/// Inserting a triple that is already present replaces its time (last write
/// wins) and hands back the replaced value. Nothing is averaged or merged.
#[derive(Debug, Clone)]
pub struct NestedIndex<O: Ord, I: Ord> {
    entries: BTreeMap<O, BTreeMap<I, TimeSeries>>,
}

impl<O: Ord, I: Ord> Default for NestedIndex<O, I> {
    fn default() -> Self {
        Self { entries: BTreeMap::new() }
    }
}

impl<O: Ord, I: Ord> NestedIndex<O, I> {
    pub fn insert(&mut self, outer: O, inner: I, date: NaiveDate, time: f64) -> Option<f64> {
        self.entries
            .entry(outer)
            .or_default()
            .entry(inner)
            .or_default()
            .insert(date, time)
    }

    pub fn get(&self, outer: &O, inner: &I, date: &NaiveDate) -> Option<f64> {
        self.entries.get(outer)?.get(inner)?.get(date).copied()
    }

    pub fn inner(&self, outer: &O) -> Option<&BTreeMap<I, TimeSeries>> {
        self.entries.get(outer)
    }

    pub fn keys(&self) -> impl Iterator<Item = &O> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&O, &BTreeMap<I, TimeSeries>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fastest (`best`) and slowest (`worst`) time ever seen for one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventBounds {
    pub best: f64,
    pub worst: f64,
}

impl EventBounds {
    fn new(time: f64) -> Self {
        Self { best: time, worst: time }
    }

    fn observe(&mut self, time: f64) {
        if time < self.best {
            self.best = time;
        }
        if time > self.worst {
            self.worst = time;
        }
    }
}

/// Every distinct swim date in the corpus, sorted, with dense positions.
#[derive(Debug, Clone, Default)]
pub struct DateAxis {
    dates: Vec<NaiveDate>,
    positions: BTreeMap<NaiveDate, usize>,
}

impl DateAxis {
    pub fn from_dates(dates: BTreeSet<NaiveDate>) -> Self {
        let dates: Vec<NaiveDate> = dates.into_iter().collect();
        let positions = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        Self { dates, positions }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn position(&self, date: &NaiveDate) -> Option<usize> {
        self.positions.get(date).copied()
    }

    pub fn date_at(&self, position: usize) -> Option<NaiveDate> {
        self.dates.get(position).copied()
    }

    /// Observed `(position, time)` pairs of a series, in axis order.
    pub fn points(&self, series: &TimeSeries) -> Vec<(usize, f64)> {
        series
            .iter()
            .filter_map(|(date, time)| self.position(date).map(|p| (p, *time)))
            .collect()
    }

    /// Spreads a series over the full axis; unobserved positions are `None`.
    pub fn align(&self, series: &TimeSeries) -> Vec<Option<f64>> {
        let mut aligned = vec![None; self.len()];
        for (position, time) in self.points(series) {
            aligned[position] = Some(time);
        }
        aligned
    }
}

/// The in-memory index every chart is drawn from.
#[derive(Debug, Clone, Default)]
pub struct AggregationIndex {
    by_swimmer: NestedIndex<SwimmerKey, EventKey>,
    by_event: NestedIndex<EventKey, SwimmerKey>,
    bounds: BTreeMap<EventKey, EventBounds>,
    axis: DateAxis,
    record_count: usize,
}

impl AggregationIndex {
    /// Builds both views, the event bounds and the date axis in one pass.
    ///
    /// Bounds see every record, including ones whose time is later
    /// overwritten by a duplicate triple.
    pub fn build(records: &[Record]) -> Self {
        let mut index = AggregationIndex::default();
        let mut dates = BTreeSet::new();

        for record in records {
            let replaced = index.by_swimmer.insert(
                record.swimmer.clone(),
                record.event,
                record.date,
                record.time,
            );
            index
                .by_event
                .insert(record.event, record.swimmer.clone(), record.date, record.time);
            if let Some(previous) = replaced {
                debug!(
                    swimmer = %record.swimmer,
                    event = %record.event,
                    date = %record.date,
                    previous,
                    time = record.time,
                    "duplicate swim replaced"
                );
            }

            dates.insert(record.date);

            index
                .bounds
                .entry(record.event)
                .and_modify(|b| b.observe(record.time))
                .or_insert_with(|| EventBounds::new(record.time));
        }

        index.axis = DateAxis::from_dates(dates);
        index.record_count = records.len();
        info!(
            records = index.record_count,
            swimmers = index.by_swimmer.len(),
            events = index.by_event.len(),
            dates = index.axis.len(),
            "built aggregation index"
        );
        index
    }

    pub fn swimmers(&self) -> impl Iterator<Item = &SwimmerKey> {
        self.by_swimmer.keys()
    }

    pub fn events(&self) -> impl Iterator<Item = &EventKey> {
        self.by_event.keys()
    }

    pub fn by_swimmer(&self) -> &NestedIndex<SwimmerKey, EventKey> {
        &self.by_swimmer
    }

    pub fn by_event(&self) -> &NestedIndex<EventKey, SwimmerKey> {
        &self.by_event
    }

    pub fn swimmer_events(&self, swimmer: &SwimmerKey) -> Option<&BTreeMap<EventKey, TimeSeries>> {
        self.by_swimmer.inner(swimmer)
    }

    pub fn event_swimmers(&self, event: &EventKey) -> Option<&BTreeMap<SwimmerKey, TimeSeries>> {
        self.by_event.inner(event)
    }

    pub fn time_by_swimmer(&self, swimmer: &SwimmerKey, event: &EventKey, date: &NaiveDate) -> Option<f64> {
        self.by_swimmer.get(swimmer, event, date)
    }

    pub fn time_by_event(&self, event: &EventKey, swimmer: &SwimmerKey, date: &NaiveDate) -> Option<f64> {
        self.by_event.get(event, swimmer, date)
    }

    pub fn bounds(&self, event: &EventKey) -> Option<EventBounds> {
        self.bounds.get(event).copied()
    }

    pub fn axis(&self) -> &DateAxis {
        &self.axis
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }
}
