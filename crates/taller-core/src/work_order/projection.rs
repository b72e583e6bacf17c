//! Board projection of work orders.
//!
//! Pure functions turning a flat order list plus the operator's filter
//! selections into stage buckets with badge counts. Nothing here touches
//! the network or keeps state; `today` is always passed in.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{Priority, Stage, WorkOrder};

/// Orders due in strictly fewer days than this (and strictly in the future)
/// count as "due soon".
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

/// Key of one board column.
///
/// Orders with a missing or unrecognized stage land in `Unassigned`
/// instead of being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKey {
    Stage(Stage),
    Unassigned,
}

impl StageKey {
    /// Every key in board order, the sentinel last.
    pub const ALL: [StageKey; 4] = [
        StageKey::Stage(Stage::Entrada),
        StageKey::Stage(Stage::Reparacion),
        StageKey::Stage(Stage::Salida),
        StageKey::Unassigned,
    ];
}

impl From<Option<Stage>> for StageKey {
    fn from(stage: Option<Stage>) -> Self {
        stage.map_or(StageKey::Unassigned, StageKey::Stage)
    }
}

impl From<Stage> for StageKey {
    fn from(stage: Stage) -> Self {
        StageKey::Stage(stage)
    }
}

impl std::fmt::Display for StageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKey::Stage(stage) => stage.fmt(f),
            StageKey::Unassigned => f.write_str("Sin etapa"),
        }
    }
}

/// The operator's board filter selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Case-insensitive substring matched against the client's first name.
    pub search: String,
    /// Empty means every priority passes.
    pub priorities: BTreeSet<Priority>,
    pub due_soon: bool,
}

impl FilterState {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priorities.insert(priority);
        self
    }

    pub fn with_due_soon(mut self, due_soon: bool) -> Self {
        self.due_soon = due_soon;
        self
    }

    /// Whether `order` passes every active filter.
    pub fn matches(&self, order: &WorkOrder, today: NaiveDate) -> bool {
        self.matches_search(order) && self.matches_priority(order) && self.matches_due_soon(order, today)
    }

    fn matches_search(&self, order: &WorkOrder) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        order
            .client_first_name()
            .is_some_and(|name| name.to_lowercase().contains(&needle))
    }

    fn matches_priority(&self, order: &WorkOrder) -> bool {
        self.priorities.is_empty() || self.priorities.contains(&order.priority)
    }

    fn matches_due_soon(&self, order: &WorkOrder, today: NaiveDate) -> bool {
        !self.due_soon || is_due_soon(order, today)
    }
}

/// `0 < days < DUE_SOON_WINDOW_DAYS` between `today` and the promised date.
///
/// Orders due today, overdue orders and orders without a promised date are
/// not due soon.
pub fn is_due_soon(order: &WorkOrder, today: NaiveDate) -> bool {
    order.promised_date.is_some_and(|promised| {
        let days = (promised - today).num_days();
        days > 0 && days < DUE_SOON_WINDOW_DAYS
    })
}

/// Orders grouped by stage, input order preserved within each bucket.
///
/// Every key of [`StageKey::ALL`] is present, possibly with an empty bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct StageBuckets<'a> {
    buckets: BTreeMap<StageKey, Vec<&'a WorkOrder>>,
}

impl<'a> StageBuckets<'a> {
    fn empty() -> Self {
        Self {
            buckets: StageKey::ALL.into_iter().map(|k| (k, Vec::new())).collect(),
        }
    }

    /// The bucket for `key`.
    pub fn get(&self, key: impl Into<StageKey>) -> &[&'a WorkOrder] {
        let key: StageKey = key.into();
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids in a bucket, handy for display and assertions.
    pub fn ids(&self, key: impl Into<StageKey>) -> Vec<i64> {
        self.get(key).iter().map(|o| o.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StageKey, &[&'a WorkOrder])> {
        self.buckets.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Badge counts per board column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCounts {
    counts: BTreeMap<StageKey, usize>,
}

impl StageCounts {
    /// Count for `key`; zero for empty columns.
    pub fn get(&self, key: impl Into<StageKey>) -> usize {
        let key: StageKey = key.into();
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StageKey, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

/// Partitions `orders` by stage (stable).
pub fn project_by_stage<'a, I>(orders: I) -> StageBuckets<'a>
where
    I: IntoIterator<Item = &'a WorkOrder>,
{
    let mut projected = StageBuckets::empty();
    for order in orders {
        projected
            .buckets
            .entry(StageKey::from(order.stage))
            .or_default()
            .push(order);
    }
    projected
}

/// Keeps the orders that pass every active filter, in input order.
pub fn apply_filters<'a>(
    orders: &'a [WorkOrder],
    filter: &FilterState,
    today: NaiveDate,
) -> Vec<&'a WorkOrder> {
    orders.iter().filter(|o| filter.matches(o, today)).collect()
}

/// Size of every bucket of an already filtered projection.
pub fn count_by_stage(projected: &StageBuckets<'_>) -> StageCounts {
    StageCounts {
        counts: projected.buckets.iter().map(|(k, v)| (*k, v.len())).collect(),
    }
}

/// Filtered buckets and their counts, as consumed by the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView<'a> {
    pub buckets: StageBuckets<'a>,
    pub counts: StageCounts,
}

/// Filters, projects and counts in one go. Counts are always post-filter.
pub fn board_view<'a>(orders: &'a [WorkOrder], filter: &FilterState, today: NaiveDate) -> BoardView<'a> {
    let buckets = project_by_stage(apply_filters(orders, filter, today));
    let counts = count_by_stage(&buckets);
    BoardView { buckets, counts }
}
