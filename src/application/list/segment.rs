//! Four-way segment partition of a source against three targets.
//!
//! With `U`, `H`, `C` the presence sets of the three targets, every source
//! base lands in exactly one bucket, checked in this order:
//!
//! | segment | rule                                   |
//! |---------|----------------------------------------|
//! | seg3    | on U, H and C                          |
//! | seg4    | on U only                              |
//! | seg2    | on at least two of U, H, C             |
//! | seg1    | everything else (never on U)           |
//!
//! seg0 (on none of the targets) is an optional overlay outside the partition.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{ListRow, PresenceSet, SourceIndex};
use crate::error::SegmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Seg0,
    Seg1,
    Seg2,
    Seg3,
    Seg4,
}

impl Segment {
    /// Members of the four-way partition.
    pub const PARTITION: [Self; 4] = [Self::Seg1, Self::Seg2, Self::Seg3, Self::Seg4];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seg0 => "seg0",
            Self::Seg1 => "seg1",
            Self::Seg2 => "seg2",
            Self::Seg3 => "seg3",
            Self::Seg4 => "seg4",
        }
    }

    /// List slug of this segment for `source`, e.g. `bybit_seg2`.
    #[must_use]
    pub fn slug(self, source: &str) -> String {
        format!("{source}_{}", self.as_str())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence sets of the three segment targets.
#[derive(Debug, Clone, Copy)]
pub struct TargetSets<'a> {
    pub upbit: &'a PresenceSet,
    pub bithumb: &'a PresenceSet,
    pub coinbase: &'a PresenceSet,
}

/// Rows per segment, each sorted by spot symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments {
    pub seg0: Option<Vec<ListRow>>,
    pub seg1: Vec<ListRow>,
    pub seg2: Vec<ListRow>,
    pub seg3: Vec<ListRow>,
    pub seg4: Vec<ListRow>,
}

impl Segments {
    /// Every populated segment with its rows; seg0 only when computed.
    #[must_use]
    pub fn buckets(&self) -> Vec<(Segment, &[ListRow])> {
        let mut out = Vec::with_capacity(5);
        if let Some(seg0) = &self.seg0 {
            out.push((Segment::Seg0, seg0.as_slice()));
        }
        out.push((Segment::Seg1, self.seg1.as_slice()));
        out.push((Segment::Seg2, self.seg2.as_slice()));
        out.push((Segment::Seg3, self.seg3.as_slice()));
        out.push((Segment::Seg4, self.seg4.as_slice()));
        out
    }
}

/// Bucket of a base from its presence on the three targets.
#[must_use]
pub const fn classify(on_upbit: bool, on_bithumb: bool, on_coinbase: bool) -> Segment {
    let (u, h, c) = (on_upbit, on_bithumb, on_coinbase);
    if u && h && c {
        Segment::Seg3
    } else if u && !h && !c {
        Segment::Seg4
    } else if (u && c) || (c && h) || (u && h) {
        Segment::Seg2
    } else {
        Segment::Seg1
    }
}

/// Partition `source` into seg1..seg4, plus seg0 when `with_unlisted`.
///
/// # Errors
/// Returns [`SegmentError`] if a base is missing from, or repeated in, the partition.
pub fn build_segments(
    source: &SourceIndex,
    targets: TargetSets<'_>,
    with_unlisted: bool,
) -> Result<Segments, SegmentError> {
    let mut buckets: BTreeMap<Segment, Vec<&str>> = BTreeMap::new();
    let mut unlisted: Vec<&str> = Vec::new();

    for base in source.keys() {
        let (u, h, c) = (
            targets.upbit.contains(base),
            targets.bithumb.contains(base),
            targets.coinbase.contains(base),
        );
        if !u && !h && !c {
            unlisted.push(base);
        }
        buckets.entry(classify(u, h, c)).or_default().push(base);
    }

    verify_partition(source, &buckets)?;

    let rows = |bases: &[&str]| {
        let mut rows: Vec<ListRow> = bases
            .iter()
            .filter_map(|base| source.get(*base))
            .map(|info| ListRow::new(info.spot.clone(), info.futures.clone()))
            .collect();
        rows.sort_by(|a, b| a.spot.cmp(&b.spot));
        rows
    };
    let take = |segment: Segment| {
        buckets
            .get(&segment)
            .map_or_else(Vec::new, |b| rows(b.as_slice()))
    };

    Ok(Segments {
        seg0: with_unlisted.then(|| rows(unlisted.as_slice())),
        seg1: take(Segment::Seg1),
        seg2: take(Segment::Seg2),
        seg3: take(Segment::Seg3),
        seg4: take(Segment::Seg4),
    })
}

fn verify_partition(
    source: &SourceIndex,
    buckets: &BTreeMap<Segment, Vec<&str>>,
) -> Result<(), SegmentError> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for segment in Segment::PARTITION {
        for base in buckets.get(&segment).into_iter().flatten() {
            *seen.entry(*base).or_default() += 1;
        }
    }
    for base in source.keys() {
        match seen.get(base.as_str()).copied().unwrap_or(0) {
            1 => {}
            0 => return Err(SegmentError::Unassigned { base: base.clone() }),
            count => {
                return Err(SegmentError::Duplicated {
                    base: base.clone(),
                    count,
                })
            }
        }
    }
    Ok(())
}
