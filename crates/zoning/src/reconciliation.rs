//! Endpoint reconciliation: which preference a freshly created segment
//! inherits from the segments deleted in the same tick.
//!
//! Road edits (split, merge, trim, replace) delete segments and create new ones
//! in a single tick. The new segments carry no preference yet, so the deleted
//! ones are indexed by their ground-plane endpoints and matched against the new
//! segment's endpoints:
//!
//! | head match | tail match | outcome |
//! |------------|------------|---------|
//! | X | X (same entity) | replacement, inherit X |
//! | X | Y, adjacent | merge, inherit if X and Y agree, else `Default` |
//! | X | Y, not adjacent | `Default` |
//! | X | - | inherit X |
//! | - | Y | inherit Y |
//! | - | - | `Default` |

use std::collections::HashMap;

use bevy::prelude::*;

use crate::config::ENDPOINT_TOLERANCE;
use crate::preference::ZoningPreference;

/// Ground-plane coordinate quantized to [`ENDPOINT_TOLERANCE`]. Only used to
/// find candidates; [`endpoints_meet`] makes the final call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    x: i64,
    z: i64,
}

impl EndpointKey {
    pub fn from_point(point: Vec2) -> Self {
        let q = |v: f32| (f64::from(v) / f64::from(ENDPOINT_TOLERANCE)).round() as i64;
        Self {
            x: q(point.x),
            z: q(point.y),
        }
    }

    /// This bucket and its eight neighbours. Two points within the tolerance
    /// on both axes always land in buckets at most one step apart.
    fn neighbourhood(self) -> impl Iterator<Item = EndpointKey> {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).map(move |dz| EndpointKey {
                x: self.x + dx,
                z: self.z + dz,
            })
        })
    }
}

/// Two endpoints are the same point when they differ by at most
/// [`ENDPOINT_TOLERANCE`] on each axis.
pub fn endpoints_meet(a: Vec2, b: Vec2) -> bool {
    let d = (a - b).abs();
    d.x <= ENDPOINT_TOLERANCE && d.y <= ENDPOINT_TOLERANCE
}

/// A segment removed this tick, captured before the host despawns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeletedSegment {
    pub entity: Entity,
    pub start: Vec2,
    pub end: Vec2,
    pub preference: Option<ZoningPreference>,
}

impl DeletedSegment {
    pub fn preference_or_default(&self) -> ZoningPreference {
        self.preference.unwrap_or_default()
    }

    fn point(&self, end: SegmentEnd) -> Vec2 {
        match end {
            SegmentEnd::Start => self.start,
            SegmentEnd::End => self.end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentEnd {
    Start,
    End,
}

/// How a new segment relates to the segments deleted this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inheritance {
    /// One deleted segment spans both endpoints.
    Replacement(ZoningPreference),
    /// Two adjacent deleted segments joined into one, with the same preference.
    Merge(ZoningPreference),
    /// Two adjacent deleted segments joined into one, preferences differ.
    MergeConflict,
    /// Both endpoints matched, but the two deleted segments never touched.
    Unrelated,
    /// Only the start matched.
    Head(ZoningPreference),
    /// Only the end matched.
    Tail(ZoningPreference),
    NoMatch,
}

impl Inheritance {
    pub fn preference(self) -> ZoningPreference {
        match self {
            Self::Replacement(p) | Self::Merge(p) | Self::Head(p) | Self::Tail(p) => p,
            Self::MergeConflict | Self::Unrelated | Self::NoMatch => ZoningPreference::Default,
        }
    }

    /// Whether any deleted segment touched the new one.
    pub fn matched(self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

/// Deleted segments of the current tick keyed by their endpoints.
///
/// Built in `ZoningSet::Collect`, read in `ZoningSet::Resolve` and cleared in
/// `ZoningSet::Cleanup`. When several deleted segments meet a queried point
/// the first one inserted wins.
#[derive(Resource, Debug, Default)]
pub struct EndpointIndex {
    segments: Vec<DeletedSegment>,
    /// Bucket -> positions in `segments`, in insertion order.
    by_start: HashMap<EndpointKey, Vec<usize>>,
    by_end: HashMap<EndpointKey, Vec<usize>>,
}

impl EndpointIndex {
    pub fn insert(&mut self, segment: DeletedSegment) {
        let slot = self.segments.len();
        self.segments.push(segment);
        self.by_start
            .entry(EndpointKey::from_point(segment.start))
            .or_default()
            .push(slot);
        self.by_end
            .entry(EndpointKey::from_point(segment.end))
            .or_default()
            .push(slot);
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.by_start.clear();
        self.by_end.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of distinct start buckets recorded.
    pub fn len(&self) -> usize {
        self.by_start.len()
    }

    /// Earliest inserted segment with that endpoint within tolerance of `point`.
    fn lookup(&self, point: Vec2, end: SegmentEnd) -> Option<usize> {
        let buckets = match end {
            SegmentEnd::Start => &self.by_start,
            SegmentEnd::End => &self.by_end,
        };
        EndpointKey::from_point(point)
            .neighbourhood()
            .filter_map(|key| buckets.get(&key))
            .flatten()
            .copied()
            .filter(|&slot| endpoints_meet(self.segments[slot].point(end), point))
            .min()
    }

    /// Same-end map first, then the opposite end.
    fn touching(&self, point: Vec2, same: SegmentEnd, other: SegmentEnd) -> Option<DeletedSegment> {
        self.lookup(point, same)
            .or_else(|| self.lookup(point, other))
            .map(|slot| self.segments[slot])
    }

    /// Match a new segment running from `start` to `end`.
    pub fn inherit(&self, start: Vec2, end: Vec2) -> Inheritance {
        let head = self.touching(start, SegmentEnd::Start, SegmentEnd::End);
        let tail = self.touching(end, SegmentEnd::End, SegmentEnd::Start);

        match (head, tail) {
            (Some(h), Some(t)) if h.entity == t.entity => {
                Inheritance::Replacement(h.preference_or_default())
            }
            (Some(h), Some(t)) => {
                let adjacent = endpoints_meet(h.end, t.start) || endpoints_meet(h.start, t.end);
                if !adjacent {
                    Inheritance::Unrelated
                } else if h.preference_or_default() == t.preference_or_default() {
                    Inheritance::Merge(h.preference_or_default())
                } else {
                    Inheritance::MergeConflict
                }
            }
            (Some(h), None) => Inheritance::Head(h.preference_or_default()),
            (None, Some(t)) => Inheritance::Tail(t.preference_or_default()),
            (None, None) => Inheritance::NoMatch,
        }
    }
}

/// Host-driven upgrade path: rebuilding a segment in place keeps its own
/// preference and may resize blocks that already hold buildings.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpgradeMode {
    pub enabled: bool,
    /// Segment currently being upgraded, as reported by the host.
    pub target: Option<Entity>,
}

impl UpgradeMode {
    pub fn upgrading(&self, segment: Entity) -> bool {
        self.enabled && self.target == Some(segment)
    }

    /// The occupancy guard is lifted only for blocks of the segment the host
    /// is upgrading.
    pub fn allows_occupied_override(&self, owner: Entity) -> bool {
        self.upgrading(owner)
    }
}

/// Which rule decided a segment's preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceSource {
    /// The segment already carried a preference.
    Existing,
    /// The segment is not an applied edit, so nothing is inherited.
    NotApplied,
    Inherited(Inheritance),
    /// Applied edit with no endpoint match.
    Unmatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub preference: ZoningPreference,
    pub source: PreferenceSource,
}

impl Resolution {
    fn new(preference: ZoningPreference, source: PreferenceSource) -> Self {
        Self { preference, source }
    }
}

/// Everything the resolver needs about one segment, as plain values.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    pub segment: Entity,
    pub start: Vec2,
    pub end: Vec2,
    pub existing: Option<ZoningPreference>,
    /// The host flagged the segment as the product of a committed edit.
    pub applied: bool,
    pub upgrade: UpgradeMode,
    pub index: &'a EndpointIndex,
}

pub fn resolve_preference(ctx: ResolutionContext<'_>) -> Resolution {
    let upgrading = ctx.upgrade.upgrading(ctx.segment);

    if let Some(existing) = ctx.existing {
        if !upgrading {
            return Resolution::new(existing, PreferenceSource::Existing);
        }
    }

    if !ctx.applied {
        return match ctx.existing {
            Some(existing) => Resolution::new(existing, PreferenceSource::Existing),
            None => Resolution::new(ZoningPreference::Default, PreferenceSource::NotApplied),
        };
    }

    let inheritance = ctx.index.inherit(ctx.start, ctx.end);
    if inheritance.matched() {
        return Resolution::new(
            inheritance.preference(),
            PreferenceSource::Inherited(inheritance),
        );
    }

    match ctx.existing {
        Some(existing) => Resolution::new(existing, PreferenceSource::Existing),
        None => Resolution::new(ZoningPreference::Default, PreferenceSource::Unmatched),
    }
}
