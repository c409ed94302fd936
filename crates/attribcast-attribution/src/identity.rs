//! Cross-device identity resolution.
//!
//! Groups touchpoint and conversion events believed to belong to the same
//! listener using union-find over shared identity signals. Edges are only
//! created between events sharing an actual signal:
//! - authenticated user id: strength 1.0 (deterministic)
//! - session id: strength 0.9
//! - device fingerprint or IP/user-agent hash within the fingerprint
//!   window: strength 0.6
//!
//! A group's confidence is the minimum edge strength inside it (worst-case
//! chain); two different weak signals between the same pair never combine
//! into a stronger pseudo-edge. Unmatched events become singleton groups
//! with confidence 1.0.

use crate::types::IdentityGroup;
use attribcast_core::config::EngineConfig;
use attribcast_core::events::{ConversionEvent, RejectedEvent, TouchpointEvent};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Flattened identity view of one event, touchpoint or conversion.
struct SignalView<'a> {
    id: Uuid,
    timestamp: DateTime<Utc>,
    user_id: Option<&'a str>,
    session_id: Option<&'a str>,
    device_id: Option<&'a str>,
    ip_hash: Option<&'a str>,
}

/// Output of one resolution run. Scoped to that run and discarded after it;
/// re-computation supersedes earlier outputs.
#[derive(Debug, Clone, Default)]
pub struct ResolutionOutput {
    /// All identity groups, ordered by first member appearance.
    pub groups: Vec<IdentityGroup>,
    /// Malformed events excluded from resolution.
    pub rejected: Vec<RejectedEvent>,
    group_index: HashMap<Uuid, usize>,
}

impl ResolutionOutput {
    /// The group containing the given event, if it was resolved.
    #[must_use]
    pub fn group_of(&self, event_id: Uuid) -> Option<&IdentityGroup> {
        self.group_index.get(&event_id).map(|&i| &self.groups[i])
    }

    /// Returns true if the event was excluded as malformed.
    #[must_use]
    pub fn was_rejected(&self, event_id: Uuid) -> bool {
        self.rejected.iter().any(|r| r.id == event_id)
    }
}

/// Identity resolver over one bounded batch of events.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    config: EngineConfig,
}

impl IdentityResolver {
    /// Create a resolver with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve identity groups for a batch of events.
    ///
    /// Malformed events are excluded and reported in the output; they never
    /// abort the batch.
    #[must_use]
    pub fn resolve(
        &self,
        touchpoints: &[TouchpointEvent],
        conversions: &[ConversionEvent],
    ) -> ResolutionOutput {
        let mut rejected = Vec::new();
        let mut views: Vec<SignalView<'_>> = Vec::with_capacity(touchpoints.len() + conversions.len());

        for t in touchpoints {
            match t.validate() {
                Ok(()) => views.push(SignalView {
                    id: t.id,
                    timestamp: t.timestamp,
                    user_id: t.user_id.as_deref(),
                    session_id: t.session_id.as_deref(),
                    device_id: t.device_id.as_deref(),
                    ip_hash: t.ip_hash.as_deref(),
                }),
                Err(err) => {
                    warn!(event_id = %t.id, %err, "Excluding malformed touchpoint");
                    rejected.push(RejectedEvent {
                        id: t.id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        for c in conversions {
            match c.validate() {
                Ok(()) => views.push(SignalView {
                    id: c.id,
                    timestamp: c.timestamp,
                    user_id: c.user_id.as_deref(),
                    session_id: c.session_id.as_deref(),
                    device_id: c.device_id.as_deref(),
                    ip_hash: c.ip_hash.as_deref(),
                }),
                Err(err) => {
                    warn!(event_id = %c.id, %err, "Excluding malformed conversion");
                    rejected.push(RejectedEvent {
                        id: c.id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let n = views.len();
        let mut parent: Vec<usize> = (0..n).collect();
        let mut rank: Vec<usize> = vec![0; n];
        // Minimum edge strength inside each component, keyed by root.
        let mut confidence: Vec<f64> = vec![1.0; n];

        fn find(parent: &mut [usize], i: usize) -> usize {
            if parent[i] != i {
                parent[i] = find(parent, parent[i]);
            }
            parent[i]
        }

        fn union(
            parent: &mut [usize],
            rank: &mut [usize],
            confidence: &mut [f64],
            x: usize,
            y: usize,
            strength: f64,
        ) {
            let px = find(parent, x);
            let py = find(parent, y);
            if px == py {
                // Already connected through edges at least this strong;
                // signals are applied in decreasing strength order, so a
                // redundant weaker edge never lowers the chain.
                return;
            }
            let merged = confidence[px].min(confidence[py]).min(strength);
            let root = match rank[px].cmp(&rank[py]) {
                std::cmp::Ordering::Less => {
                    parent[px] = py;
                    py
                }
                std::cmp::Ordering::Greater => {
                    parent[py] = px;
                    px
                }
                std::cmp::Ordering::Equal => {
                    parent[py] = px;
                    rank[px] += 1;
                    px
                }
            };
            confidence[root] = merged;
        }

        // Strong and session signals: every pair in a bucket is connected,
        // so chaining through the first member is equivalent.
        for (strength, key) in [
            (self.config.signals.user, SignalKey::User),
            (self.config.signals.session, SignalKey::Session),
        ] {
            let mut buckets: HashMap<&str, usize> = HashMap::new();
            for (i, view) in views.iter().enumerate() {
                let Some(value) = key.get(view) else { continue };
                match buckets.get(value) {
                    Some(&first) => {
                        union(&mut parent, &mut rank, &mut confidence, first, i, strength);
                    }
                    None => {
                        buckets.insert(value, i);
                    }
                }
            }
        }

        // Fingerprint signals: only events close in time are connected.
        for key in [SignalKey::Device, SignalKey::IpHash] {
            let mut buckets: HashMap<&str, Vec<usize>> = HashMap::new();
            for (i, view) in views.iter().enumerate() {
                if let Some(value) = key.get(view) {
                    buckets.entry(value).or_default().push(i);
                }
            }
            for members in buckets.values_mut() {
                members.sort_by_key(|&i| views[i].timestamp);
                for pair in members.windows(2) {
                    let delta = (views[pair[1]].timestamp - views[pair[0]].timestamp).num_seconds();
                    if delta <= self.config.fingerprint_window_secs {
                        union(
                            &mut parent,
                            &mut rank,
                            &mut confidence,
                            pair[0],
                            pair[1],
                            self.config.signals.fingerprint,
                        );
                    }
                }
            }
        }

        // Collect groups in first-member order for deterministic output.
        let mut root_to_group: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<IdentityGroup> = Vec::new();
        for i in 0..n {
            let root = find(&mut parent, i);
            let group_idx = *root_to_group.entry(root).or_insert_with(|| {
                groups.push(IdentityGroup {
                    event_ids: Vec::new(),
                    confidence: confidence[root],
                });
                groups.len() - 1
            });
            groups[group_idx].event_ids.push(views[i].id);
        }

        let group_index = groups
            .iter()
            .enumerate()
            .flat_map(|(gi, g)| g.event_ids.iter().map(move |&id| (id, gi)))
            .collect();

        debug!(
            events = n,
            groups = groups.len(),
            rejected = rejected.len(),
            "Identity resolution complete"
        );

        ResolutionOutput {
            groups,
            rejected,
            group_index,
        }
    }
}

/// Which identity signal a bucket pass matches on.
#[derive(Clone, Copy)]
enum SignalKey {
    User,
    Session,
    Device,
    IpHash,
}

impl SignalKey {
    fn get<'a>(&self, view: &SignalView<'a>) -> Option<&'a str> {
        match self {
            SignalKey::User => view.user_id,
            SignalKey::Session => view.session_id,
            SignalKey::Device => view.device_id,
            SignalKey::IpHash => view.ip_hash,
        }
    }
}
