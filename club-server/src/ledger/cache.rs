//! Summary Cache
//!
//! Read-through TTL cache for membership summaries, keyed by player.
//! Default TTL 5 minutes; every write to a player's membership invalidates
//! the entry explicitly, so readers never see a pre-write summary after a
//! successful mutation.

use dashmap::DashMap;
use shared::models::MembershipSummary;
use std::time::{Duration, Instant};

/// Lock-free TTL map: player_id → (summary, deadline)
#[derive(Debug)]
pub struct SummaryCache {
    entries: DashMap<i64, (MembershipSummary, Instant)>,
    ttl: Duration,
}

impl SummaryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fresh entry for the player, if any. Expired entries are dropped on
    /// the way out.
    pub fn get(&self, player_id: i64) -> Option<MembershipSummary> {
        let expired = match self.entries.get(&player_id) {
            Some(entry) => {
                let (summary, deadline) = entry.value();
                if Instant::now() < *deadline {
                    return Some(summary.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(&player_id);
        }
        None
    }

    pub fn put(&self, player_id: i64, summary: MembershipSummary) {
        self.entries
            .insert(player_id, (summary, Instant::now() + self.ttl));
    }

    /// Called after every write touching the player's membership
    pub fn invalidate(&self, player_id: i64) {
        self.entries.remove(&player_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{AllocationType, MembershipStatus};

    fn summary(used: i64) -> MembershipSummary {
        MembershipSummary {
            membership_id: 1,
            player_id: 10,
            status: MembershipStatus::Active,
            allocation_type: AllocationType::ClassCount,
            allocated_classes: Some(10),
            used_classes: used,
            remaining_classes: Some(10 - used),
            days_left: None,
            is_expired: false,
            should_deactivate: false,
            negative_balance: false,
        }
    }

    #[test]
    fn hit_within_ttl() {
        let cache = SummaryCache::new(Duration::from_secs(60));
        cache.put(10, summary(3));
        assert_eq!(cache.get(10).unwrap().used_classes, 3);
        assert!(cache.get(99).is_none());
    }

    #[test]
    fn expires_after_ttl() {
        let cache = SummaryCache::new(Duration::from_millis(10));
        cache.put(10, summary(3));
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get(10).is_none());
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = SummaryCache::new(Duration::from_secs(60));
        cache.put(10, summary(3));
        cache.invalidate(10);
        assert!(cache.get(10).is_none());
        // Fresh value readable after re-put
        cache.put(10, summary(4));
        assert_eq!(cache.get(10).unwrap().used_classes, 4);
    }
}
