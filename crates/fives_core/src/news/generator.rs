use crate::badges::CareerCounter;
use crate::config::NewsConfig;
use crate::models::{MilestoneStat, NewsItem, NewsKind, Player};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashSet};

pub struct NewsGenerator<'a> {
    config: &'a NewsConfig,
}

impl<'a> NewsGenerator<'a> {
    pub fn new(config: &'a NewsConfig) -> Self {
        Self { config }
    }

    /// Diffs player snapshots into news items, highest priority first.
    ///
    /// Players missing from `before` produce nothing.
    pub fn generate(
        &self,
        before: &[Player],
        after: &[Player],
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Vec<NewsItem> {
        let previous: BTreeMap<&str, &Player> = before.iter().map(|p| (p.id.as_str(), p)).collect();
        let mut items = Vec::new();

        for player in after {
            let Some(old) = previous.get(player.id.as_str()) else {
                continue;
            };
            for kind in self.detect(old, player) {
                items.push(self.item(player, kind, session_id, now));
            }
        }

        items.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.player_id.cmp(&b.player_id))
                .then_with(|| a.id.cmp(&b.id))
        });
        items.truncate(self.config.max_new_items);
        items
    }

    fn detect(&self, old: &Player, new: &Player) -> Vec<NewsKind> {
        let mut kinds = Vec::new();

        if new.tier > old.tier && new.tier.rank() >= self.config.min_promotion_rank {
            kinds.push(NewsKind::TierPromotion { from: old.tier, to: new.tier });
        }

        // Milestones announced by a career badge unlocked in the same diff
        let mut announced = Vec::new();
        for (badge, count) in &new.badges {
            if *count > 0 && old.badge_count(*badge) == 0 {
                kinds.push(NewsKind::BadgeUnlocked { badge: *badge });
                if let Some((counter, value)) = badge.career_threshold() {
                    announced.extend(milestone_stat(counter).map(|stat| (stat, value)));
                }
            }
        }

        let milestones = [
            (MilestoneStat::Goals, &self.config.goal_milestones, old.career.goals, new.career.goals),
            (MilestoneStat::Assists, &self.config.assist_milestones, old.career.assists, new.career.assists),
            (MilestoneStat::Games, &self.config.game_milestones, old.career.games, new.career.games),
        ];
        for (stat, values, before, after) in milestones {
            for value in values.iter().filter(|v| before < **v && after >= **v) {
                if announced.contains(&(stat, *value)) {
                    continue;
                }
                kinds.push(NewsKind::CareerMilestone { stat, value: *value });
            }
        }
        kinds
    }

    fn item(&self, player: &Player, kind: NewsKind, session_id: &str, now: DateTime<Utc>) -> NewsItem {
        let message = match &kind {
            NewsKind::TierPromotion { to, .. } => format!("{} was promoted to {}", player.name, to.label()),
            NewsKind::BadgeUnlocked { badge } => {
                format!("{} unlocked the {} badge", player.name, badge.display_name())
            }
            NewsKind::CareerMilestone { stat, value } => {
                format!("{} reached {} career {}", player.name, value, stat.label())
            }
        };
        NewsItem {
            id: format!("{}:{}:{}", kind.slug(), player.id, session_id),
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            priority: priority(&kind),
            kind,
            message,
            timestamp: now,
        }
    }

    /// Whether `item` is still inside the feed TTL at `now`.
    pub fn is_fresh(&self, item: &NewsItem, now: DateTime<Utc>) -> bool {
        now - item.timestamp < Duration::hours(self.config.ttl_hours)
    }

    /// New items first, then surviving old items; stale items dropped,
    /// re-issued ids replace the old entry, capped at the feed limit.
    pub fn merge_feed(
        &self,
        new_items: Vec<NewsItem>,
        feed: &[NewsItem],
        now: DateTime<Utc>,
    ) -> Vec<NewsItem> {
        let fresh_ids: HashSet<String> = new_items.iter().map(|item| item.id.clone()).collect();
        let mut merged: Vec<NewsItem> = new_items;
        merged.extend(feed.iter().filter(|item| !fresh_ids.contains(&item.id)).cloned());
        let before = merged.len();
        merged.retain(|item| self.is_fresh(item, now));
        merged.truncate(self.config.max_feed_items);
        if merged.len() != before {
            log::debug!("news feed pruned {} -> {} items", before, merged.len());
        }
        merged
    }

    pub fn prune(&self, feed: &[NewsItem], now: DateTime<Utc>) -> Vec<NewsItem> {
        self.merge_feed(Vec::new(), feed, now)
    }
}

fn priority(kind: &NewsKind) -> u32 {
    match kind {
        NewsKind::TierPromotion { to, .. } => 50 + 10 * to.rank() as u32,
        NewsKind::CareerMilestone { value, .. } => 40 + (value / 50).min(20),
        NewsKind::BadgeUnlocked { badge } => 20 + 5 * badge.rarity(),
    }
}

fn milestone_stat(counter: CareerCounter) -> Option<MilestoneStat> {
    match counter {
        CareerCounter::Goals => Some(MilestoneStat::Goals),
        CareerCounter::Assists => Some(MilestoneStat::Assists),
        CareerCounter::Sessions => None,
    }
}
