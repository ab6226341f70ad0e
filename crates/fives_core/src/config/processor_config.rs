use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Every n-th consecutive missed session costs a rating point
    pub penalty_interval: u32,
    pub penalty_step: u8,
    pub session_history_cap: usize,
    pub history_data_cap: usize,
    /// |delta| at which form turns hot or cold
    pub form_threshold: f64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            penalty_interval: 5,
            penalty_step: 1,
            session_history_cap: 5,
            history_data_cap: 12,
            form_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub ttl_hours: i64,
    pub max_new_items: usize,
    pub max_feed_items: usize,
    /// Promotions below this tier rank are not newsworthy
    pub min_promotion_rank: u8,
    pub goal_milestones: Vec<u32>,
    pub assist_milestones: Vec<u32>,
    pub game_milestones: Vec<u32>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            max_new_items: 10,
            max_feed_items: 50,
            min_promotion_rank: 3,
            goal_milestones: vec![50, 100, 200, 300, 500, 1000],
            assist_milestones: vec![25, 50, 100, 200, 500],
            game_milestones: vec![50, 100, 250, 500, 1000],
        }
    }
}
