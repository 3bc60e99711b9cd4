use std::fmt;

use chrono::Duration;
use serde::Deserialize;

use super::parse_naive_time;

// split siblings share their parent's id, see item_index below
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub q_standard: i32,
    pub q_small: i32,
    pub q_box: i32,
    pub demand: f32,
    #[serde(deserialize_with = "parse_naive_time")]
    pub creation_time: chrono::NaiveTime,
    #[serde(deserialize_with = "parse_naive_time")]
    pub committed_completion_time: chrono::NaiveTime,
    #[serde(deserialize_with = "super::parse_duration_seconds")]
    pub load_time: Duration,
    #[serde(deserialize_with = "super::parse_duration_seconds")]
    pub unload_time: Duration,
    pub pickup_id: super::factory::FactoryId,
    pub delivery_id: super::factory::FactoryId,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    // 0 unless split from an oversized order, then the sub-order's index among its siblings
    pub item_index: u32,
    pub q_standard: i32,
    pub q_small: i32,
    pub q_box: i32,
    pub demand: f32,
    // seconds since midnight
    pub creation_time: i64,
    pub committed_completion_time: i64,
    pub load_time: Duration,
    pub unload_time: Duration,
    pub pickup_id: super::factory::FactoryId,
    pub delivery_id: super::factory::FactoryId,
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.item_index == other.item_index
    }
}
impl Eq for Order {}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order {}", self.id)
    }
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new_whole(
        id: OrderId,
        item_index: u32,
        q_standard: i32,
        q_small: i32,
        q_box: i32,
        demand: f32,
        creation_time: i64,
        committed_completion_time: i64,
        load_time: Duration,
        unload_time: Duration,
        pickup_id: super::factory::FactoryId,
        delivery_id: super::factory::FactoryId,
    ) -> Self {
        Self {
            id,
            item_index,
            q_standard,
            q_small,
            q_box,
            demand,
            creation_time,
            committed_completion_time,
            load_time,
            unload_time,
            pickup_id,
            delivery_id,
        }
    }
}
