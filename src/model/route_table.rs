use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

use super::{factory::FactoryId, read_csv, MapType};

#[derive(Debug, Clone, Deserialize)]
pub struct RouteRecord {
    pub start_factory_id: FactoryId,
    pub end_factory_id: FactoryId,
    pub distance: f32,
    pub time: i64,
}

impl RouteRecord {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Vec<RouteRecord>> {
        read_csv(path)
    }
}

struct RouteEntry {
    distance: f32,
    time: i64,
}

// same factory is always zero-cost, no diagonal row needed in the CSV
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: MapType<(FactoryId, FactoryId), RouteEntry>,
}

impl From<Vec<RouteRecord>> for RouteTable {
    fn from(records: Vec<RouteRecord>) -> Self {
        let mut entries = MapType::new();
        for r in records {
            entries.insert(
                (r.start_factory_id, r.end_factory_id),
                RouteEntry {
                    distance: r.distance,
                    time: r.time,
                },
            );
        }
        RouteTable { entries }
    }
}

impl RouteTable {
    pub fn distance(&self, from: &FactoryId, to: &FactoryId) -> Result<f32, Error> {
        if from == to {
            return Ok(0.0);
        }
        self.entries
            .get(&(from.clone(), to.clone()))
            .map(|e| e.distance)
            .ok_or_else(|| Error::UnknownFactory {
                from: from.clone(),
                to: to.clone(),
            })
    }

    pub fn time(&self, from: &FactoryId, to: &FactoryId) -> Result<i64, Error> {
        if from == to {
            return Ok(0);
        }
        self.entries
            .get(&(from.clone(), to.clone()))
            .map(|e| e.time)
            .ok_or_else(|| Error::UnknownFactory {
                from: from.clone(),
                to: to.clone(),
            })
    }
}
