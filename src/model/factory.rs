use std::{fmt, path::Path};

use chrono::Duration;
use serde::Deserialize;

use crate::define_map;

use super::{order::Order, read_csv};

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub struct FactoryId(pub String);

impl fmt::Display for FactoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FactoryRecord {
    pub factory_id: FactoryId,
    pub longitude: f64,
    pub latitude: f64,
    pub port_num: i32,
}

impl FactoryRecord {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Vec<FactoryRecord>> {
        read_csv(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    Pickup,
    Delivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Serving,
    Waiting,
}

#[derive(Debug, Clone)]
pub struct Port {
    finish_time: Duration,
}

impl Port {
    fn new() -> Self {
        Self {
            finish_time: Duration::zero(),
        }
    }

    pub fn finish_time(&self) -> Duration {
        self.finish_time
    }

    pub(crate) fn tick(&mut self, step: Duration) {
        self.finish_time = (self.finish_time - step).max(Duration::zero());
    }
}

#[derive(Debug, Clone)]
pub struct Factory {
    pub id: FactoryId,
    pub longitude: f64,
    pub latitude: f64,
    ports: Vec<Port>,
}

impl Factory {
    pub fn new(record: &FactoryRecord) -> Self {
        Self {
            id: record.factory_id.clone(),
            longitude: record.longitude,
            latitude: record.latitude,
            ports: (0..record.port_num).map(|_| Port::new()).collect(),
        }
    }

    pub(crate) fn tick(&mut self, step: Duration) {
        for port in &mut self.ports {
            port.tick(step);
        }
    }

    fn shortest_port_index(&self) -> usize {
        self.ports
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| p.finish_time)
            .map(|(i, _)| i)
            .expect("a factory always has at least one port")
    }

    // returns the resulting status and the queue delay still owed, zero if the port was free
    pub fn assign(&mut self, kind: AssignmentKind, order: &Order) -> (PortStatus, Duration) {
        let service = match kind {
            AssignmentKind::Pickup => order.load_time,
            AssignmentKind::Delivery => order.unload_time,
        };
        let idx = self.shortest_port_index();
        let port = &mut self.ports[idx];
        let status = if port.finish_time.is_zero() {
            PortStatus::Serving
        } else {
            PortStatus::Waiting
        };
        let wait = port.finish_time;
        port.finish_time += service;
        (status, wait)
    }
}

define_map!(FactoryId, Factory, FactoryMap);
