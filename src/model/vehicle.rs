use std::{collections::VecDeque, fmt, path::Path};

use chrono::Duration;
use serde::Deserialize;

use crate::{define_map, error::Error};

use super::{
    factory::{AssignmentKind, Factory, FactoryId, PortStatus},
    order::Order,
    read_csv,
    route_table::RouteTable,
};

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub struct VehicleId(pub String);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleRecord {
    pub car_num: VehicleId,
    pub capacity: i32,
    pub operation_time: i32,
    pub gps_id: String,
}

impl VehicleRecord {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Vec<VehicleRecord>> {
        read_csv(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleStatus {
    Idle,
    PickingUp,
    Delivering,
    Waiting,
    Loading,
    Unloading,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub factory_id: FactoryId,
    pub order: Order,
    pub kind: AssignmentKind,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub time: i64,
    pub action: &'static str,
    pub factory_id: FactoryId,
    pub status: VehicleStatus,
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub car_num: VehicleId,
    pub capacity: i32,
    pub now: i64,
    pub location: FactoryId,
    pub status: VehicleStatus,
    pub current_assignment: Option<Assignment>,
    pub assignment_queue: VecDeque<Assignment>,
    pub cargo: Vec<Order>,
    pub next_status_time: Option<Duration>,
    pub distance: f32,
    pub delay: Duration,
    pub history: Vec<HistoryEntry>,
}

impl Vehicle {
    pub fn new(record: &VehicleRecord, initial_location: FactoryId) -> Self {
        Self {
            car_num: record.car_num.clone(),
            capacity: record.capacity,
            now: 0,
            location: initial_location,
            status: VehicleStatus::Idle,
            current_assignment: None,
            assignment_queue: VecDeque::new(),
            cargo: Vec::new(),
            next_status_time: None,
            distance: 0.0,
            delay: Duration::zero(),
            history: Vec::new(),
        }
    }

    pub(crate) fn needs_activation(&self) -> bool {
        matches!(self.status, VehicleStatus::Idle)
            && self.current_assignment.is_none()
            && !self.assignment_queue.is_empty()
    }

    fn record(&mut self, action: &'static str, factory_id: FactoryId) {
        self.history.push(HistoryEntry {
            time: self.now,
            action,
            factory_id,
            status: self.status,
        });
    }

    pub fn add_order(
        &mut self,
        order: Order,
        pickup_pos: usize,
        delivery_pos: usize,
    ) -> Result<(), Error> {
        if pickup_pos > delivery_pos {
            return Err(Error::InvalidPositions {
                pickup: pickup_pos,
                delivery: delivery_pos,
            });
        }
        let pickup = Assignment {
            factory_id: order.pickup_id.clone(),
            order: order.clone(),
            kind: AssignmentKind::Pickup,
        };
        let delivery = Assignment {
            factory_id: order.delivery_id.clone(),
            order,
            kind: AssignmentKind::Delivery,
        };
        if self.assignment_queue.is_empty() {
            self.assignment_queue.push_back(pickup);
            self.assignment_queue.push_back(delivery);
        } else {
            self.assignment_queue.insert(delivery_pos + 1, delivery);
            self.assignment_queue.insert(pickup_pos + 1, pickup);
        }
        Ok(())
    }

    pub fn remove_order(&mut self, order: &Order) -> Result<(), Error> {
        if let Some(current) = &self.current_assignment {
            if &current.order == order {
                return Err(Error::OrderInFlight(order.id.clone()));
            }
        }
        self.assignment_queue.retain(|a| &a.order != order);
        Ok(())
    }

    pub fn check_capacity(&self, order: &Order, pickup_pos: usize, delivery_pos: usize) -> bool {
        let mut load: f32 = self.cargo.iter().map(|o| o.demand).sum();
        let hypothetical = self.hypothetical_queue(order, pickup_pos, delivery_pos);

        if let Some(current) = &self.current_assignment {
            match current.kind {
                AssignmentKind::Pickup => load += current.order.demand,
                AssignmentKind::Delivery => load -= current.order.demand,
            }
            if load > self.capacity as f32 || load < 0.0 {
                return false;
            }
        }

        for assignment in &hypothetical {
            match assignment.kind {
                AssignmentKind::Pickup => load += assignment.order.demand,
                AssignmentKind::Delivery => load -= assignment.order.demand,
            }
            if load > self.capacity as f32 || load < 0.0 {
                return false;
            }
        }
        load + order.demand <= self.capacity as f32
    }

    // stack of undelivered orders, pushed on PICKUP, each DELIVERY must pop the current top
    pub fn check_assignment_list(
        &self,
        order: &Order,
        pickup_pos: usize,
        delivery_pos: usize,
    ) -> bool {
        if pickup_pos > delivery_pos {
            return false;
        }
        let mut cargo_stack: Vec<&Order> = self.cargo.iter().collect();
        let hypothetical = self.hypothetical_queue(order, pickup_pos, delivery_pos);

        if let Some(current) = &self.current_assignment {
            match current.kind {
                AssignmentKind::Pickup => cargo_stack.push(&current.order),
                AssignmentKind::Delivery => {
                    if cargo_stack.pop() != Some(&current.order) {
                        return false;
                    }
                }
            }
        }

        for assignment in &hypothetical {
            match assignment.kind {
                AssignmentKind::Pickup => cargo_stack.push(&assignment.order),
                AssignmentKind::Delivery => {
                    if cargo_stack.pop() != Some(&assignment.order) {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn hypothetical_queue(
        &self,
        order: &Order,
        pickup_pos: usize,
        delivery_pos: usize,
    ) -> Vec<Assignment> {
        let mut queue: Vec<Assignment> = self.assignment_queue.iter().cloned().collect();
        if queue.is_empty() {
            return vec![
                Assignment {
                    factory_id: order.pickup_id.clone(),
                    order: order.clone(),
                    kind: AssignmentKind::Pickup,
                },
                Assignment {
                    factory_id: order.delivery_id.clone(),
                    order: order.clone(),
                    kind: AssignmentKind::Delivery,
                },
            ];
        }
        queue.insert(
            delivery_pos + 1,
            Assignment {
                factory_id: order.delivery_id.clone(),
                order: order.clone(),
                kind: AssignmentKind::Delivery,
            },
        );
        queue.insert(
            pickup_pos + 1,
            Assignment {
                factory_id: order.pickup_id.clone(),
                order: order.clone(),
                kind: AssignmentKind::Pickup,
            },
        );
        queue
    }

    // idle with queue -> picking up/delivering
    pub(crate) fn activate(&mut self, routes: &RouteTable) -> Result<(), Error> {
        if self.current_assignment.is_some() || self.assignment_queue.is_empty() {
            return Ok(());
        }
        let next = self.assignment_queue.pop_front().unwrap();
        self.status = match next.kind {
            AssignmentKind::Pickup => VehicleStatus::PickingUp,
            AssignmentKind::Delivery => VehicleStatus::Delivering,
        };
        self.next_status_time = Some(Duration::seconds(
            routes.time(&self.location, &next.factory_id)?,
        ));
        self.record("depart", self.location.clone());
        self.current_assignment = Some(next);
        Ok(())
    }

    pub(crate) fn tick(&mut self, step: Duration) {
        if let Some(t) = &mut self.next_status_time {
            *t -= step;
        }
        self.now += step.num_seconds();
    }

    pub(crate) fn arrive_at_port(&mut self, factory: &mut Factory) {
        let assignment = self
            .current_assignment
            .as_ref()
            .expect("arrive_at_port requires an in-flight assignment");
        let (status, wait) = factory.assign(assignment.kind, &assignment.order);
        self.location = assignment.factory_id.clone();
        match status {
            PortStatus::Serving => {
                self.status = match assignment.kind {
                    AssignmentKind::Pickup => VehicleStatus::Loading,
                    AssignmentKind::Delivery => VehicleStatus::Unloading,
                };
                self.next_status_time = Some(service_duration(assignment));
            }
            PortStatus::Waiting => {
                self.status = VehicleStatus::Waiting;
                self.next_status_time = Some(wait);
            }
        }
        self.record("arrive", self.location.clone());
    }

    pub(crate) fn begin_service(&mut self) {
        let assignment = self
            .current_assignment
            .as_ref()
            .expect("begin_service requires an in-flight assignment");
        self.status = match assignment.kind {
            AssignmentKind::Pickup => VehicleStatus::Loading,
            AssignmentKind::Delivery => VehicleStatus::Unloading,
        };
        self.next_status_time = Some(service_duration(assignment));
        self.record("begin_service", self.location.clone());
    }

    pub(crate) fn finish_service(&mut self, routes: &RouteTable) -> Result<(), Error> {
        let assignment = self
            .current_assignment
            .take()
            .expect("finish_service requires an in-flight assignment");
        match assignment.kind {
            AssignmentKind::Pickup => {
                self.cargo.push(assignment.order.clone());
            }
            AssignmentKind::Delivery => {
                let delivered = self.cargo.pop();
                debug_assert_eq!(delivered.as_ref(), Some(&assignment.order));
                let lateness = self.now - assignment.order.committed_completion_time;
                if lateness > 0 {
                    self.delay += Duration::seconds(lateness);
                }
            }
        }
        self.record(
            match assignment.kind {
                AssignmentKind::Pickup => "load",
                AssignmentKind::Delivery => "unload",
            },
            self.location.clone(),
        );

        if let Some(next) = self.assignment_queue.pop_front() {
            self.distance += routes.distance(&self.location, &next.factory_id)?;
            self.status = match next.kind {
                AssignmentKind::Pickup => VehicleStatus::PickingUp,
                AssignmentKind::Delivery => VehicleStatus::Delivering,
            };
            self.next_status_time = Some(Duration::seconds(
                routes.time(&self.location, &next.factory_id)?,
            ));
            self.current_assignment = Some(next);
        } else {
            self.status = VehicleStatus::Idle;
            self.next_status_time = None;
        }
        Ok(())
    }
}

fn service_duration(assignment: &Assignment) -> Duration {
    match assignment.kind {
        AssignmentKind::Pickup => assignment.order.load_time,
        AssignmentKind::Delivery => assignment.order.unload_time,
    }
}

define_map!(VehicleId, Vehicle, VehicleMap);
