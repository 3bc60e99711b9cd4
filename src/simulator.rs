use chrono::Duration;

use crate::error::Error;
use crate::model::factory::FactoryMap;
use crate::model::order::Order;
use crate::model::route_table::RouteTable;
use crate::model::vehicle::{VehicleId, VehicleMap, VehicleStatus};
use crate::model::Map;

#[derive(Debug, Clone)]
pub struct Simulator {
    pub routes: RouteTable,
    pub factories: FactoryMap,
    pub vehicles: VehicleMap,
    pub now: i64,
    pub pending: Vec<Order>,
}

impl Simulator {
    pub fn new(routes: RouteTable, factories: FactoryMap, vehicles: VehicleMap) -> Self {
        Self {
            routes,
            factories,
            vehicles,
            now: 0,
            pending: Vec::new(),
        }
    }

    pub fn add_orders(&mut self, orders: impl IntoIterator<Item = Order>) {
        self.pending.extend(orders);
    }

    pub fn vehicle(&self, car_num: &VehicleId) -> &crate::model::vehicle::Vehicle {
        self.vehicles.gets(car_num)
    }

    pub fn vehicle_mut(&mut self, car_num: &VehicleId) -> &mut crate::model::vehicle::Vehicle {
        self.vehicles.gets_mut(car_num)
    }

    pub fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.keys().cloned().collect()
    }

    pub fn idle_vehicle(&self) -> Option<VehicleId> {
        self.vehicles
            .iter()
            .find(|(_, v)| v.status == VehicleStatus::Idle || v.assignment_queue.is_empty())
            .map(|(id, _)| id.clone())
    }

    pub fn can_add_order(
        &self,
        car_num: &VehicleId,
        order: &Order,
        pickup_pos: usize,
        delivery_pos: usize,
    ) -> Result<bool, Error> {
        if pickup_pos > delivery_pos {
            return Err(Error::InvalidPositions {
                pickup: pickup_pos,
                delivery: delivery_pos,
            });
        }
        let vehicle = self.vehicles.gets(car_num);
        if vehicle.status == VehicleStatus::Idle || vehicle.assignment_queue.is_empty() {
            return Ok(true);
        }
        Ok(vehicle.check_capacity(order, pickup_pos, delivery_pos)
            && vehicle.check_assignment_list(order, pickup_pos, delivery_pos))
    }

    pub fn cost(&self) -> Result<(f32, f32), Error> {
        let mut shadow = self.clone();
        shadow.drain()?;
        let mut distance = 0.0f32;
        let mut delay = 0.0f32;
        for vehicle in shadow.vehicles.values() {
            distance += vehicle.distance;
            delay += vehicle.delay.num_seconds() as f32;
        }
        Ok((distance, delay))
    }

    pub fn advance(&mut self, dt: Duration) -> Result<(), Error> {
        self.settle()?;
        let mut remaining = dt;
        while remaining > Duration::zero() {
            let least = self
                .vehicles
                .values()
                .filter_map(|v| v.next_status_time)
                .min();
            let step = match least {
                Some(t) if t < remaining => t,
                _ => remaining,
            };
            if step <= Duration::zero() {
                break;
            }
            self.tick_all(step);
            self.now += step.num_seconds();
            remaining -= step;
            self.settle()?;
        }
        Ok(())
    }

    pub fn drain(&mut self) -> Result<(), Error> {
        self.settle()?;
        loop {
            let least = self
                .vehicles
                .values()
                .filter_map(|v| v.next_status_time)
                .min();
            let Some(step) = least else { break };
            self.tick_all(step);
            self.now += step.num_seconds();
            self.settle()?;
        }
        Ok(())
    }

    fn tick_all(&mut self, step: Duration) {
        for vehicle in self.vehicles.values_mut() {
            vehicle.tick(step);
        }
        for factory in self.factories.values_mut() {
            factory.tick(step);
        }
    }

    // loops until quiescent: one transition (e.g. a zero-distance activation) can make another eligible
    fn settle(&mut self) -> Result<(), Error> {
        loop {
            let mut changed = false;
            let ids = self.vehicle_ids();

            for id in &ids {
                if self.vehicles.gets(id).needs_activation() {
                    self.vehicles.gets_mut(id).activate(&self.routes)?;
                    changed = true;
                }
            }

            for id in &ids {
                let vehicle = self.vehicles.gets(id);
                if vehicle.next_status_time != Some(Duration::zero()) {
                    continue;
                }
                match vehicle.status {
                    VehicleStatus::PickingUp | VehicleStatus::Delivering => {
                        let factory_id = vehicle
                            .current_assignment
                            .as_ref()
                            .expect("in-flight assignment")
                            .factory_id
                            .clone();
                        let factory = self.factories.gets_mut(&factory_id);
                        self.vehicles.gets_mut(id).arrive_at_port(factory);
                    }
                    VehicleStatus::Waiting => {
                        self.vehicles.gets_mut(id).begin_service();
                    }
                    VehicleStatus::Loading | VehicleStatus::Unloading => {
                        self.vehicles.gets_mut(id).finish_service(&self.routes)?;
                    }
                    VehicleStatus::Idle => {}
                }
                changed = true;
            }

            if !changed {
                break;
            }
        }
        Ok(())
    }
}
