use crate::error::Error;
use crate::model::order::Order;
use crate::model::vehicle::VehicleId;
use crate::simulator::Simulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Greedy,
    SolomonInsertion,
}

// mu/alpha are reserved for a future Solomon-style heuristic, unused by Greedy
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmParams {
    pub mu: f64,
    pub alpha: f64,
    pub lambda: f32,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            mu: 1.0,
            alpha: 0.5,
            lambda: 1.0,
        }
    }
}

pub struct Dispatcher {
    algorithm: Algorithm,
    params: AlgorithmParams,
    #[allow(dead_code)]
    seed: u64,
}

impl Dispatcher {
    pub fn new(algorithm: Algorithm, params: AlgorithmParams, seed: u64) -> Self {
        Self {
            algorithm,
            params,
            seed,
        }
    }

    pub fn dispatch(&self, sim: &mut Simulator, orders: Vec<Order>) -> Result<Vec<Order>, Error> {
        if self.algorithm != Algorithm::Greedy {
            return Err(Error::UnsupportedAlgorithm(self.algorithm));
        }
        let mut unplaced = Vec::new();
        for order in orders {
            match self.try_insert(sim, &order)? {
                Some(()) => {}
                None => unplaced.push(order),
            }
        }
        Ok(unplaced)
    }

    fn try_insert(&self, sim: &mut Simulator, order: &Order) -> Result<Option<()>, Error> {
        if let Some(car_num) = sim.idle_vehicle() {
            sim.vehicle_mut(&car_num).add_order(order.clone(), 0, 0)?;
            return Ok(Some(()));
        }

        let mut best: Option<(VehicleId, usize, usize)> = None;
        let mut best_cost = f32::INFINITY;

        for car_num in sim.vehicle_ids() {
            let queue_len = sim.vehicle(&car_num).assignment_queue.len();
            for i in 0..=queue_len {
                for j in i..=queue_len {
                    if !sim.can_add_order(&car_num, order, i, j)? {
                        continue;
                    }
                    sim.vehicle_mut(&car_num).add_order(order.clone(), i, j)?;
                    let (distance, delay) = sim.cost()?;
                    let cost = distance + self.params.lambda * delay;
                    sim.vehicle_mut(&car_num).remove_order(order)?;
                    if cost < best_cost {
                        best_cost = cost;
                        best = Some((car_num.clone(), i, j));
                    }
                }
            }
        }

        match best {
            Some((car_num, i, j)) => {
                sim.vehicle_mut(&car_num).add_order(order.clone(), i, j)?;
                Ok(Some(()))
            }
            None => Ok(None),
        }
    }

    pub fn dispatch_one(&self, sim: &mut Simulator, order: Order) -> Result<(), Error> {
        let id = order.id.clone();
        match self.try_insert(sim, &order)? {
            Some(()) => Ok(()),
            None => Err(Error::InfeasibleInvariant(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::factory::{Factory, FactoryId, FactoryMap, FactoryRecord};
    use crate::model::order::{Order, OrderId};
    use crate::model::route_table::{RouteRecord, RouteTable};
    use crate::model::vehicle::{Vehicle, VehicleMap, VehicleRecord};
    use chrono::Duration;

    fn sim_with_two_factories() -> Simulator {
        let factories: FactoryMap = vec![
            FactoryRecord {
                factory_id: FactoryId("F1".into()),
                longitude: 0.0,
                latitude: 0.0,
                port_num: 1,
            },
            FactoryRecord {
                factory_id: FactoryId("F2".into()),
                longitude: 1.0,
                latitude: 1.0,
                port_num: 1,
            },
        ]
        .iter()
        .map(|r| (r.factory_id.clone(), Factory::new(r)))
        .collect();

        let routes: RouteTable = vec![RouteRecord {
            start_factory_id: FactoryId("F1".into()),
            end_factory_id: FactoryId("F2".into()),
            distance: 10.0,
            time: 600,
        }]
        .into();

        let vehicles: VehicleMap = vec![(
            VehicleId("V1".into()),
            Vehicle::new(
                &VehicleRecord {
                    car_num: VehicleId("V1".into()),
                    capacity: 10,
                    operation_time: 0,
                    gps_id: "g".into(),
                },
                FactoryId("F1".into()),
            ),
        )]
        .into_iter()
        .collect();

        Simulator::new(routes, factories, vehicles)
    }

    fn order(id: &str) -> Order {
        Order::new_whole(
            OrderId(id.into()),
            0,
            1,
            0,
            0,
            1.0,
            0,
            3600,
            Duration::minutes(1),
            Duration::minutes(1),
            FactoryId("F1".into()),
            FactoryId("F2".into()),
        )
    }

    #[test]
    fn idle_vehicle_always_accepts() {
        let mut sim = sim_with_two_factories();
        let dispatcher = Dispatcher::new(Algorithm::Greedy, AlgorithmParams::default(), 1);
        let unplaced = dispatcher.dispatch(&mut sim, vec![order("O1")]).unwrap();
        assert!(unplaced.is_empty());
        assert_eq!(sim.vehicle(&VehicleId("V1".into())).assignment_queue.len(), 2);
    }

    #[test]
    fn infeasible_insertion_surfaces_as_error() {
        let mut sim = sim_with_two_factories();
        let v1 = VehicleId("V1".into());
        // in-flight assignment plus a non-empty future queue bypasses the idle fast path
        sim.vehicle_mut(&v1)
            .add_order(order("A"), 0, 0)
            .unwrap();
        let routes = sim.routes.clone();
        sim.vehicle_mut(&v1).activate(&routes).unwrap();
        sim.vehicle_mut(&v1).add_order(order("B"), 0, 0).unwrap();
        sim.vehicle_mut(&v1).capacity = 0;

        let dispatcher = Dispatcher::new(Algorithm::Greedy, AlgorithmParams::default(), 1);
        let err = dispatcher.dispatch_one(&mut sim, order("C")).unwrap_err();
        assert!(matches!(err, Error::InfeasibleInvariant(_)));
    }

    #[test]
    fn unsupported_algorithm_errors() {
        let mut sim = sim_with_two_factories();
        let dispatcher = Dispatcher::new(Algorithm::SolomonInsertion, AlgorithmParams::default(), 1);
        let err = dispatcher.dispatch(&mut sim, vec![order("O1")]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }

    // adds a return route so a vehicle can shuttle F1<->F2 without UnknownFactory mid-drain
    fn sim_with_round_trip_routes() -> Simulator {
        let mut sim = sim_with_two_factories();
        sim.routes = vec![
            RouteRecord {
                start_factory_id: FactoryId("F1".into()),
                end_factory_id: FactoryId("F2".into()),
                distance: 10.0,
                time: 600,
            },
            RouteRecord {
                start_factory_id: FactoryId("F2".into()),
                end_factory_id: FactoryId("F1".into()),
                distance: 10.0,
                time: 600,
            },
        ]
        .into();
        sim
    }

    // incremental advance() calls must reach the same final (distance, delay) as one drain()
    #[test]
    fn incremental_advance_matches_single_drain() {
        let dispatcher = Dispatcher::new(Algorithm::Greedy, AlgorithmParams::default(), 1);

        let mut incremental = sim_with_round_trip_routes();
        dispatcher
            .dispatch(
                &mut incremental,
                vec![order("O1"), order("O2"), order("O3")],
            )
            .unwrap();
        for _ in 0..60 {
            incremental
                .advance(chrono::Duration::minutes(1))
                .unwrap();
        }

        let mut one_shot = sim_with_round_trip_routes();
        dispatcher
            .dispatch(&mut one_shot, vec![order("O1"), order("O2"), order("O3")])
            .unwrap();
        one_shot.drain().unwrap();

        let incremental_total: f32 = incremental.vehicles.values().map(|v| v.distance).sum();
        let one_shot_total: f32 = one_shot.vehicles.values().map(|v| v.distance).sum();
        assert_eq!(incremental_total, one_shot_total);

        let incremental_delay: i64 = incremental
            .vehicles
            .values()
            .map(|v| v.delay.num_seconds())
            .sum();
        let one_shot_delay: i64 = one_shot
            .vehicles
            .values()
            .map(|v| v.delay.num_seconds())
            .sum();
        assert_eq!(incremental_delay, one_shot_delay);
    }
}
