use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Error;
use crate::model::factory::{Factory, FactoryId, FactoryMap, FactoryRecord};
use crate::model::order::{Order, OrderRecord};
use crate::model::route_table::{RouteRecord, RouteTable};
use crate::model::vehicle::{Vehicle, VehicleMap, VehicleRecord};
use crate::model::Map;

pub fn load_routes(path: impl AsRef<Path>) -> Result<RouteTable, Error> {
    Ok(RouteRecord::load(path)?.into())
}

pub fn load_factories(path: impl AsRef<Path>) -> Result<FactoryMap, Error> {
    let records = FactoryRecord::load(path)?;
    Ok(records
        .iter()
        .map(|r| (r.factory_id.clone(), Factory::new(r)))
        .collect())
}

// every vehicle starts parked at depot
pub fn load_vehicles(path: impl AsRef<Path>, depot: FactoryId) -> Result<VehicleMap, Error> {
    let records = VehicleRecord::load(path)?;
    Ok(records
        .iter()
        .map(|r| (r.car_num.clone(), Vehicle::new(r, depot.clone())))
        .collect())
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

// one atomic sub-order per unit of q_standard/q_small/q_box, demands 1, 0.5, 0.25
fn split_order(record: &OrderRecord, order: &Order) -> Vec<Order> {
    let mut split = Vec::new();
    let mut item_index = 0u32;
    for _ in 0..record.q_standard {
        split.push(Order::new_whole(
            order.id.clone(),
            item_index,
            1,
            0,
            0,
            1.0,
            order.creation_time,
            order.committed_completion_time,
            order.load_time,
            order.unload_time,
            order.pickup_id.clone(),
            order.delivery_id.clone(),
        ));
        item_index += 1;
    }
    for _ in 0..record.q_small {
        split.push(Order::new_whole(
            order.id.clone(),
            item_index,
            0,
            1,
            0,
            0.5,
            order.creation_time,
            order.committed_completion_time,
            order.load_time,
            order.unload_time,
            order.pickup_id.clone(),
            order.delivery_id.clone(),
        ));
        item_index += 1;
    }
    for _ in 0..record.q_box {
        split.push(Order::new_whole(
            order.id.clone(),
            item_index,
            0,
            0,
            1,
            0.25,
            order.creation_time,
            order.committed_completion_time,
            order.load_time,
            order.unload_time,
            order.pickup_id.clone(),
            order.delivery_id.clone(),
        ));
        item_index += 1;
    }
    split
}

// slice_size defaults to the gcd of every load_time, falling back to 1 if that gcd is 0
pub fn load_order_slices(
    path: impl AsRef<Path>,
    vehicle_capacity: i32,
    slice_size: Option<i64>,
) -> Result<BTreeMap<i64, Vec<Order>>, Error> {
    let mut records = OrderRecord::load(path)?;
    records.sort_by_key(|r| r.creation_time);

    let slice_size = slice_size.unwrap_or_else(|| {
        let gcd_all = records
            .iter()
            .map(|r| r.load_time.num_seconds())
            .fold(0, gcd);
        if gcd_all == 0 {
            1
        } else {
            gcd_all
        }
    });

    let mut slices: BTreeMap<i64, Vec<Order>> = BTreeMap::new();
    for record in &records {
        let creation_time = record
            .creation_time
            .signed_duration_since(chrono::NaiveTime::MIN)
            .num_seconds();
        let committed_completion_time = record
            .committed_completion_time
            .signed_duration_since(chrono::NaiveTime::MIN)
            .num_seconds();

        let whole = Order::new_whole(
            record.order_id.clone(),
            0,
            record.q_standard,
            record.q_small,
            record.q_box,
            record.demand,
            creation_time,
            committed_completion_time,
            record.load_time,
            record.unload_time,
            record.pickup_id.clone(),
            record.delivery_id.clone(),
        );

        let orders = if record.demand > vehicle_capacity as f32 {
            split_order(record, &whole)
        } else {
            vec![whole]
        };

        for order in orders {
            let bucket = order.creation_time - order.creation_time.rem_euclid(slice_size);
            slices.entry(bucket).or_default().push(order);
        }
    }
    Ok(slices)
}

pub fn first_factory_id(path: impl AsRef<Path>) -> Result<FactoryId, Error> {
    let records = FactoryRecord::load(path)?;
    records
        .first()
        .map(|r| r.factory_id.clone())
        .ok_or_else(|| Error::BadInput(anyhow::anyhow!("factory file has no rows")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::order::OrderId;
    use std::io::Write;

    #[test]
    fn gcd_handles_zero() {
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(gcd(12, 0), 12);
        assert_eq!(gcd(12, 18), 6);
    }

    fn fixture(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "dpdp_dispatch_test_{}_{}",
            std::process::id(),
            name
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn routes_vehicles_factories_round_trip() {
        let routes_path = fixture(
            "routes.csv",
            "start_factory_id,end_factory_id,distance,time\nF1,F2,12.5,600\n",
        );
        let routes = load_routes(&routes_path).unwrap();
        assert_eq!(
            routes
                .distance(&FactoryId("F1".into()), &FactoryId("F2".into()))
                .unwrap(),
            12.5
        );

        let factories_path = fixture(
            "factories.csv",
            "factory_id,longitude,latitude,port_num\nF1,0.0,0.0,2\nF2,1.0,1.0,1\n",
        );
        let factories = load_factories(&factories_path).unwrap();
        assert_eq!(factories.len(), 2);
        assert_eq!(first_factory_id(&factories_path).unwrap(), FactoryId("F1".into()));

        let vehicles_path = fixture(
            "vehicles.csv",
            "car_num,capacity,operation_time,gps_id\nV1,10,0,gps-1\nV2,15,0,gps-2\n",
        );
        let vehicles = load_vehicles(&vehicles_path, FactoryId("F1".into())).unwrap();
        assert_eq!(vehicles.len(), 2);
    }

    #[test]
    fn oversized_order_splits_into_atomic_units_preserving_total_demand() {
        let orders_path = fixture(
            "orders_split.csv",
            "order_id,q_standard,q_small,q_box,demand,creation_time,committed_completion_time,load_time,unload_time,pickup_id,delivery_id\n\
             O1,16,0,0,16.0,08:00:00,09:00:00,60,60,F1,F2\n",
        );
        let slices = load_order_slices(&orders_path, 15, None).unwrap();
        let all: Vec<_> = slices.values().flatten().collect();
        assert_eq!(all.len(), 16);
        let total: f32 = all.iter().map(|o| o.demand).sum();
        assert_eq!(total, 16.0);
        assert!(all.iter().all(|o| o.id == OrderId("O1".into())));
    }

    #[test]
    fn slice_size_defaults_to_gcd_of_load_times() {
        let orders_path = fixture(
            "orders_gcd.csv",
            "order_id,q_standard,q_small,q_box,demand,creation_time,committed_completion_time,load_time,unload_time,pickup_id,delivery_id\n\
             O1,1,0,0,1.0,00:02:00,01:00:00,120,60,F1,F2\n\
             O2,1,0,0,1.0,00:03:00,01:00:00,180,60,F1,F2\n\
             O3,1,0,0,1.0,00:05:00,01:00:00,300,60,F1,F2\n",
        );
        // gcd(120, 180, 300) == 60
        let slices = load_order_slices(&orders_path, 100, None).unwrap();
        for (bucket, orders) in &slices {
            assert_eq!(bucket % 60, 0);
            for order in orders {
                assert_eq!(order.creation_time - order.creation_time % 60, *bucket);
            }
        }
    }
}
