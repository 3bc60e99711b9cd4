use std::{
    borrow::{Borrow, BorrowMut},
    collections::BTreeMap,
    hash::Hash,
    path::Path,
};

use serde::de::DeserializeOwned;

pub mod factory;
pub mod order;
pub mod route_table;
pub mod vehicle;

pub(crate) fn read_csv<T>(path: impl AsRef<Path>) -> anyhow::Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let mut reader = csv::Reader::from_path(path.as_ref())
        .map_err(|e| anyhow::anyhow!("opening {}: {e}", path.as_ref().display()))?;
    let records: csv::Result<Vec<T>> = reader.deserialize().collect();
    Ok(records.map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.as_ref().display()))?)
}

pub(crate) fn parse_naive_time<'de, D>(deserializer: D) -> Result<chrono::NaiveTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let s = String::deserialize(deserializer)?;
    chrono::NaiveTime::parse_from_str(&s, "%H:%M:%S").map_err(serde::de::Error::custom)
}

pub(crate) fn parse_duration_seconds<'de, D>(
    deserializer: D,
) -> Result<chrono::Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let s = i64::deserialize(deserializer)?;
    Ok(chrono::Duration::seconds(s))
}

pub trait Map<K, V>: BorrowMut<MapType<K, V>>
where
    K: Eq + Ord + 'static,
    V: 'static,
{
    fn gets<Q>(&self, key: &Q) -> &V
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Hash + Eq + Ord,
    {
        self.borrow().get(key).expect("unchecked get failed")
    }

    fn gets_mut<Q>(&mut self, key: &Q) -> &mut V
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Hash + Eq + Ord,
    {
        self.borrow_mut()
            .get_mut(key)
            .expect("unchecked get_mut failed")
    }

    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Hash + Eq + Ord,
    {
        self.borrow().get(key)
    }

    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Hash + Eq + Ord,
    {
        self.borrow_mut().get_mut(key)
    }

    fn iter(&self) -> std::collections::btree_map::Iter<'_, K, V> {
        self.borrow().iter()
    }

    fn iter_mut(&mut self) -> std::collections::btree_map::IterMut<'_, K, V> {
        self.borrow_mut().iter_mut()
    }

    fn keys(&self) -> std::collections::btree_map::Keys<'_, K, V> {
        self.borrow().keys()
    }

    fn values(&self) -> std::collections::btree_map::Values<'_, K, V> {
        self.borrow().values()
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.borrow_mut().insert(key, value)
    }

    fn len(&self) -> usize {
        self.borrow().len()
    }

    fn is_empty(&self) -> bool {
        self.borrow().is_empty()
    }
}

pub type MapType<K, V> = BTreeMap<K, V>;

#[macro_export]
macro_rules! define_map {
    ($key:ty, $value:ty, $base:ident) => {
        #[derive(Debug, Default, Clone)]
        pub struct $base($crate::model::MapType<$key, $value>);

        impl std::borrow::Borrow<$crate::model::MapType<$key, $value>> for $base {
            fn borrow(&self) -> &$crate::model::MapType<$key, $value> {
                &self.0
            }
        }

        impl std::borrow::BorrowMut<$crate::model::MapType<$key, $value>> for $base {
            fn borrow_mut(&mut self) -> &mut $crate::model::MapType<$key, $value> {
                &mut self.0
            }
        }

        impl $crate::model::Map<$key, $value> for $base {}

        impl From<$crate::model::MapType<$key, $value>> for $base {
            fn from(map: $crate::model::MapType<$key, $value>) -> Self {
                Self(map)
            }
        }

        impl FromIterator<($key, $value)> for $base {
            fn from_iter<I: IntoIterator<Item = ($key, $value)>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl IntoIterator for $base {
            type Item = ($key, $value);
            type IntoIter =
                <$crate::model::MapType<$key, $value> as std::iter::IntoIterator>::IntoIter;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }
    };
}
