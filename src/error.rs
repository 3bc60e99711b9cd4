use crate::model::{factory::FactoryId, order::OrderId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("pickup position {pickup} is after delivery position {delivery}")]
    InvalidPositions { pickup: usize, delivery: usize },

    #[error("order {0} cannot be removed while it is the vehicle's current assignment")]
    OrderInFlight(OrderId),

    #[error("no route entry for factory pair ({from}, {to})")]
    UnknownFactory { from: FactoryId, to: FactoryId },

    #[error("no feasible insertion position exists for order {0}")]
    InfeasibleInvariant(OrderId),

    #[error("algorithm {0:?} is not implemented")]
    UnsupportedAlgorithm(crate::dispatch::Algorithm),

    #[error("failed to load input data: {0}")]
    BadInput(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
