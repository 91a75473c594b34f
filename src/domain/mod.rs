// Domain layer: models and ports shared by the fetcher and the RPC pair.

pub mod model;
pub mod ports;
