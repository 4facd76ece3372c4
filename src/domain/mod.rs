// Domain layer: models and ports shared by the core services and adapters.

pub mod model;
pub mod ports;
