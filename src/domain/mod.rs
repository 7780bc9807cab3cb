// Domain layer: webhook payload, build models and ports. No AWS types leak in here.

pub mod model;
pub mod payload;
pub mod ports;
