// Domain layer: lookup models and ports (interfaces).

pub mod model;
pub mod ports;
