// Domain layer: site records, markers and the ports the pipeline depends on.

pub mod model;
pub mod ports;
