// Domain layer: records, sink targets and the ports the sinks implement.

pub mod model;
pub mod ports;
