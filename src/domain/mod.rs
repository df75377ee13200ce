// Domain layer: models shared by every stage and the ports the stages talk through.

pub mod model;
pub mod ports;
