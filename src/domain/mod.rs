// Domain layer: models and ports (interfaces). No HTTP or terminal concerns here.

pub mod model;
pub mod ports;
