pub mod entity;
pub mod geom;
pub mod metrics;
pub mod patrol;
pub mod physics;
pub mod rules;
