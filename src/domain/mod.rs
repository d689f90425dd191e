// Domain layer - GPS fixes, tracks and the rules that shape them

pub mod model;
pub mod rules;
