pub mod interpolation;
pub mod point;
pub mod pose;
pub mod sweep;
