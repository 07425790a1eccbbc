//! Public v1 API handlers

pub mod catalog;
mod params;
pub mod specs;
pub mod vehicles;
pub mod vin;
