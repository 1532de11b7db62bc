pub mod alerts;
pub mod campgrounds;
pub mod images;
pub mod ingest;
pub mod mapbox;
pub mod nps;
pub mod owm;
pub mod parks;
pub mod pipeline;
pub mod scheduler;
pub mod single_flight;
pub mod weather;
