pub mod dump;
pub mod lifecycle;
pub mod list;
pub mod params;
pub mod service;
