pub mod associations;
pub mod languages;
pub mod mistakes;
pub mod statistics;
pub mod user;
