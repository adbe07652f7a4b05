pub mod application;
pub mod pet;
pub mod profile;
