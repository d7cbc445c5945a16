pub mod core;
pub mod repository;


pub use core::Repository;
