//! Query builder utilities
//!
//! This module provides typed filter and update construction.

pub mod filter;
pub mod update;


pub use filter::{Filter, FilterCondition, FilterOperator};
pub use update::{UpdateOperation, UpdateSet};
