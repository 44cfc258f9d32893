//! Page data controllers.
//!
//! One controller per dashboard page. Each owns its query state, its loaded
//! rows, and the collaborators it mutates through; pages never share state
//! with each other.

pub mod customers;
pub mod orders;
pub mod products;
pub mod special_items;
