//! Object layout and storage for the managed heap
pub mod layout;
pub mod region;
pub mod units;
