//! Domain rules for the BPS Kota Batu feedback and recognition service.
//!
//! Everything in this crate is pure: no database, no HTTP, no clock. Callers
//! pass in the rows they loaded and the current time, and get decisions back.

pub mod allowance;
pub mod assessment;
pub mod calendar;
pub mod error;
pub mod period;
pub mod ranking;
pub mod roles;
pub mod scoring;
pub mod types;
