//! Residential solar viability simulator.

pub mod cli;
pub mod config;
pub mod heating;
pub mod io;
pub mod log;
/// Cash-flow engine, net-metering rule, credit ledger, and financial indicators.
pub mod sim;
pub mod tariff;
pub mod units;
pub mod viability;
