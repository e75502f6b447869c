//! redfishctl - CLI for reading BMC sensors over Redfish

pub mod cli;
pub mod commands;
pub mod output;
