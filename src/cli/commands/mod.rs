pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod guards;
pub mod incidents;
pub mod reports;
pub mod shifts;
pub mod sites;
