pub mod account;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod retry;
pub mod services;

pub use account::{AccountResolver, AccountState, ResolveStatus};
pub use client::RemoteClient;
pub use error::DataError;
pub use services::{OpsService, QueryData};
