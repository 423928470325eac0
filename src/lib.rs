pub mod auth;
pub mod client;
pub mod config;
pub mod contest;
pub mod copier;
pub mod dom;
pub mod export;
pub mod fetch;
pub mod jobs;
pub mod range;
pub mod report;
pub mod session;
pub mod submit;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{Browser, BrowserClient};
pub use config::Config;
pub use contest::{ContestData, ContestStore, ProblemRecord};
pub use jobs::{Job, Workspace};
pub use range::LabelRange;
pub use session::Session;
pub use types::{BrowserOptions, Timing, TransferError};
