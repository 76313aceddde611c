pub mod config;
pub mod logging;

pub mod coordinator;
pub mod destination;
pub mod fetch;
pub mod strategy;
pub mod url_list;
