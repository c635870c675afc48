// Library for tests to access modules

pub mod buffer;
pub mod collector;
pub mod config;
pub mod ingest;
pub mod live;
pub mod models;
pub mod poller;
pub mod routes;
pub mod series;
pub mod uptime;
pub mod version;
