pub mod app;
pub mod commit;
pub mod config;
pub mod domain;
pub mod error;
pub mod input;
pub mod keys;
pub mod output;
pub mod report;
pub mod resolver;
pub mod store;
pub mod validate;
pub mod vocab;
pub mod writer;
