pub mod app;
pub mod config;
pub mod domain;
pub mod enrichr;
pub mod error;
pub mod genes;
pub mod labels;
pub mod output;
pub mod plot;
pub mod results;
