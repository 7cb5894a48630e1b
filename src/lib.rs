#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod csv;
pub mod epub;
pub mod export;
pub mod fetch;
pub mod formats;
pub mod html;
pub mod ingest;
pub mod logging;
pub mod markup;
pub mod narration;
pub mod output;
pub mod reader;
pub mod render;
pub mod session;
pub mod state;
