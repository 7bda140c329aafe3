mod api;
mod conn;
mod core;
mod extractor;
mod rpc;
mod util;
mod ws;

pub use api::{make_app, AppState};
pub use util::config::Config;
