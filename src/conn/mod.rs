//! Registry of live connections and the chats they are joined to

mod room;
mod state;

mod client;
pub use client::Client;

mod hub;
pub use hub::Hub;
