mod health;
mod link;

pub use health::ping_handler;
pub use link::{create_link_handler, redirect_handler, show_handler};
