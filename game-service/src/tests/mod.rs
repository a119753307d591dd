mod routing_tests;
mod save_tests;
pub mod utils;
