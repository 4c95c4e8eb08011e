pub mod fetch;
pub mod reduce;

pub use fetch::handle_fetch;
pub use reduce::handle_reduce;
