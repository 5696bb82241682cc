mod bad_method;
mod not_found;

pub use bad_method::bad_method_handler;
pub use not_found::not_found_handler;
