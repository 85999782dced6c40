pub mod fetchers;
pub mod presenter;
