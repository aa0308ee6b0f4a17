pub mod trait_impl;
pub mod google;

pub use trait_impl::InsightProvider;
pub use google::GeminiProvider;
