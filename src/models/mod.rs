pub mod api;
pub mod meeting;
