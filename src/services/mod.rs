pub mod review_api;
pub mod user_ratings;
