pub mod booking;
pub mod identity;
