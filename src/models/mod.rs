pub mod driver;
pub mod event;
pub mod payment;
pub mod ride;
