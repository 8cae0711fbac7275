pub mod availability;
pub mod booking;
pub mod checkout;
pub mod circuit_breaker;
pub mod cleanup;
pub mod notification;
pub mod selection;
pub mod tickets;
pub mod workflow;
