pub mod accounts;
pub mod health;
pub mod sessions;
pub mod vendor;
