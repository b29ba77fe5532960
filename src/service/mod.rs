pub mod accounts;
pub mod password;
