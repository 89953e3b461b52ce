// Business logic service implementations

pub mod health;
pub mod mail;
pub mod otp;
