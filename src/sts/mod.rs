pub mod broker;
pub mod error;
pub mod handler;
pub mod minio;
pub mod policy;
pub mod router;
pub mod signing;
pub mod xml;
