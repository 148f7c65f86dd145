pub mod connection;
pub mod dto;
pub mod pagination;
pub mod repository;
