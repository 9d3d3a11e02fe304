pub mod controller;
pub mod jwt;
pub mod model;
pub mod repository;
pub mod service;
