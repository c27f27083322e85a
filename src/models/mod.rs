//! Data models for the warehouse/hobby service.
//!
//! This module contains the wire types exchanged with the REST API:
//!
//! - `User`, `UserProfile`: account identity and the public profile
//! - `Warehouse`, `Stock`: inventory records and their payload wrappers
//! - `Hobby`, `Post`: community records
//!
//! Field names follow the service exactly: account and hobby fields are
//! camelCase, stock fields are snake_case, dates are epoch milliseconds.

pub mod hobby;
pub mod post;
pub mod stock;
pub mod user;
pub mod warehouse;

pub use hobby::{HobbiesPayload, Hobby, HobbyDetail, HobbyMember, HobbyPayload, JoinHobbyRequest};
pub use post::{NewPost, Post, PostAuthor, UpdatePost};
pub use stock::{NewStock, Stock, UpdateStock};
pub use user::{
    LoginRequest, ProfilePayload, RegisterRequest, SocialLinks, User, UserPayload, UserProfile,
};
pub use warehouse::{
    AllStocksPayload, NewWarehouse, Warehouse, WarehouseStocksPayload, WarehouseWithStocks,
    WarehousesPayload,
};
