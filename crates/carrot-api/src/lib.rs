pub mod auth;
pub mod comments;
pub mod convert;
pub mod error;
pub mod extract;
pub mod listings;
pub mod locations;
pub mod middleware;
pub mod profile;
pub mod routes;
pub mod state;
