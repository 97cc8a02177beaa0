// HTTP page routes
//
// Auth routes (login, register, logout, OAuth) live in `crate::auth::routes`;
// everything else a browser visits is here.

pub mod common;
pub mod pages;

pub use common::PageError;
pub use pages::routes;
