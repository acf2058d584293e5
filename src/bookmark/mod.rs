//! Per-user favourites. The relation itself is stored on the user record,
//! see `User::favourites`.

pub mod endpoints;
pub mod manager;
pub use endpoints::*;
