//! Screen state module

mod attributes;
mod notification;
mod password;
mod permissions;
mod registry;
mod screen;
mod user;

pub use attributes::*;
pub use notification::*;
pub use password::*;
pub use permissions::*;
pub use registry::*;
pub use screen::*;
pub use user::*;
