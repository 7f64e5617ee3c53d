#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod board;
mod combat;
mod common;
mod config;
pub mod domain;
mod placement;
mod session;
mod ship;
#[cfg(feature = "std")]
pub mod api;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod node;
#[cfg(feature = "std")]
pub mod stub;
#[cfg(feature = "std")]
mod ui;

pub use board::*;
pub use combat::*;
pub use common::*;
pub use config::*;
pub use placement::*;
pub use session::*;
pub use ship::*;
#[cfg(feature = "std")]
pub use api::SeaBattleApi;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use node::*;
#[cfg(feature = "std")]
pub use stub::*;
#[cfg(feature = "std")]
pub use ui::*;
