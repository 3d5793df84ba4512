//! Entities synthesized from `schema.toml` by the build script.

pub mod game;

use std::rc::Rc;

include!(concat!(env!("OUT_DIR"), "/entities.rs"));
