//! dmdcolor - Sprite location, frame compositing and color rotation for
//! colorized dot-matrix display frames
//!
//! This library provides functionality to:
//! - Find catalog sprites inside a captured frame by their 4-pixel signatures
//! - Composite background, dynamic and static layers plus matched sprites
//!   at the base or extra resolution
//! - Animate palette color rotations over time
//! - Load JSON scene fixtures and preview them as PNG or GIF

pub mod cli;
pub mod color;
pub mod composition;
pub mod config;
pub mod gif;
pub mod locate;
pub mod models;
pub mod output;
pub mod preview;
pub mod rotation;
pub mod scene;
