//! ECS components for entities.
//!
//! This module groups the component types attached to slot entities and
//! overlays. Value types shared with snapshots and descriptors live next to
//! the components that carry them.
//!
//! Submodules overview:
//! - [`ambient`] – named looping effects on a slot entity, each with its own clock
//! - [`card`] – card values, slot keys and the persistent slot components
//! - [`overlay`] – transient card drawn above the hands while a transition runs
//! - [`screenrect`] – screen rectangle plus the `Unplaced` and `Covered` markers
//! - [`tween`] – animated interpolation of a screen rectangle
//! - [`zindex`] – rendering order hint for 2D drawing

pub mod ambient;
pub mod card;
pub mod overlay;
pub mod screenrect;
pub mod tween;
pub mod zindex;
