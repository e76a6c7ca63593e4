//! Color rotation: cyclic palette substitution driven by wall-clock time.
//!
//! A [`RotationTable`] lists up to four slots of interchangeable colors. The
//! compositor records which slot and position every painted pixel belongs to
//! in a [`RotationCache`]; the scheduler advances slot phases over time and
//! rewrites the affected pixels of a rendered frame.

mod cache;
mod scheduler;
mod table;

pub use cache::RotationCache;
pub use scheduler::{
    advance, apply_rotations, apply_rotations_cached, init_rotation_state, simulate_shifts, RotationScheduler,
    RotationState, SlotState, Tick,
};
pub use table::{
    pack_rotations, RotationRef, RotationSlot, RotationTable, MAX_COLOR_ROTATIONS, MAX_LENGTH_COLOR_ROTATION,
    MAX_ROTATION_COLORS, ROTATION_TABLE_LEN,
};
