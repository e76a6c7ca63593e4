//! Rotation tables: cyclic color lists with a phase-advance delay.

use serde::{Deserialize, Serialize};

/// Number of rotation slots in a table.
pub const MAX_COLOR_ROTATIONS: usize = 4;

/// Words reserved per slot: `[length, delay, colors...]`.
pub const MAX_LENGTH_COLOR_ROTATION: usize = 64;

/// Longest color list a slot can hold.
pub const MAX_ROTATION_COLORS: usize = MAX_LENGTH_COLOR_ROTATION - 2;

/// Length of a packed rotation table.
pub const ROTATION_TABLE_LEN: usize = MAX_COLOR_ROTATIONS * MAX_LENGTH_COLOR_ROTATION;

/// Identity of a rotating color: which slot it belongs to and where in the
/// slot's list it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotationRef {
    pub slot: u16,
    pub position: u16,
}

/// One slot of a rotation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSlot<'a> {
    /// Milliseconds between two phase advances, 0 disables the slot
    pub delay_ms: u16,
    /// Colors cycling among themselves, empty for a disabled slot
    pub colors: &'a [u16],
}

impl<'a> RotationSlot<'a> {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether the scheduler animates this slot.
    pub fn is_enabled(&self) -> bool {
        !self.colors.is_empty() && self.delay_ms > 0
    }

    /// Color at `position` advanced by `shift` steps.
    pub fn shifted(&self, position: u16, shift: u16) -> Option<u16> {
        if self.colors.is_empty() {
            return None;
        }
        let index = (position as usize + shift as usize) % self.colors.len();
        Some(self.colors[index])
    }

    /// Position of `color` in the list, first occurrence wins.
    pub fn position_of(&self, color: u16) -> Option<u16> {
        self.colors.iter().position(|&c| c == color).map(|p| p as u16)
    }
}

/// Read-only view over a packed rotation table.
///
/// The table holds [`MAX_COLOR_ROTATIONS`] slots of
/// [`MAX_LENGTH_COLOR_ROTATION`] words each: the color count, the delay in
/// milliseconds, then the colors.
#[derive(Debug, Clone, Copy)]
pub struct RotationTable<'a> {
    raw: &'a [u16],
}

impl<'a> RotationTable<'a> {
    /// Wrap a packed table, `None` if it is shorter than [`ROTATION_TABLE_LEN`].
    pub fn new(raw: &'a [u16]) -> Option<Self> {
        if raw.len() < ROTATION_TABLE_LEN {
            return None;
        }
        Some(Self { raw: &raw[..ROTATION_TABLE_LEN] })
    }

    /// Slot `index`. Out-of-range indices read as a disabled slot.
    ///
    /// A declared length above [`MAX_ROTATION_COLORS`] is clamped.
    pub fn slot(&self, index: usize) -> RotationSlot<'a> {
        if index >= MAX_COLOR_ROTATIONS {
            return RotationSlot { delay_ms: 0, colors: &[] };
        }
        let base = index * MAX_LENGTH_COLOR_ROTATION;
        let raw: &'a [u16] = self.raw;
        let length = (raw[base] as usize).min(MAX_ROTATION_COLORS);
        RotationSlot { delay_ms: raw[base + 1], colors: &raw[base + 2..base + 2 + length] }
    }

    pub fn slots(&self) -> impl Iterator<Item = RotationSlot<'a>> + '_ {
        (0..MAX_COLOR_ROTATIONS).map(move |i| self.slot(i))
    }

    /// Find the first enabled slot, in index order, whose list contains
    /// `color`.
    ///
    /// Disabled slots are skipped the same way the scheduler's full scan skips
    /// inactive ones, so a color listed in both resolves to the active slot.
    pub fn find(&self, color: u16) -> Option<RotationRef> {
        self.slots().enumerate().filter(|(_, s)| s.is_enabled()).find_map(|(slot, s)| {
            s.position_of(color).map(|position| RotationRef { slot: slot as u16, position })
        })
    }

    /// Color of `rotation` once its slot has advanced by `shift`.
    pub fn shifted(&self, rotation: RotationRef, shift: u16) -> Option<u16> {
        self.slot(rotation.slot as usize).shifted(rotation.position, shift)
    }
}

/// Pack `(delay_ms, colors)` pairs into the table layout.
///
/// Missing slots stay disabled; extra slots and colors beyond the limits are
/// dropped.
pub fn pack_rotations(slots: &[(u16, &[u16])]) -> Vec<u16> {
    let mut raw = vec![0u16; ROTATION_TABLE_LEN];
    for (index, (delay, colors)) in slots.iter().take(MAX_COLOR_ROTATIONS).enumerate() {
        let base = index * MAX_LENGTH_COLOR_ROTATION;
        let colors = &colors[..colors.len().min(MAX_ROTATION_COLORS)];
        raw[base] = colors.len() as u16;
        raw[base + 1] = *delay;
        raw[base + 2..base + 2 + colors.len()].copy_from_slice(colors);
    }
    raw
}
