//! Time-driven phase advance of rotation slots.
//!
//! Each enabled slot is armed with a next-trigger timestamp. A tick at or
//! after that timestamp advances the slot's shift by one step (never more,
//! however late the tick is) and re-arms it one delay later.

use serde::{Deserialize, Serialize};

use super::cache::RotationCache;
use super::table::{RotationTable, MAX_COLOR_ROTATIONS};

/// Animation state of one rotation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlotState {
    pub active: bool,
    /// Absolute time of the next phase advance, 0 when unarmed
    pub next_trigger_ms: u32,
    /// Current phase, always below the slot length
    pub shift: u16,
}

/// Animation state of every slot, carried by the caller between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RotationState {
    pub slots: [SlotState; MAX_COLOR_ROTATIONS],
}

impl RotationState {
    /// Arm every enabled slot at `now_ms + delay` with phase 0.
    pub fn new(table: &RotationTable<'_>, now_ms: u32) -> Self {
        let mut state = Self::default();
        for (slot, rotation) in state.slots.iter_mut().zip(table.slots()) {
            if rotation.is_enabled() {
                *slot = SlotState {
                    active: true,
                    next_trigger_ms: now_ms.saturating_add(rotation.delay_ms as u32),
                    shift: 0,
                };
            }
        }
        state
    }

    /// Current phase of every slot.
    pub fn shifts(&self) -> [u16; MAX_COLOR_ROTATIONS] {
        self.slots.map(|s| s.shift)
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.active)
    }

    pub fn has_active(&self) -> bool {
        self.slots.iter().any(|s| s.active)
    }

    /// Earliest armed trigger among active slots.
    pub fn next_trigger(&self) -> Option<u32> {
        self.slots.iter().filter(|s| s.active).map(|s| s.next_trigger_ms).min()
    }
}

/// Arm a fresh state for `table`; without a table every slot stays disabled.
pub fn init_rotation_state(table: Option<&RotationTable<'_>>, now_ms: u32) -> RotationState {
    table.map(|t| RotationState::new(t, now_ms)).unwrap_or_default()
}

/// Outcome of advancing the slots once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Whether at least one slot advanced
    pub rotated: bool,
    /// Milliseconds until the next slot is due, 0 when none is active
    pub next_delay_ms: u32,
}

/// Advance every due slot by one step.
///
/// Slots disabled in the table are deactivated and reset; enabled slots that
/// were never armed are armed without advancing.
pub fn advance(table: &RotationTable<'_>, state: &mut RotationState, now_ms: u32) -> Tick {
    let mut rotated = false;
    let mut next_delay: Option<u32> = None;

    for (index, (slot, rotation)) in state.slots.iter_mut().zip(table.slots()).enumerate() {
        if !rotation.is_enabled() {
            *slot = SlotState::default();
            continue;
        }
        slot.active = true;
        let delay = rotation.delay_ms as u32;
        if slot.next_trigger_ms == 0 {
            slot.next_trigger_ms = now_ms.saturating_add(delay);
        } else if now_ms >= slot.next_trigger_ms {
            slot.shift = ((slot.shift as usize + 1) % rotation.len()) as u16;
            slot.next_trigger_ms = now_ms.saturating_add(delay);
            rotated = true;
            tracing::trace!(slot = index, shift = slot.shift, now_ms, "rotation slot fired");
        }
        let remaining = slot.next_trigger_ms.saturating_sub(now_ms);
        next_delay = Some(next_delay.map_or(remaining, |d| d.min(remaining)));
    }

    Tick { rotated, next_delay_ms: next_delay.unwrap_or(0) }
}

/// Copy `input` to `output`, advance due slots, and rewrite rotating colors
/// by searching the table for every pixel.
///
/// Returns the delay until the next slot is due, or 0 when no slot is active
/// or the buffers are unusable (empty or of different lengths, in which case
/// `output` is left untouched).
pub fn apply_rotations(
    table: &RotationTable<'_>,
    input: &[u16],
    output: &mut [u16],
    state: &mut RotationState,
    now_ms: u32,
) -> u32 {
    if input.is_empty() || input.len() != output.len() {
        tracing::warn!(input = input.len(), output = output.len(), "rotation buffers do not line up");
        return 0;
    }
    output.copy_from_slice(input);

    let tick = advance(table, state, now_ms);
    if !tick.rotated {
        return tick.next_delay_ms;
    }

    for pixel in output.iter_mut() {
        let value = *pixel;
        for (index, rotation) in table.slots().enumerate() {
            if !state.slots[index].active {
                continue;
            }
            if let Some(position) = rotation.position_of(value) {
                if let Some(color) = rotation.shifted(position, state.slots[index].shift) {
                    *pixel = color;
                }
                break;
            }
        }
    }
    tick.next_delay_ms
}

/// Like [`apply_rotations`], but rewrites pixels from the identity cached
/// while compositing instead of searching the table.
pub fn apply_rotations_cached(
    table: &RotationTable<'_>,
    input: &[u16],
    output: &mut [u16],
    cache: &RotationCache,
    state: &mut RotationState,
    now_ms: u32,
) -> u32 {
    if input.is_empty() || input.len() != output.len() || cache.len() != input.len() {
        tracing::warn!(
            input = input.len(),
            output = output.len(),
            cache = cache.len(),
            "rotation buffers do not line up"
        );
        return 0;
    }
    output.copy_from_slice(input);

    let tick = advance(table, state, now_ms);
    if !tick.rotated {
        return tick.next_delay_ms;
    }

    for (pixel, entry) in output.iter_mut().zip(cache.as_slice()) {
        let Some(rotation) = entry else { continue };
        let slot = rotation.slot as usize;
        if !state.is_active(slot) {
            continue;
        }
        if let Some(color) = table.shifted(*rotation, state.slots[slot].shift) {
            *pixel = color;
        }
    }
    tick.next_delay_ms
}

/// A rotation table bundled with the state it animates.
#[derive(Debug, Clone)]
pub struct RotationScheduler<'a> {
    table: RotationTable<'a>,
    state: RotationState,
}

impl<'a> RotationScheduler<'a> {
    pub fn new(table: RotationTable<'a>, now_ms: u32) -> Self {
        let state = RotationState::new(&table, now_ms);
        Self { table, state }
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    /// One scheduler tick using the full-scan rewrite.
    pub fn tick(&mut self, input: &[u16], output: &mut [u16], now_ms: u32) -> u32 {
        apply_rotations(&self.table, input, output, &mut self.state, now_ms)
    }

    /// One scheduler tick using a compositor rotation cache.
    pub fn tick_cached(&mut self, input: &[u16], output: &mut [u16], cache: &RotationCache, now_ms: u32) -> u32 {
        apply_rotations_cached(&self.table, input, output, cache, &mut self.state, now_ms)
    }
}

/// State a scheduler armed at time 0 holds after being ticked at every due
/// time up to and including `until_ms`.
///
/// Each slot fires at every multiple of its delay, so its state is computed
/// directly rather than by replaying the ticks.
pub fn simulate_shifts(table: &RotationTable<'_>, until_ms: u32) -> RotationState {
    let mut state = RotationState::default();
    for (slot, rotation) in state.slots.iter_mut().zip(table.slots()) {
        if !rotation.is_enabled() {
            continue;
        }
        let delay = rotation.delay_ms as u64;
        let fires = until_ms as u64 / delay;
        *slot = SlotState {
            active: true,
            next_trigger_ms: ((fires + 1) * delay).min(u32::MAX as u64) as u32,
            shift: (fires % rotation.len() as u64) as u16,
        };
    }
    state
}
