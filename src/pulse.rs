//! Pulse engine: bounded-duration actuation with deferred restore.
//!
//! A pulse drives a pin to a level now and restores the opposite level
//! after `duration_ms`, without blocking anyone. Records come from a
//! fixed pool shared by all outputs; pending expirations sit in a
//! deadline queue storing *relative* deltas:
//!
//! ```text
//!   queue:  [ +300ms ]──[ +200ms ]──[ +0ms ]──[ +1500ms ]
//!            (fires at 300, 500, 500 and 2000 ms from now)
//! ```
//!
//! Advancing time only decrements at the head, so a scheduler pass costs
//! O(1) per elapsed tick plus O(fired). The pool and queue share one lock;
//! `trigger`/`cancel` may run on a different cooperative thread than the
//! loop calling [`process`](PulseScheduler::process). No call blocks.
//!
//! Handles carry a generation tag. Once a pool record is recycled, stale
//! handles to it stop matching, so a late `cancel` degrades to a no-op
//! instead of killing an unrelated pulse.

use std::sync::Mutex;

use log::warn;

use crate::app::ports::{GpioPort, I2cPort};
use crate::drivers::dispatch::VirtualPins;
use crate::pins::PinDescriptor;

/// Reference to a pulse record. Obtained from
/// [`trigger`](PulseScheduler::trigger) or [`claim`](PulseScheduler::claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseHandle {
    index: u8,
    generation: u16,
}

#[derive(Debug, Clone, Copy)]
struct PulseRecord {
    descr: PinDescriptor,
    /// Level restored on expiry or cancel-with-restore.
    reset_state: bool,
    scheduled: bool,
    /// False for records claimed as caller-owned storage; those never
    /// return to the pool.
    pool_owned: bool,
    free: bool,
    generation: u16,
}

impl PulseRecord {
    const FREE: Self = Self {
        descr: PinDescriptor::decode(0),
        reset_state: false,
        scheduled: false,
        pool_owned: true,
        free: true,
        generation: 0,
    };
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    index: u8,
    /// Milliseconds after the previous entry (after "now" for the head).
    delta_ms: u32,
}

struct Inner<const N: usize> {
    slots: [PulseRecord; N],
    queue: heapless::Vec<QueueEntry, N>,
    last_process_ms: u32,
}

/// Fixed-capacity pulse scheduler. `N` is the total record count.
pub struct PulseScheduler<const N: usize> {
    inner: Mutex<Inner<N>>,
}

impl<const N: usize> PulseScheduler<N> {
    /// New scheduler with an empty queue, primed with the current
    /// monotonic millisecond timestamp.
    pub fn new(now_ms: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: [PulseRecord::FREE; N],
                queue: heapless::Vec::new(),
                last_process_ms: now_ms,
            }),
        }
    }

    /// Take a record out of the pool permanently for caller-owned reuse.
    ///
    /// Subsystems with a pulse they must never lose to pool contention
    /// claim one at bring-up and pass the handle to every `trigger`.
    /// Returns `None` when the pool is empty.
    pub fn claim(&self) -> Option<PulseHandle> {
        let mut inner = self.lock();
        let index = inner.slots.iter().position(|s| s.free)?;
        let slot = &mut inner.slots[index];
        slot.free = false;
        slot.pool_owned = false;
        Some(PulseHandle {
            index: index as u8,
            generation: slot.generation,
        })
    }

    /// Start a pulse: drive `descr` to `state` now, schedule the restore
    /// of `!state` after `duration_ms`.
    ///
    /// `record` names a claimed caller-owned slot to use; `None` draws
    /// from the pool. Returns `None` — with the pin untouched — when
    /// `duration_ms == 0` (defined no-op), when the pool is exhausted, or
    /// when `record` is stale.
    pub fn trigger<G: GpioPort, B: I2cPort>(
        &self,
        pins: &mut VirtualPins<G, B>,
        descr: PinDescriptor,
        state: bool,
        duration_ms: u32,
        record: Option<PulseHandle>,
    ) -> Option<PulseHandle> {
        if duration_ms == 0 {
            return None;
        }

        let mut inner = self.lock();

        let index = match record {
            Some(handle) => {
                let slot = *inner.slots.get(handle.index as usize)?;
                if slot.free || slot.generation != handle.generation {
                    warn!("pulse: stale record handle {:?}", handle);
                    return None;
                }
                // Re-triggering a still-scheduled caller-owned record
                // replaces its pending expiry.
                if slot.scheduled {
                    inner.queue_remove(handle.index);
                }
                handle.index as usize
            }
            None => {
                let Some(index) = inner.slots.iter().position(|s| s.free) else {
                    return None;
                };
                inner.slots[index].free = false;
                inner.slots[index].pool_owned = true;
                index
            }
        };

        if let Err(e) = pins.write(descr, state) {
            // The shadow already holds the intended level; the restore
            // write still runs at expiry. Surfaced, not retried.
            warn!("pulse: drive failed on {:02x}: {}", descr.raw(), e);
        }

        let slot = &mut inner.slots[index];
        slot.descr = descr;
        slot.reset_state = !state;
        slot.scheduled = true;
        let generation = slot.generation;

        inner.queue_insert(index as u8, duration_ms);

        Some(PulseHandle {
            index: index as u8,
            generation,
        })
    }

    /// Cancel a pending pulse. No-op when the handle is stale or the
    /// pulse already expired; safe to call twice. With `restore`, the pin
    /// is driven back to the record's reset level; without, it stays
    /// where the pulse put it.
    pub fn cancel<G: GpioPort, B: I2cPort>(
        &self,
        pins: &mut VirtualPins<G, B>,
        handle: PulseHandle,
        restore: bool,
    ) {
        let mut inner = self.lock();

        let Some(slot) = inner.slots.get(handle.index as usize) else {
            return;
        };
        if slot.free || slot.generation != handle.generation || !slot.scheduled {
            return;
        }
        let (descr, reset_state) = (slot.descr, slot.reset_state);

        inner.queue_remove(handle.index);
        inner.slots[handle.index as usize].scheduled = false;

        if restore {
            if let Err(e) = pins.write(descr, reset_state) {
                warn!("pulse: restore failed on {:02x}: {}", descr.raw(), e);
            }
        }

        inner.release(handle.index as usize);
    }

    /// Whether the pulse behind `handle` is still pending.
    pub fn is_active(&self, handle: PulseHandle) -> bool {
        let inner = self.lock();
        inner
            .slots
            .get(handle.index as usize)
            .is_some_and(|s| !s.free && s.generation == handle.generation && s.scheduled)
    }

    /// Advance the deadline queue to `now_ms` and fire every expired
    /// pulse: drive its reset level, unschedule it, return pool records
    /// to the pool. Returns true if at least one fired, so the caller
    /// knows to re-announce output state.
    ///
    /// Called once per pass from the owning cooperative thread, never
    /// from interrupt context.
    pub fn process<G: GpioPort, B: I2cPort>(
        &self,
        pins: &mut VirtualPins<G, B>,
        now_ms: u32,
    ) -> bool {
        let mut inner = self.lock();

        let elapsed = now_ms.wrapping_sub(inner.last_process_ms);
        inner.last_process_ms = now_ms;
        inner.queue_shift(elapsed);

        let mut fired = false;
        while inner.queue.first().is_some_and(|e| e.delta_ms == 0) {
            let entry = inner.queue.remove(0);
            let index = entry.index as usize;

            inner.slots[index].scheduled = false;
            let (descr, reset_state) = (inner.slots[index].descr, inner.slots[index].reset_state);
            if let Err(e) = pins.write(descr, reset_state) {
                warn!("pulse: restore failed on {:02x}: {}", descr.raw(), e);
            }
            inner.release(index);
            fired = true;
        }

        fired
    }

    /// Delay until the next expiry, `None` with nothing scheduled. Bounds
    /// the main loop's idle wait so pulses are serviced on time without
    /// busy polling.
    pub fn remaining(&self) -> Option<u32> {
        self.lock().queue.first().map(|e| e.delta_ms)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<N>> {
        self.inner.lock().expect("pulse scheduler lock poisoned")
    }
}

impl<const N: usize> Inner<N> {
    /// Insert keeping relative order; ties fire in insertion order.
    fn queue_insert(&mut self, index: u8, duration_ms: u32) {
        let mut delta = duration_ms;
        let mut pos = self.queue.len();
        for (i, entry) in self.queue.iter_mut().enumerate() {
            if delta < entry.delta_ms {
                entry.delta_ms -= delta;
                pos = i;
                break;
            }
            delta -= entry.delta_ms;
        }
        // Cannot overflow: at most one entry per record slot.
        let _ = self.queue.insert(pos, QueueEntry { index, delta_ms: delta });
    }

    /// Remove an entry, folding its delta into the successor.
    fn queue_remove(&mut self, index: u8) {
        if let Some(pos) = self.queue.iter().position(|e| e.index == index) {
            let removed = self.queue.remove(pos);
            if let Some(next) = self.queue.get_mut(pos) {
                next.delta_ms += removed.delta_ms;
            }
        }
    }

    /// Advance time: consume `elapsed` from the head of the queue.
    fn queue_shift(&mut self, elapsed: u32) {
        let mut remaining = elapsed;
        for entry in self.queue.iter_mut() {
            if entry.delta_ms > remaining {
                entry.delta_ms -= remaining;
                break;
            }
            remaining -= entry.delta_ms;
            entry.delta_ms = 0;
        }
    }

    /// Return a pool record to the pool; claimed records only lose their
    /// schedule.
    fn release(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if slot.pool_owned {
            slot.free = true;
            slot.generation = slot.generation.wrapping_add(1);
        }
    }
}
