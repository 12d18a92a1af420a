//! Control-value hand-over between the bus transport and the control loop.
//!
//! The transport task decodes BMS messages; the control-loop task owns the
//! [`BmsMaster`].  The queue keeps the arbiter single-writer: the transport
//! only ever enqueues, and the loop applies updates itself before ticking.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌────────────────────┐
//! │ CAN / serial │────▶│  ControlQueue    │────▶│  Control loop      │
//! │ transport    │     │  (lock-free SPSC)│     │  drain → update()  │
//! └──────────────┘     └──────────────────┘     └────────────────────┘
//! ```

use heapless::spsc::{Consumer, Producer, Queue};
use log::warn;

use crate::app::commands::ControlUpdate;
use crate::app::ports::{EventSink, TimePort};
use crate::bms::BmsMaster;
use crate::error::{CommsError, Result};

/// Default queue size.  One slot is reserved by the ring buffer, so this
/// holds 15 pending updates, far more than a BMS sends per second.
pub const CONTROL_QUEUE_CAP: usize = 16;

/// Fixed-capacity SPSC queue of control updates.
pub struct ControlQueue<const N: usize = CONTROL_QUEUE_CAP> {
    queue: Queue<ControlUpdate, N>,
}

impl<const N: usize> Default for ControlQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ControlQueue<N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    /// Split into the transport half and the control-loop half.
    pub fn split(&mut self) -> (ControlProducer<'_, N>, ControlConsumer<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (ControlProducer(producer), ControlConsumer(consumer))
    }
}

/// Transport side.  Lock-free, safe to use from another task.
pub struct ControlProducer<'a, const N: usize>(Producer<'a, ControlUpdate, N>);

impl<const N: usize> ControlProducer<'_, N> {
    /// Enqueue an update.  When the queue is full the update is dropped.
    pub fn push(&mut self, update: ControlUpdate) -> Result<()> {
        self.0.enqueue(update).map_err(|dropped| {
            warn!("Control queue full, dropping {:?}", dropped);
            CommsError::QueueFull.into()
        })
    }
}

/// Control-loop side.
pub struct ControlConsumer<'a, const N: usize>(Consumer<'a, ControlUpdate, N>);

impl<const N: usize> ControlConsumer<'_, N> {
    pub fn pop(&mut self) -> Option<ControlUpdate> {
        self.0.dequeue()
    }

    /// Number of pending updates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply every pending update to `master` in FIFO order.
    /// Returns how many were applied.
    pub fn drain_into(
        &mut self,
        master: &mut BmsMaster,
        clock: &impl TimePort,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut applied = 0;
        while let Some(update) = self.pop() {
            master.control_updated(update, clock, sink);
            applied += 1;
        }
        applied
    }
}
