use crate::console::BusId;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Control change for the console, pushed from a UI/MIDI thread and drained
/// on the audio thread at block boundaries.
///
/// Every variant is small and `Copy`; applying one is a handful of stores,
/// safe inside the realtime callback.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    ChannelLevel { input: usize, level: f32 },
    ChannelPan { input: usize, pan: f32 },
    SendLevel { input: usize, bus: BusId, level: f32 },
    ReturnLevel { source: BusId, destination: BusId, level: f32 },
    BusMuted { bus: BusId, muted: bool },
    TubeDrive(f32),
    ChorusRate(f32),
    ChorusDepth(f32),
    DelayTimeLeft(f32),
    DelayTimeRight(f32),
    DelayFeedback(f32),
    DelayTone(f32),
    ReverbTime(f32),
    ReverbDiffusion(f32),
    ShimmerTexture(f32),
    ShimmerCutoff(f32),
}

/// Source of pending commands; lets tests drive the console without a
/// real queue.
pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ConsoleCommand>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ConsoleCommand> {
    fn pop(&mut self) -> Option<ConsoleCommand> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<ConsoleCommand> {
    fn pop(&mut self) -> Option<ConsoleCommand> {
        self.pop_front()
    }
}
