//! The mixing console: a fixed send/return graph over one instance of each
//! effect.
//!
//! Sources are `N` external inputs plus the return of every non-main bus.
//! Each bus owns one effect behind a mute wrapper and an entry in the
//! send-level matrix for every source. Per sample, buses run in a fixed
//! order; each bus's input is the weighted sum of all current source
//! slots, and its output overwrites its return slot immediately. A bus
//! therefore hears the output of buses ordered before it in the same
//! sample, and of buses ordered after it from the previous sample. That
//! one-sample asymmetry is part of the console's observable behavior and
//! is kept stable.
//!
//! The last bus is the main output; its effect is the identity, and its
//! weighted input sum is the console's stereo result.

/// Control-change plumbing from non-realtime threads.
pub mod command;

pub use command::{ConsoleCommand, MessageReceiver};

use crate::fx::chorus::Chorus;
use crate::fx::dry::Dry;
use crate::fx::flanger::Flanger;
use crate::fx::orbitone::Orbitone;
use crate::fx::phaser::Phaser;
use crate::fx::reverberator::Reverberator;
use crate::fx::shimmer::Shimmer;
use crate::fx::tape_delay::TapeDelay;
use crate::fx::tube::Tube;
use crate::fx::{BusUnit, StereoEffect};
use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The console's buses, in processing order. `Main` is always last.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusId {
    Tube,
    Chorus,
    Flanger,
    Orbitone,
    Phaser,
    Delay,
    Reverb,
    Shimmer,
    Main,
}

impl BusId {
    pub const COUNT: usize = 9;

    pub const ALL: [BusId; Self::COUNT] = [
        BusId::Tube,
        BusId::Chorus,
        BusId::Flanger,
        BusId::Orbitone,
        BusId::Phaser,
        BusId::Delay,
        BusId::Reverb,
        BusId::Shimmer,
        BusId::Main,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BusId::Tube => "Tube",
            BusId::Chorus => "Chorus",
            BusId::Flanger => "Flanger",
            BusId::Orbitone => "Orbitone",
            BusId::Phaser => "Phaser",
            BusId::Delay => "Delay",
            BusId::Reverb => "Reverb",
            BusId::Shimmer => "Shimmer",
            BusId::Main => "Main",
        }
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBusError(pub String);

impl fmt::Display for UnknownBusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown bus name: {}", self.0)
    }
}

impl std::error::Error for UnknownBusError {}

impl FromStr for BusId {
    type Err = UnknownBusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusId::ALL
            .iter()
            .copied()
            .find(|bus| bus.name() == s)
            .ok_or_else(|| UnknownBusError(s.to_string()))
    }
}

/// Multi-bus send/return mixer producing the final stereo output.
///
/// All storage is allocated at construction for the configured block size
/// and input count; processing allocates nothing.
pub struct MixingConsole {
    block_size: usize,
    num_inputs: usize,

    channel_level: Vec<f32>,
    pan: Vec<f32>,
    pan_gain: [Vec<f32>; 2],

    // Per-input staging for block processing, already panned to stereo.
    staging: [Vec<Vec<f32>>; 2],

    // Send levels, row per bus, column per source (inputs then returns).
    levels: Vec<f32>,
    // Current sample of every source, per stereo channel.
    current: [Vec<f32>; 2],

    tube: BusUnit<Tube>,
    chorus: BusUnit<Chorus>,
    flanger: BusUnit<Flanger>,
    orbitone: BusUnit<Orbitone>,
    phaser: BusUnit<Phaser>,
    delay: BusUnit<TapeDelay>,
    reverb: BusUnit<Reverberator>,
    shimmer: BusUnit<Shimmer>,
    main: BusUnit<Dry>,
}

impl MixingConsole {
    pub fn new(sample_rate: f32, block_size: usize, num_inputs: usize) -> Self {
        assert!(block_size > 0 && block_size <= crate::MAX_BLOCK_SIZE);
        assert!(num_inputs > 0);

        let sources = num_inputs + BusId::COUNT - 1;
        let mut console = Self {
            block_size,
            num_inputs,
            channel_level: vec![1.0; num_inputs],
            pan: vec![0.5; num_inputs],
            pan_gain: [vec![0.0; num_inputs], vec![0.0; num_inputs]],
            staging: [
                vec![vec![0.0; block_size]; num_inputs],
                vec![vec![0.0; block_size]; num_inputs],
            ],
            levels: vec![0.0; BusId::COUNT * sources],
            current: [vec![0.0; sources], vec![0.0; sources]],
            tube: BusUnit::new(Tube::new(sample_rate)),
            chorus: BusUnit::new(Chorus::new(sample_rate)),
            flanger: BusUnit::new(Flanger::new(sample_rate)),
            orbitone: BusUnit::new(Orbitone::new(sample_rate)),
            phaser: BusUnit::new(Phaser::new(sample_rate)),
            delay: BusUnit::new(TapeDelay::new(sample_rate)),
            reverb: BusUnit::new(Reverberator::new(sample_rate)),
            shimmer: BusUnit::new(Shimmer::new(sample_rate)),
            main: BusUnit::new(Dry::new(sample_rate)),
        };
        for input in 0..num_inputs {
            console.update_pan(input);
        }
        console
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn source_count(&self) -> usize {
        self.num_inputs + BusId::COUNT - 1
    }

    // Send section

    pub fn set_channel_level(&mut self, input: usize, level: f32) {
        let level = level.clamp(0.0, 1.0);
        if self.channel_level[input] != level {
            self.channel_level[input] = level;
            self.update_pan(input);
        }
    }

    pub fn channel_level(&self, input: usize) -> f32 {
        self.channel_level[input]
    }

    /// Equal-power pan, 0 = full left, 1 = full right.
    pub fn set_pan(&mut self, input: usize, pan: f32) {
        let pan = pan.clamp(0.0, 1.0);
        if self.pan[input] != pan {
            self.pan[input] = pan;
            self.update_pan(input);
        }
    }

    pub fn pan(&self, input: usize) -> f32 {
        self.pan[input]
    }

    fn update_pan(&mut self, input: usize) {
        let angle = self.pan[input] * FRAC_PI_2;
        self.pan_gain[0][input] = angle.cos() * self.channel_level[input];
        self.pan_gain[1][input] = angle.sin() * self.channel_level[input];
    }

    pub fn pan_gains(&self, input: usize) -> (f32, f32) {
        (self.pan_gain[0][input], self.pan_gain[1][input])
    }

    pub fn set_send_level(&mut self, input: usize, bus: BusId, level: f32) {
        assert!(input < self.num_inputs);
        self.set_level(input, bus, level);
    }

    pub fn send_level(&self, input: usize, bus: BusId) -> f32 {
        assert!(input < self.num_inputs);
        self.levels[bus.index() * self.source_count() + input]
    }

    // Return section

    /// Route a bus's return into another bus. Routing a bus into itself is
    /// a no-op: self-feedback is the one structurally forbidden edge.
    pub fn set_return_level(&mut self, source: BusId, destination: BusId, level: f32) {
        if source == destination || source == BusId::Main {
            return;
        }
        self.set_level(self.num_inputs + source.index(), destination, level);
    }

    pub fn return_level(&self, source: BusId, destination: BusId) -> f32 {
        if source == destination || source == BusId::Main {
            return 0.0;
        }
        self.levels[destination.index() * self.source_count() + self.num_inputs + source.index()]
    }

    fn set_level(&mut self, source: usize, bus: BusId, level: f32) {
        let sources = self.source_count();
        assert!(source < sources);
        self.levels[bus.index() * sources + source] = level.clamp(0.0, 1.0);
    }

    // Input section

    /// Set one input's current sample directly (per-sample driving).
    pub fn set_input_sample(&mut self, input: usize, left: f32, right: f32) {
        assert!(input < self.num_inputs);
        self.current[0][input] = left;
        self.current[1][input] = right;
    }

    /// Stage a mono block for one input; the channel's level and pan are
    /// applied here.
    pub fn set_input_buffer(&mut self, input: usize, samples: &[f32]) {
        assert!(input < self.num_inputs);
        assert_eq!(samples.len(), self.block_size);
        let (gain_l, gain_r) = (self.pan_gain[0][input], self.pan_gain[1][input]);
        for (slot, &sample) in self.staging[0][input].iter_mut().zip(samples) {
            *slot = sample * gain_l;
        }
        for (slot, &sample) in self.staging[1][input].iter_mut().zip(samples) {
            *slot = sample * gain_r;
        }
    }

    /// Stage an already-stereo block for one input, bypassing pan.
    pub fn set_input_buffers(&mut self, input: usize, left: &[f32], right: &[f32]) {
        assert!(input < self.num_inputs);
        assert_eq!(left.len(), self.block_size);
        assert_eq!(right.len(), self.block_size);
        self.staging[0][input].copy_from_slice(left);
        self.staging[1][input].copy_from_slice(right);
    }

    /// Silence one input's staged block.
    pub fn clear_input_buffer(&mut self, input: usize) {
        assert!(input < self.num_inputs);
        self.staging[0][input].fill(0.0);
        self.staging[1][input].fill(0.0);
    }

    fn set_return_sample(&mut self, bus: BusId, left: f32, right: f32) {
        let slot = self.num_inputs + bus.index();
        self.current[0][slot] = left;
        self.current[1][slot] = right;
    }

    fn weighted_input(&self, bus: BusId) -> (f32, f32) {
        let sources = self.source_count();
        let row = &self.levels[bus.index() * sources..(bus.index() + 1) * sources];
        let mut left = 0.0;
        let mut right = 0.0;
        for (i, &weight) in row.iter().enumerate() {
            left += weight * self.current[0][i];
            right += weight * self.current[1][i];
        }
        (left, right)
    }

    // Processing

    /// Run every bus once for the current source samples and return the
    /// main stereo output.
    pub fn process_sample(&mut self) -> (f32, f32) {
        let mut out = (0.0, 0.0);
        for bus in BusId::ALL {
            let (in_l, in_r) = self.weighted_input(bus);
            let (out_l, out_r) = match bus {
                BusId::Tube => self.tube.process_sample(in_l, in_r),
                BusId::Chorus => self.chorus.process_sample(in_l, in_r),
                BusId::Flanger => self.flanger.process_sample(in_l, in_r),
                BusId::Orbitone => self.orbitone.process_sample(in_l, in_r),
                BusId::Phaser => self.phaser.process_sample(in_l, in_r),
                BusId::Delay => self.delay.process_sample(in_l, in_r),
                BusId::Reverb => self.reverb.process_sample(in_l, in_r),
                BusId::Shimmer => self.shimmer.process_sample(in_l, in_r),
                BusId::Main => self.main.process_sample(in_l, in_r),
            };
            if bus == BusId::Main {
                out = (out_l, out_r);
            } else {
                // Published immediately: buses after this one see it this
                // sample, buses before it only next sample.
                self.set_return_sample(bus, out_l, out_r);
            }
        }
        out
    }

    /// Process one block from the staged input buffers into the caller's
    /// output buffers.
    pub fn process(&mut self, out_l: &mut [f32], out_r: &mut [f32]) {
        assert_eq!(out_l.len(), self.block_size);
        assert_eq!(out_r.len(), self.block_size);

        for s in 0..self.block_size {
            for input in 0..self.num_inputs {
                self.current[0][input] = self.staging[0][input][s];
                self.current[1][input] = self.staging[1][input][s];
            }
            let (l, r) = self.process_sample();
            out_l[s] = l;
            out_r[s] = r;
        }
    }

    /// Clear staging, return slots, and every bus effect.
    pub fn reset(&mut self) {
        for input in 0..self.num_inputs {
            self.clear_input_buffer(input);
        }
        for channel in &mut self.current {
            channel.fill(0.0);
        }
        self.tube.reset();
        self.chorus.reset();
        self.flanger.reset();
        self.orbitone.reset();
        self.phaser.reset();
        self.delay.reset();
        self.reverb.reset();
        self.shimmer.reset();
        self.main.reset();
    }

    // Bus access

    pub fn set_bus_muted(&mut self, bus: BusId, muted: bool) {
        match bus {
            BusId::Tube => self.tube.set_muted(muted),
            BusId::Chorus => self.chorus.set_muted(muted),
            BusId::Flanger => self.flanger.set_muted(muted),
            BusId::Orbitone => self.orbitone.set_muted(muted),
            BusId::Phaser => self.phaser.set_muted(muted),
            BusId::Delay => self.delay.set_muted(muted),
            BusId::Reverb => self.reverb.set_muted(muted),
            BusId::Shimmer => self.shimmer.set_muted(muted),
            BusId::Main => self.main.set_muted(muted),
        }
    }

    pub fn is_bus_muted(&self, bus: BusId) -> bool {
        match bus {
            BusId::Tube => self.tube.is_muted(),
            BusId::Chorus => self.chorus.is_muted(),
            BusId::Flanger => self.flanger.is_muted(),
            BusId::Orbitone => self.orbitone.is_muted(),
            BusId::Phaser => self.phaser.is_muted(),
            BusId::Delay => self.delay.is_muted(),
            BusId::Reverb => self.reverb.is_muted(),
            BusId::Shimmer => self.shimmer.is_muted(),
            BusId::Main => self.main.is_muted(),
        }
    }

    pub fn tube_mut(&mut self) -> &mut Tube {
        self.tube.inner_mut()
    }

    pub fn chorus_mut(&mut self) -> &mut Chorus {
        self.chorus.inner_mut()
    }

    pub fn flanger_mut(&mut self) -> &mut Flanger {
        self.flanger.inner_mut()
    }

    pub fn orbitone_mut(&mut self) -> &mut Orbitone {
        self.orbitone.inner_mut()
    }

    pub fn phaser_mut(&mut self) -> &mut Phaser {
        self.phaser.inner_mut()
    }

    pub fn delay_mut(&mut self) -> &mut TapeDelay {
        self.delay.inner_mut()
    }

    pub fn reverb_mut(&mut self) -> &mut Reverberator {
        self.reverb.inner_mut()
    }

    pub fn shimmer_mut(&mut self) -> &mut Shimmer {
        self.shimmer.inner_mut()
    }

    // Control plumbing

    pub fn apply(&mut self, command: ConsoleCommand) {
        match command {
            ConsoleCommand::ChannelLevel { input, level } => {
                if input < self.num_inputs {
                    self.set_channel_level(input, level);
                }
            }
            ConsoleCommand::ChannelPan { input, pan } => {
                if input < self.num_inputs {
                    self.set_pan(input, pan);
                }
            }
            ConsoleCommand::SendLevel { input, bus, level } => {
                if input < self.num_inputs {
                    self.set_send_level(input, bus, level);
                }
            }
            ConsoleCommand::ReturnLevel {
                source,
                destination,
                level,
            } => self.set_return_level(source, destination, level),
            ConsoleCommand::BusMuted { bus, muted } => self.set_bus_muted(bus, muted),
            ConsoleCommand::TubeDrive(drive) => self.tube_mut().set_drive(drive),
            ConsoleCommand::ChorusRate(rate) => self.chorus_mut().set_rate(rate),
            ConsoleCommand::ChorusDepth(depth) => self.chorus_mut().set_depth(depth),
            ConsoleCommand::DelayTimeLeft(time) => self.delay_mut().set_delay_time_left(time),
            ConsoleCommand::DelayTimeRight(time) => self.delay_mut().set_delay_time_right(time),
            ConsoleCommand::DelayFeedback(feedback) => self.delay_mut().set_feedback(feedback),
            ConsoleCommand::DelayTone(tone) => self.delay_mut().set_tone(tone),
            ConsoleCommand::ReverbTime(time) => self.reverb_mut().set_time(time),
            ConsoleCommand::ReverbDiffusion(diffusion) => {
                self.reverb_mut().set_diffusion(diffusion)
            }
            ConsoleCommand::ShimmerTexture(texture) => self.shimmer_mut().set_texture(texture),
            ConsoleCommand::ShimmerCutoff(cutoff) => self.shimmer_mut().set_cutoff(cutoff),
        }
    }

    /// Drain and apply pending control changes; call at block boundaries.
    pub fn drain_commands<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(command) = rx.pop() {
            self.apply(command);
        }
    }
}
