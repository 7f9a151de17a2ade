//! Live demo: a slowly plucked tone routed through chorus, delay and
//! reverb buses, played through the default output device.
//!
//! Run with: cargo run --example live_console --features cpal-demo

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use fxrack::console::{BusId, MixingConsole};

const BLOCK: usize = 256;

struct Source {
    sample_rate: f32,
    phase: f32,
    envelope: f32,
    countdown: usize,
    note: usize,
}

impl Source {
    const NOTES: [f32; 4] = [220.0, 261.63, 329.63, 392.0];

    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            envelope: 0.0,
            countdown: 0,
            note: 0,
        }
    }

    fn fill(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            if self.countdown == 0 {
                // Pluck the next note every ~0.75 s.
                self.countdown = (0.75 * self.sample_rate) as usize;
                self.envelope = 0.8;
                self.note = (self.note + 1) % Self::NOTES.len();
            }
            self.countdown -= 1;
            self.envelope *= 0.9996;

            self.phase += std::f32::consts::TAU * Self::NOTES[self.note] / self.sample_rate;
            if self.phase >= std::f32::consts::TAU {
                self.phase -= std::f32::consts::TAU;
            }
            *sample = self.phase.sin() * self.envelope;
        }
    }
}

fn main() {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .expect("no default output device");
    let config = device
        .default_output_config()
        .expect("no default output config");
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    println!(
        "Playing on {:?} at {} Hz",
        device.name().unwrap_or_default(),
        sample_rate
    );

    let mut console = MixingConsole::new(sample_rate, BLOCK, 1);
    console.set_send_level(0, BusId::Main, 0.8);
    console.set_send_level(0, BusId::Chorus, 0.6);
    console.set_send_level(0, BusId::Delay, 0.4);
    console.set_send_level(0, BusId::Reverb, 0.5);
    console.set_return_level(BusId::Chorus, BusId::Main, 0.6);
    console.set_return_level(BusId::Delay, BusId::Main, 0.5);
    console.set_return_level(BusId::Delay, BusId::Reverb, 0.3);
    console.set_return_level(BusId::Reverb, BusId::Main, 0.7);
    console.delay_mut().set_delay_time_left(0.35);
    console.delay_mut().set_delay_time_right(0.45);
    console.delay_mut().set_feedback(0.4);

    let mut source = Source::new(sample_rate);
    let mut mono = vec![0.0f32; BLOCK];
    let mut out_l = vec![0.0f32; BLOCK];
    let mut out_r = vec![0.0f32; BLOCK];
    let mut cursor = BLOCK; // force a render on the first callback

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    if cursor == BLOCK {
                        source.fill(&mut mono);
                        console.set_input_buffer(0, &mono);
                        console.process(&mut out_l, &mut out_r);
                        cursor = 0;
                    }
                    let (l, r) = (out_l[cursor], out_r[cursor]);
                    cursor += 1;
                    match frame.len() {
                        1 => frame[0] = 0.5 * (l + r),
                        _ => {
                            frame[0] = l;
                            frame[1] = r;
                            for extra in frame.iter_mut().skip(2) {
                                *extra = 0.0;
                            }
                        }
                    }
                }
            },
            |err| eprintln!("stream error: {err}"),
            None,
        )
        .expect("failed to build output stream");

    stream.play().expect("failed to start stream");
    println!("Press Ctrl-C to stop.");
    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}
