//! Offline render: send one impulse through the reverb bus and print how
//! the tail decays. No audio device needed.
//!
//! Run with: cargo run --example impulse_response

use fxrack::console::{BusId, MixingConsole};

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 256;
const SECONDS: usize = 2;

fn main() {
    let mut console = MixingConsole::new(SAMPLE_RATE, BLOCK, 1);
    console.set_send_level(0, BusId::Reverb, 1.0);
    console.set_return_level(BusId::Reverb, BusId::Main, 1.0);
    {
        let reverb = console.reverb_mut();
        reverb.set_input_gain(0.55);
        reverb.set_diffusion(0.8);
        reverb.set_time(0.75);
        reverb.set_lp(0.7);
    }

    let mut impulse = vec![0.0; BLOCK];
    impulse[0] = 1.0;

    let blocks = SECONDS * SAMPLE_RATE as usize / BLOCK;
    let mut out_l = vec![0.0; BLOCK];
    let mut out_r = vec![0.0; BLOCK];
    let mut rendered = Vec::with_capacity(blocks * BLOCK);

    for b in 0..blocks {
        if b == 0 {
            console.set_input_buffer(0, &impulse);
        } else {
            console.clear_input_buffer(0);
        }
        console.process(&mut out_l, &mut out_r);
        rendered.extend_from_slice(&out_l);
    }

    println!("Rendered {} samples", rendered.len());

    let first_sound = rendered.iter().position(|s| s.abs() > 1e-4);
    match first_sound {
        Some(n) => println!(
            "First arrival: sample {n} ({:.1} ms)",
            n as f32 * 1000.0 / SAMPLE_RATE
        ),
        None => println!("No output produced"),
    }

    let window = SAMPLE_RATE as usize / 10;
    println!("RMS per 100 ms window:");
    for (i, chunk) in rendered.chunks(window).enumerate() {
        let rms = (chunk.iter().map(|s| s * s).sum::<f32>() / chunk.len() as f32).sqrt();
        let bar = "#".repeat((rms * 400.0) as usize);
        println!("  {:4} ms  {:.6}  {}", i * 100, rms, bar);
    }
}
