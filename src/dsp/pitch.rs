use once_cell::sync::Lazy;

// Split-table exponentials: ratio = 2^(semitones / 12) looked up as
// 2^(integer part / 12) * 2^(fraction / 12). Both tables cover 257 entries
// so the integer index never reads past the end after clamping. Built once
// at first use, immutable for the life of the process.

static PITCH_RATIO_HIGH: Lazy<[f32; 257]> = Lazy::new(|| {
    let mut table = [0.0f32; 257];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = ((i as f32 - 128.0) / 12.0).exp2();
    }
    table
});

static PITCH_RATIO_LOW: Lazy<[f32; 257]> = Lazy::new(|| {
    let mut table = [0.0f32; 257];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = (i as f32 / (12.0 * 256.0)).exp2();
    }
    table
});

/// Playback-rate ratio for a transposition in semitones.
///
/// `0.0` maps to `1.0`, `+12.0` to `2.0`, `-12.0` to `0.5`. Input is
/// clamped to the table range of +/-128 semitones.
pub fn semitone_to_ratio(semitones: f32) -> f32 {
    let pitch = (semitones.clamp(-128.0, 128.0)) + 128.0;
    let integral = pitch as usize;
    let fractional = pitch - integral as f32;
    PITCH_RATIO_HIGH[integral] * PITCH_RATIO_LOW[(fractional * 256.0) as usize]
}
