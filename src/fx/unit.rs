use crate::fx::StereoEffect;

/*
Effect Lifecycle Wrappers
=========================

Two uniform behaviors layered over any processor by composition; the
wrapped effect never knows it is wrapped.

FxUnit    enable flag + wet level. Bypassed (disabled or wet exactly 0)
          the dry input passes through untouched; active, the effect's
          output is crossfaded with the dry input. Used at insert points.

BusUnit   mute flag only. Muted produces silence; unmuted passes the raw
          effect output with no dry blend. Used on mixing console buses,
          where dry/wet balance is a routing decision, not the effect's.

Both reset the wrapped effect lazily, exactly once per transition into
the bypassed state, so a disabled effect does not re-clear its buffers
every sample and re-enabling starts from silence instead of a stale tail.
*/

/// Enable + wet/dry crossfade wrapper (insert-point flavor).
pub struct FxUnit<E> {
    inner: E,
    enabled: bool,
    wet: f32,
    is_reset: bool,
}

impl<E: StereoEffect> FxUnit<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            enabled: true,
            wet: 0.5,
            is_reset: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_wet(&mut self, wet: f32) {
        self.wet = wet.clamp(0.0, 1.0);
    }

    pub fn wet(&self) -> f32 {
        self.wet
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.inner
    }
}

impl<E: StereoEffect> StereoEffect for FxUnit<E> {
    fn reset(&mut self) {
        if !self.is_reset {
            self.inner.reset();
            self.is_reset = true;
        }
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        if !self.enabled || self.wet == 0.0 {
            self.reset();
            (in_l, in_r)
        } else {
            self.is_reset = false;
            let (l, r) = self.inner.process_sample(in_l, in_r);
            let dry = 1.0 - self.wet;
            (self.wet * l + dry * in_l, self.wet * r + dry * in_r)
        }
    }
}

/// Mute-only wrapper (mixing-console bus flavor).
pub struct BusUnit<E> {
    inner: E,
    muted: bool,
    is_reset: bool,
}

impl<E: StereoEffect> BusUnit<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            muted: false,
            is_reset: false,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.inner
    }
}

impl<E: StereoEffect> StereoEffect for BusUnit<E> {
    fn reset(&mut self) {
        if !self.is_reset {
            self.inner.reset();
            self.is_reset = true;
        }
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        if self.muted {
            self.reset();
            (0.0, 0.0)
        } else {
            self.is_reset = false;
            self.inner.process_sample(in_l, in_r)
        }
    }
}
