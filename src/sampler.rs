//! Keyed value streams and sampling between keys.

use glam::{Quat, Vec3, Vec4};

use crate::scene::Interpolation;

pub trait Interpolate: Copy {
    fn lerp(a: Self, b: Self, t: f32) -> Self;

    /// Cubic Hermite between `v0` and `v1` with tangents `b0` (out of `v0`)
    /// and `a1` (into `v1`), scaled by the key spacing `dt`.
    fn hermite(v0: Self, b0: Self, v1: Self, a1: Self, t: f32, dt: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }

    fn hermite(v0: Self, b0: Self, v1: Self, a1: Self, t: f32, dt: f32) -> Self {
        let [h00, h10, h01, h11] = hermite_basis(t);
        v0 * h00 + b0 * (h10 * dt) + v1 * h01 + a1 * (h11 * dt)
    }
}

impl Interpolate for Quat {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.slerp(b, t).normalize()
    }

    fn hermite(v0: Self, b0: Self, v1: Self, a1: Self, t: f32, dt: f32) -> Self {
        let [h00, h10, h01, h11] = hermite_basis(t);
        let v = Vec4::from(v0) * h00
            + Vec4::from(b0) * (h10 * dt)
            + Vec4::from(v1) * h01
            + Vec4::from(a1) * (h11 * dt);
        Quat::from_vec4(v).normalize()
    }
}

fn hermite_basis(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    ]
}

/// A validated view over one sampler: `times.len()` keys, and either one
/// value per key or `(in_tangent, value, out_tangent)` per key for cubic
/// splines.
#[derive(Clone, Copy, Debug)]
pub struct Track<'a, T> {
    times: &'a [f32],
    values: &'a [T],
    interpolation: Interpolation,
}

impl<'a, T: Interpolate> Track<'a, T> {
    /// Returns `None` when the value count does not fit the key count.
    pub fn new(times: &'a [f32], values: &'a [T], interpolation: Interpolation) -> Option<Self> {
        if values.len() != expected_output_count(times.len(), interpolation) {
            return None;
        }
        Some(Self {
            times,
            values,
            interpolation,
        })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time and value of key `index`, as authored.
    pub fn key(&self, index: usize) -> (f32, T) {
        (self.times[index], self.value(index))
    }

    fn value(&self, index: usize) -> T {
        match self.interpolation {
            Interpolation::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    /// Value at `time`, clamped to the first and last key. Must not be empty.
    pub fn sample(&self, time: f32) -> T {
        let after = self.times.partition_point(|&t| t <= time);
        if after == 0 {
            return self.value(0);
        }
        if after == self.times.len() {
            return self.value(self.times.len() - 1);
        }
        let before = after - 1;

        let t0 = self.times[before];
        let t1 = self.times[after];
        let dt = t1 - t0;
        let t = (time - t0) / dt;

        match self.interpolation {
            Interpolation::Step => self.value(before),
            Interpolation::Linear => T::lerp(self.value(before), self.value(after), t),
            Interpolation::CubicSpline => T::hermite(
                self.value(before),
                self.values[before * 3 + 2],
                self.value(after),
                self.values[after * 3],
                t,
                dt,
            ),
        }
    }
}

pub fn expected_output_count(inputs: usize, interpolation: Interpolation) -> usize {
    match interpolation {
        Interpolation::CubicSpline => inputs * 3,
        _ => inputs,
    }
}
