use xxhash_rust::xxh3::Xxh3;

/// Number of entries in a baked [`CurveLut`].
pub const CURVE_LUT_SIZE: usize = 256;

/// One control point of a [`ResponseCurve`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurveKey {
    /// Input position, normally in `[0,1]`.
    pub t: f32,
    /// Output value at `t`.
    pub value: f32,
}

/// Piecewise-linear response curve mapping `[0,1] -> [0,1]`.
///
/// Inputs outside the key range hold the first/last value. An empty curve is the identity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseCurve {
    /// Control points, sorted by `t` after sanitizing.
    pub keys: Vec<CurveKey>,
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl ResponseCurve {
    /// The identity ramp `(0,0) -> (1,1)`.
    pub fn linear() -> Self {
        Self {
            keys: vec![
                CurveKey { t: 0.0, value: 0.0 },
                CurveKey { t: 1.0, value: 1.0 },
            ],
        }
    }

    /// Drop non-finite keys and sort by position. Returns `true` if anything changed.
    pub fn sanitize(&mut self) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k.t.is_finite() && k.value.is_finite());
        let dropped = self.keys.len() != before;
        let sorted = self.keys.windows(2).all(|w| w[0].t <= w[1].t);
        if !sorted {
            self.keys.sort_by(|a, b| a.t.total_cmp(&b.t));
        }
        dropped || !sorted
    }

    /// Evaluate at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let Some(first) = self.keys.first() else {
            return t;
        };
        if t <= first.t {
            return first.value;
        }
        for w in self.keys.windows(2) {
            let (a, b) = (w[0], w[1]);
            if t <= b.t {
                let span = b.t - a.t;
                if span <= f32::EPSILON {
                    return b.value;
                }
                let s = (t - a.t) / span;
                return a.value + (b.value - a.value) * s;
            }
        }
        self.keys.last().map_or(t, |k| k.value)
    }

    /// Stable content hash, used to skip redundant re-bakes.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Xxh3::new();
        h.update(&(self.keys.len() as u64).to_le_bytes());
        for k in &self.keys {
            h.update(&k.t.to_bits().to_le_bytes());
            h.update(&k.value.to_bits().to_le_bytes());
        }
        h.digest()
    }
}

/// A [`ResponseCurve`] sampled at 256 evenly spaced inputs, values clamped to `[0,1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveLut {
    values: [f32; CURVE_LUT_SIZE],
}

impl Default for CurveLut {
    fn default() -> Self {
        Self::bake(&ResponseCurve::linear())
    }
}

impl CurveLut {
    /// Sample `curve` into a lookup table.
    pub fn bake(curve: &ResponseCurve) -> Self {
        let mut values = [0.0f32; CURVE_LUT_SIZE];
        for (i, v) in values.iter_mut().enumerate() {
            let t = i as f32 / (CURVE_LUT_SIZE - 1) as f32;
            let y = curve.evaluate(t);
            *v = if y.is_finite() { y.clamp(0.0, 1.0) } else { 0.0 };
        }
        Self { values }
    }

    /// All entries.
    pub fn values(&self) -> &[f32; CURVE_LUT_SIZE] {
        &self.values
    }

    /// Entry for an 8-bit input.
    pub fn lookup(&self, v: u8) -> f32 {
        self.values[usize::from(v)]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/curve.rs"]
mod tests;
