use thiserror::Error;

/// A single key on an animation curve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Keyframe {
        Keyframe {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    pub fn with_tangents(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Keyframe {
        Keyframe {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CurveParseError {
    #[error("curve key '{0}' needs at least a time and a value")]
    MissingValue(String),
    #[error("curve key '{key}' has an invalid number '{value}'")]
    InvalidNumber { key: String, value: String },
    #[error("curve key '{0}' has too many fields")]
    TooManyFields(String),
    #[error("curve has no keys")]
    Empty,
}

/// Keyframed curve evaluated with cubic Hermite interpolation between keys.
/// Outside of the key range the curve holds the first/last key value.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationCurve {
    keys: Vec<Keyframe>,
}

impl Default for AnimationCurve {
    fn default() -> Self {
        AnimationCurve::linear(0.0, 0.0, 1.0, 1.0)
    }
}

impl AnimationCurve {
    pub fn new(mut keys: Vec<Keyframe>) -> AnimationCurve {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        AnimationCurve { keys }
    }

    /// Straight line from (t0, v0) to (t1, v1)
    pub fn linear(t0: f32, v0: f32, t1: f32, v1: f32) -> AnimationCurve {
        if t0 == t1 {
            return AnimationCurve::new(vec![Keyframe::new(t0, v1)]);
        }

        let slope = (v1 - v0) / (t1 - t0);
        AnimationCurve::new(vec![
            Keyframe::with_tangents(t0, v0, 0.0, slope),
            Keyframe::with_tangents(t1, v1, slope, 0.0),
        ])
    }

    /// Smooth start & end (flat tangents on both keys)
    pub fn ease_in_out(t0: f32, v0: f32, t1: f32, v1: f32) -> AnimationCurve {
        if t0 == t1 {
            return AnimationCurve::new(vec![Keyframe::new(t0, v1)]);
        }

        AnimationCurve::new(vec![Keyframe::new(t0, v0), Keyframe::new(t1, v1)])
    }

    pub fn constant(t0: f32, t1: f32, value: f32) -> AnimationCurve {
        AnimationCurve::new(vec![Keyframe::new(t0, value), Keyframe::new(t1, value)])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Insert a key, keeping keys ordered by time. Returns the index of the new key.
    pub fn add_key(&mut self, key: Keyframe) -> usize {
        let idx = self.keys.partition_point(|k| k.time <= key.time);
        self.keys.insert(idx, key);
        idx
    }

    pub fn evaluate(&self, time: f32) -> f32 {
        let len = self.keys.len();
        if len == 0 {
            return 0.0;
        }

        // first key with time > t
        let next_idx = self.keys.partition_point(|k| k.time <= time);

        if next_idx == 0 {
            return self.keys[0].value;
        }
        if next_idx >= len {
            return self.keys[len - 1].value;
        }

        let k0 = &self.keys[next_idx - 1];
        let k1 = &self.keys[next_idx];
        let dt = k1.time - k0.time;

        if dt <= 0.0 {
            return k1.value;
        }

        let m0 = k0.out_tangent * dt;
        let m1 = k1.in_tangent * dt;

        // infinite tangents mean a stepped key
        if !m0.is_finite() || !m1.is_finite() {
            return k0.value;
        }

        let s = (time - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * k0.value + h10 * m0 + h01 * k1.value + h11 * m1
    }

    /// Parse a curve from config text.
    ///
    /// Accepts a preset name (`linear`, `easeinout`) or a list of keys separated by `;`,
    /// each key written as `time value [in_tangent out_tangent]`.
    pub fn parse(src: &str) -> Result<AnimationCurve, CurveParseError> {
        let src = src.trim();

        match src.to_ascii_lowercase().as_str() {
            "linear" => return Ok(AnimationCurve::linear(0.0, 0.0, 1.0, 1.0)),
            "easeinout" | "ease_in_out" => return Ok(AnimationCurve::ease_in_out(0.0, 0.0, 1.0, 1.0)),
            _ => {}
        }

        let mut keys = Vec::new();
        for key_src in src.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let fields = key_src
                .split_whitespace()
                .map(|v| {
                    v.parse::<f32>().map_err(|_| CurveParseError::InvalidNumber {
                        key: key_src.to_owned(),
                        value: v.to_owned(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let key = match fields.as_slice() {
                [time, value] => Keyframe::new(*time, *value),
                [time, value, tin, tout] => Keyframe::with_tangents(*time, *value, *tin, *tout),
                [_, _, _] | [_] | [] => return Err(CurveParseError::MissingValue(key_src.to_owned())),
                _ => return Err(CurveParseError::TooManyFields(key_src.to_owned())),
            };

            keys.push(key);
        }

        if keys.is_empty() {
            return Err(CurveParseError::Empty);
        }

        Ok(AnimationCurve::new(keys))
    }
}
