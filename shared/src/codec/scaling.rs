//! Numeric scaling parameters learned at training time

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::features::NumericField;

/// Per-field transform. Parameters come from the training run and are never
/// refit at serving time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleTransform {
    /// `(x - min) / (max - min)`
    MinMax { min: f64, max: f64 },
    /// `(x - mean) / std`
    Standard { mean: f64, std: f64 },
}

impl ScaleTransform {
    /// Apply the transform. A zero range or zero deviation divides by 1,
    /// matching how the training pipeline handles constant columns.
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            ScaleTransform::MinMax { min, max } => {
                let range = max - min;
                let range = if range == 0.0 { 1.0 } else { range };
                (value - min) / range
            }
            ScaleTransform::Standard { mean, std } => {
                let std = if std == 0.0 { 1.0 } else { std };
                (value - mean) / std
            }
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            ScaleTransform::MinMax { min, max } => min.is_finite() && max.is_finite(),
            ScaleTransform::Standard { mean, std } => mean.is_finite() && std.is_finite(),
        }
    }
}

/// Scaling parameters for the numeric features
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ScalingParameters {
    transforms: HashMap<NumericField, ScaleTransform>,
}

impl ScalingParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: NumericField, transform: ScaleTransform) -> Self {
        self.transforms.insert(field, transform);
        self
    }

    pub fn insert(&mut self, field: NumericField, transform: ScaleTransform) {
        self.transforms.insert(field, transform);
    }

    pub fn get(&self, field: NumericField) -> Option<&ScaleTransform> {
        self.transforms.get(&field)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max() {
        let t = ScaleTransform::MinMax { min: 4.0, max: 8.0 };
        assert_eq!(t.apply(4.0), 0.0);
        assert_eq!(t.apply(6.0), 0.5);
        assert_eq!(t.apply(8.0), 1.0);
        // values outside the training range are not clipped
        assert_eq!(t.apply(10.0), 1.5);
    }

    #[test]
    fn test_min_max_constant_column() {
        let t = ScaleTransform::MinMax { min: 3.0, max: 3.0 };
        assert_eq!(t.apply(5.0), 2.0);
    }

    #[test]
    fn test_standard() {
        let t = ScaleTransform::Standard { mean: 10.0, std: 2.0 };
        assert_eq!(t.apply(14.0), 2.0);
        let constant = ScaleTransform::Standard { mean: 1.0, std: 0.0 };
        assert_eq!(constant.apply(3.0), 2.0);
    }

    #[test]
    fn test_transform_json_shape() {
        let t: ScaleTransform =
            serde_json::from_str(r#"{"kind":"min_max","min":0.0,"max":40.0}"#).unwrap();
        assert_eq!(t, ScaleTransform::MinMax { min: 0.0, max: 40.0 });
    }
}
