use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One row of a cargo manifest. `base_area` and `volume` are taken from the
/// data source as given and never recomputed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CargoBox {
    #[serde(
        rename = "Box Type",
        alias = "box_type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub box_type: Option<String>,
    #[serde(rename = "Length", alias = "length")]
    pub length: f64,
    #[serde(rename = "Width", alias = "width")]
    pub width: f64,
    #[serde(rename = "Height", alias = "height")]
    pub height: f64,
    #[serde(rename = "Base_area", alias = "base_area")]
    pub base_area: f64,
    #[serde(rename = "Volume", alias = "volume")]
    pub volume: f64,
    #[serde(rename = "Weight", alias = "weight")]
    pub weight: f64,
}

impl CargoBox {
    pub fn new(length: f64, width: f64, height: f64, weight: f64) -> Self {
        Self {
            box_type: None,
            length,
            width,
            height,
            base_area: length * width,
            volume: length * width * height,
            weight,
        }
    }

    pub fn with_box_type(mut self, box_type: impl Into<String>) -> Self {
        self.box_type = Some(box_type.into());
        self
    }

    pub fn dimensions(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }

    /// Volume from the three sides, independent of the `volume` column.
    pub fn dimension_volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Largest side and its axis. Ties go to the lowest axis.
    pub fn base_dimension(&self) -> (usize, f64) {
        let dims = self.dimensions();
        let mut axis = 0;
        for i in 1..3 {
            if dims[i] > dims[axis] {
                axis = i;
            }
        }
        (axis, dims[axis])
    }

    /// Every side finite and above zero. NaN fails.
    pub fn has_positive_dimensions(&self) -> bool {
        self.dimensions().iter().all(|&d| d.is_finite() && d > 0.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Container {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Container {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    pub fn dimensions(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Sides and volume finite, sides above zero.
    pub fn has_positive_dimensions(&self) -> bool {
        self.dimensions().iter().all(|&d| d.is_finite() && d > 0.0) && self.volume().is_finite()
    }

    /// Exact match on all three axes, in axis order.
    pub fn is_filled_by(&self, cargo: &CargoBox) -> bool {
        self.dimensions() == cargo.dimensions()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.length, self.width, self.height)
    }
}

impl FromStr for Container {
    type Err = String;

    /// Parses `L,W,H` (an `x` separator is accepted too).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(|c: char| c == ',' || c == 'x')
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|e| format!("Invalid container dimension '{}': {}", p.trim(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [length, width, height] => Ok(Container::new(*length, *width, *height)),
            _ => Err(format!(
                "Expected 3 container dimensions, got {}",
                parts.len()
            )),
        }
    }
}
