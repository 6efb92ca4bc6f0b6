/// Easing curves mapping normalized progress onto `[0, 1]`.
///
/// Serialized names follow the editor's camelCase vocabulary (`easeIn`, `easeInOutCubic`, ...).
/// Deserializing an unknown name yields [`Ease::Linear`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String")]
pub enum Ease {
    #[default]
    #[serde(rename = "linear")]
    Linear,
    /// Quadratic ease-in.
    #[serde(rename = "easeIn")]
    InQuad,
    /// Quadratic ease-out.
    #[serde(rename = "easeOut")]
    OutQuad,
    /// Quadratic ease-in/out.
    #[serde(rename = "easeInOut")]
    InOutQuad,
    #[serde(rename = "easeInCubic")]
    InCubic,
    #[serde(rename = "easeOutCubic")]
    OutCubic,
    #[serde(rename = "easeInOutCubic")]
    InOutCubic,
    /// Four-segment bounce settling at 1.
    #[serde(rename = "bounce")]
    Bounce,
}

impl Ease {
    pub const ALL: [Ease; 8] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::Bounce,
    ];

    /// Look up a curve by name; unknown names fall back to [`Ease::Linear`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "easeIn" => Self::InQuad,
            "easeOut" => Self::OutQuad,
            "easeInOut" => Self::InOutQuad,
            "easeInCubic" => Self::InCubic,
            "easeOutCubic" => Self::OutCubic,
            "easeInOutCubic" => Self::InOutCubic,
            "bounce" => Self::Bounce,
            _ => Self::Linear,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InQuad => "easeIn",
            Self::OutQuad => "easeOut",
            Self::InOutQuad => "easeInOut",
            Self::InCubic => "easeInCubic",
            Self::OutCubic => "easeOutCubic",
            Self::InOutCubic => "easeInOutCubic",
            Self::Bounce => "bounce",
        }
    }

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::Bounce => bounce_out(t),
        }
    }
}

impl From<String> for Ease {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
