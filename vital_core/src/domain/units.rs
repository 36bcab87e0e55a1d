//! Measurement units and conversions to the metric base units (cm, kg).

use serde::{Deserialize, Serialize};

const CM_PER_INCH: f64 = 2.54;
const CM_PER_FOOT: f64 = 30.48;
const KG_PER_POUND: f64 = 0.453_592_37;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HeightUnit {
    Cm,
    Ft,
    In,
}

impl HeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::Ft => "ft",
            HeightUnit::In => "in",
        }
    }

    fn cm_per_unit(&self) -> f64 {
        match self {
            HeightUnit::Cm => 1.0,
            HeightUnit::Ft => CM_PER_FOOT,
            HeightUnit::In => CM_PER_INCH,
        }
    }

    pub fn to_cm(&self, value: f64) -> f64 {
        value * self.cm_per_unit()
    }

    pub fn from_cm(&self, cm: f64) -> f64 {
        cm / self.cm_per_unit()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }

    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lb => value * KG_PER_POUND,
        }
    }

    pub fn from_kg(&self, kg: f64) -> f64 {
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lb => kg / KG_PER_POUND,
        }
    }
}

/// Unit system preferred for display
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn height_unit(&self) -> HeightUnit {
        match self {
            UnitSystem::Metric => HeightUnit::Cm,
            UnitSystem::Imperial => HeightUnit::In,
        }
    }

    pub fn weight_unit(&self) -> WeightUnit {
        match self {
            UnitSystem::Metric => WeightUnit::Kg,
            UnitSystem::Imperial => WeightUnit::Lb,
        }
    }
}

string_enum_impls!(HeightUnit, "height unit", [HeightUnit::Cm, HeightUnit::Ft, HeightUnit::In]);
string_enum_impls!(WeightUnit, "weight unit", [WeightUnit::Kg, WeightUnit::Lb]);
string_enum_impls!(UnitSystem, "unit system", [UnitSystem::Metric, UnitSystem::Imperial]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_conversions() {
        assert!((HeightUnit::Ft.to_cm(5.0) - 152.4).abs() < 1e-9);
        assert!((HeightUnit::In.to_cm(60.0) - 152.4).abs() < 1e-9);
        assert!((HeightUnit::In.from_cm(152.4) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_conversions() {
        assert!((WeightUnit::Lb.to_kg(100.0) - 45.359237).abs() < 1e-9);
        assert!((WeightUnit::Lb.from_kg(WeightUnit::Lb.to_kg(154.0)) - 154.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("CM".parse::<HeightUnit>().unwrap(), HeightUnit::Cm);
        assert_eq!("lb".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
        assert_eq!("imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert!("stone".parse::<WeightUnit>().is_err());
    }
}
