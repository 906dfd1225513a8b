// Metric catalog - Units, default ranges and colors per metric code
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display language for metric labels and axis captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

/// Metric identifier. Codes outside the known set are kept verbatim in
/// `Unknown` so that foreign data still flows through layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricCode {
    Temperature,
    Humidity,
    Co2,
    Power,
    Occupancy,
    Illuminance,
    Noise,
    Pressure,
    HvacStatus,
    SetTemperature,
    Unknown(String),
}

/// Fixed palette used when a series has neither a custom nor a metric color.
pub const PALETTE: [&str; 10] = [
    "#3b82f6", // blue
    "#10b981", // emerald
    "#f59e0b", // amber
    "#8b5cf6", // purple
    "#ef4444", // red
    "#06b6d4", // cyan
    "#ec4899", // pink
    "#84cc16", // lime
    "#f97316", // orange
    "#14b8a6", // teal
];

/// Swatches offered by a color picker.
pub const PRESET_COLORS: [&str; 20] = [
    "#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#ef4444", "#06b6d4", "#ec4899", "#84cc16",
    "#f97316", "#14b8a6", "#6366f1", "#a855f7", "#f43f5e", "#0ea5e9", "#eab308", "#78716c",
    "#64748b", "#fbbf24", "#34d399", "#c084fc",
];

pub const FALLBACK_RANGE: (f64, f64) = (0.0, 100.0);

#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub code: MetricCode,
    pub unit: &'static str,
    pub range: (f64, f64),
    pub color: Option<&'static str>,
}

impl MetricCode {
    pub fn all() -> &'static [MetricCode] {
        &[
            MetricCode::Temperature,
            MetricCode::Humidity,
            MetricCode::Co2,
            MetricCode::Power,
            MetricCode::Occupancy,
            MetricCode::Illuminance,
            MetricCode::Noise,
            MetricCode::Pressure,
            MetricCode::HvacStatus,
            MetricCode::SetTemperature,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            MetricCode::Temperature => "temperature",
            MetricCode::Humidity => "humidity",
            MetricCode::Co2 => "co2",
            MetricCode::Power => "power",
            MetricCode::Occupancy => "occupancy",
            MetricCode::Illuminance => "illuminance",
            MetricCode::Noise => "noise",
            MetricCode::Pressure => "pressure",
            MetricCode::HvacStatus => "hvacStatus",
            MetricCode::SetTemperature => "setTemperature",
            MetricCode::Unknown(code) => code,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MetricCode::Unknown(_))
    }

    /// Localized display label. Unknown codes display their raw code.
    pub fn label(&self, locale: Locale) -> String {
        let label = match (locale, self) {
            (_, MetricCode::Unknown(code)) => return code.clone(),
            (Locale::En, MetricCode::Temperature) => "Temperature",
            (Locale::En, MetricCode::Humidity) => "Humidity",
            (Locale::En, MetricCode::Co2) => "CO2",
            (Locale::En, MetricCode::Power) => "Power",
            (Locale::En, MetricCode::Occupancy) => "Occupancy",
            (Locale::En, MetricCode::Illuminance) => "Illuminance",
            (Locale::En, MetricCode::Noise) => "Noise",
            (Locale::En, MetricCode::Pressure) => "Pressure",
            (Locale::En, MetricCode::HvacStatus) => "HVAC Status",
            (Locale::En, MetricCode::SetTemperature) => "Set Temperature",
            (Locale::Ja, MetricCode::Temperature) => "温度",
            (Locale::Ja, MetricCode::Humidity) => "湿度",
            (Locale::Ja, MetricCode::Co2) => "CO2濃度",
            (Locale::Ja, MetricCode::Power) => "電力",
            (Locale::Ja, MetricCode::Occupancy) => "在室人数",
            (Locale::Ja, MetricCode::Illuminance) => "照度",
            (Locale::Ja, MetricCode::Noise) => "騒音",
            (Locale::Ja, MetricCode::Pressure) => "気圧",
            (Locale::Ja, MetricCode::HvacStatus) => "空調状態",
            (Locale::Ja, MetricCode::SetTemperature) => "設定温度",
        };
        label.to_string()
    }
}

impl From<String> for MetricCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "temperature" => MetricCode::Temperature,
            "humidity" => MetricCode::Humidity,
            "co2" => MetricCode::Co2,
            "power" => MetricCode::Power,
            "occupancy" => MetricCode::Occupancy,
            "illuminance" => MetricCode::Illuminance,
            "noise" => MetricCode::Noise,
            "pressure" => MetricCode::Pressure,
            "hvacStatus" => MetricCode::HvacStatus,
            "setTemperature" => MetricCode::SetTemperature,
            _ => MetricCode::Unknown(code),
        }
    }
}

impl From<&str> for MetricCode {
    fn from(code: &str) -> Self {
        MetricCode::from(code.to_string())
    }
}

impl From<MetricCode> for String {
    fn from(code: MetricCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for MetricCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up the catalog entry for a metric. Never fails: unknown codes get an
/// empty unit, the [0, 100] range and no default color.
pub fn describe(code: &MetricCode) -> MetricDescriptor {
    let (unit, range, color) = match code {
        MetricCode::Temperature => ("°C", (15.0, 30.0), Some("#ef4444")),
        MetricCode::Humidity => ("%", (30.0, 80.0), Some("#3b82f6")),
        MetricCode::Co2 => ("ppm", (400.0, 2000.0), Some("#10b981")),
        MetricCode::Power => ("kW", (0.0, 100.0), Some("#fbbf24")),
        MetricCode::Occupancy => ("people", (0.0, 50.0), Some("#f59e0b")),
        MetricCode::Illuminance => ("lux", (0.0, 2000.0), Some("#fde047")),
        MetricCode::Noise => ("dB", (30.0, 90.0), Some("#ec4899")),
        MetricCode::Pressure => ("hPa", (990.0, 1030.0), Some("#06b6d4")),
        MetricCode::HvacStatus => ("", (0.0, 1.0), Some("#6366f1")),
        MetricCode::SetTemperature => ("°C", (18.0, 28.0), Some("#f97316")),
        MetricCode::Unknown(_) => ("", FALLBACK_RANGE, None),
    };

    MetricDescriptor {
        code: code.clone(),
        unit,
        range,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known_metric() {
        let desc = describe(&MetricCode::Temperature);
        assert_eq!(desc.unit, "°C");
        assert_eq!(desc.range, (15.0, 30.0));
        assert_eq!(desc.color, Some("#ef4444"));
    }

    #[test]
    fn test_describe_unknown_metric_falls_back() {
        let desc = describe(&MetricCode::from("radon"));
        assert_eq!(desc.unit, "");
        assert_eq!(desc.range, (0.0, 100.0));
        assert_eq!(desc.color, None);
    }

    #[test]
    fn test_code_round_trips_through_serde() {
        let json = serde_json::to_string(&MetricCode::SetTemperature).unwrap();
        assert_eq!(json, "\"setTemperature\"");

        let parsed: MetricCode = serde_json::from_str("\"hvacStatus\"").unwrap();
        assert_eq!(parsed, MetricCode::HvacStatus);

        let unknown: MetricCode = serde_json::from_str("\"radon\"").unwrap();
        assert_eq!(unknown, MetricCode::Unknown("radon".to_string()));
    }

    #[test]
    fn test_every_known_metric_has_a_valid_range() {
        for code in MetricCode::all() {
            let (lo, hi) = describe(code).range;
            assert!(lo < hi, "{code} has an empty range");
        }
    }

    #[test]
    fn test_labels_are_localized() {
        assert_eq!(MetricCode::Humidity.label(Locale::En), "Humidity");
        assert_eq!(MetricCode::Humidity.label(Locale::Ja), "湿度");
        assert_eq!(MetricCode::from("radon").label(Locale::Ja), "radon");
    }
}
