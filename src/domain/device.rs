// Device domain model - Sensors, their location and the metrics they report
use super::metric::MetricCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityType {
    Office,
    Factory,
    Retail,
    Datacenter,
}

impl FacilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityType::Office => "office",
            FacilityType::Factory => "factory",
            FacilityType::Retail => "retail",
            FacilityType::Datacenter => "datacenter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Environmental,
    Power,
    Hvac,
    Lighting,
    Occupancy,
    Security,
}

impl DeviceType {
    pub const ALL: [DeviceType; 6] = [
        DeviceType::Environmental,
        DeviceType::Power,
        DeviceType::Hvac,
        DeviceType::Lighting,
        DeviceType::Occupancy,
        DeviceType::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Environmental => "environmental",
            DeviceType::Power => "power",
            DeviceType::Hvac => "hvac",
            DeviceType::Lighting => "lighting",
            DeviceType::Occupancy => "occupancy",
            DeviceType::Security => "security",
        }
    }

    pub fn metrics(&self) -> Vec<MetricCode> {
        match self {
            DeviceType::Environmental => {
                vec![MetricCode::Temperature, MetricCode::Humidity, MetricCode::Co2]
            }
            DeviceType::Power => vec![MetricCode::Power],
            DeviceType::Hvac => vec![
                MetricCode::Temperature,
                MetricCode::SetTemperature,
                MetricCode::HvacStatus,
            ],
            DeviceType::Lighting => vec![MetricCode::Illuminance, MetricCode::Power],
            DeviceType::Occupancy => vec![MetricCode::Occupancy],
            DeviceType::Security => vec![MetricCode::Noise],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceType::Environmental => "ENV Sensor",
            DeviceType::Power => "Power Meter",
            DeviceType::Hvac => "HVAC Unit",
            DeviceType::Lighting => "Lighting Controller",
            DeviceType::Occupancy => "Occupancy Sensor",
            DeviceType::Security => "Security Monitor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub facility: String,
    pub floor: u32,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    pub device_type: DeviceType,
    pub location: Location,
    pub metrics: Vec<MetricCode>,
    pub status: DeviceStatus,
}

impl Device {
    pub fn format_id(facility: FacilityType, device_type: DeviceType, index: usize) -> String {
        format!("{}-{}-{:03}", facility.as_str(), device_type.as_str(), index)
    }

    pub fn format_name(device_type: DeviceType, floor: u32, area: &str, index: usize) -> String {
        // "Power Meter 3F-Nor-2" for floor 3, area "North Wing"
        let area_prefix: String = area.chars().take(3).collect();
        format!("{} {}F-{}-{}", device_type.display_name(), floor, area_prefix, index)
    }

    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_id() {
        assert_eq!(
            Device::format_id(FacilityType::Office, DeviceType::Hvac, 7),
            "office-hvac-007"
        );
    }

    #[test]
    fn test_format_name() {
        assert_eq!(
            Device::format_name(DeviceType::Power, 3, "North Wing", 2),
            "Power Meter 3F-Nor-2"
        );
    }
}
