use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct DriverMessage {
    pub data: Data,
    pub metadata: Metadata,
    pub uuid: String,
}

#[derive(Debug, Deserialize)]
pub struct Data {
    #[serde(rename = "EVENT")]
    pub event: Option<String>,
    #[serde(rename = "TRIP_ID")]
    pub trip_id: Option<String>,
    #[serde(rename = "DRIVER_ID")]
    pub driver_id: Option<String>,
    #[serde(rename = "COMPANY_ID")]
    pub company_id: Option<String>,
    #[serde(rename = "PLATE")]
    pub plate: Option<String>,
    #[serde(rename = "GPS_DATETIME")]
    pub gps_datetime: Option<String>,
    #[serde(rename = "LATITUD", default, deserialize_with = "parse_f64_option")]
    pub latitude: Option<f64>,
    #[serde(rename = "LONGITUD", default, deserialize_with = "parse_f64_option")]
    pub longitude: Option<f64>,
    #[serde(rename = "SPEED", default, deserialize_with = "parse_f64_option")]
    pub speed: Option<f64>,
    #[serde(rename = "BATTERY", default, deserialize_with = "parse_f64_option")]
    pub battery: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(rename = "DRIVER_ID")]
    pub driver_id: Option<String>,
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

impl DriverMessage {
    pub fn get_driver_id(&self) -> Option<&String> {
        self.data.driver_id.as_ref().or(self.metadata.driver_id.as_ref())
    }
}

fn parse_f64_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
    }

    let v: Option<StringOrFloat> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrFloat::Float(f)) => Ok(Some(f)),
        Some(StringOrFloat::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.parse::<f64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
        None => Ok(None),
    }
}
