use serde::{Deserialize, Deserializer, Serialize};

/// Vehicle record returned by the MOT History API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MotVehicle {
    #[serde(deserialize_with = "null_as_default")]
    pub registration: String,
    #[serde(deserialize_with = "null_as_default")]
    pub make: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_used_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fuel_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub primary_colour: String,
    #[serde(deserialize_with = "null_as_default")]
    pub registration_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub manufacture_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub engine_size: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mot_tests: Vec<MotTest>,
}

/// A single MOT test, most recent first as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MotTest {
    #[serde(deserialize_with = "null_as_default")]
    pub completed_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub test_result: String,
    #[serde(deserialize_with = "null_as_default")]
    pub expiry_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub odometer_value: String,
    #[serde(deserialize_with = "null_as_default")]
    pub odometer_unit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub odometer_result_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mot_test_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub defects: Vec<Defect>,
}

/// A defect or advisory recorded against an MOT test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defect {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub defect_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dangerous: bool,
}

/// Vehicle record returned by the DVLA Vehicle Enquiry Service.
///
/// Dates are kept as the API's `YYYY-MM-DD` text; the report formatter
/// converts them for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VesVehicle {
    #[serde(deserialize_with = "null_as_default")]
    pub registration_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tax_status: String,
    pub tax_due_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub wheelplan: String,
    #[serde(rename = "dateOfLastV5CIssued")]
    pub date_of_last_v5c_issued: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub euro_status: String,
}

/// Upstreams send `null` for unknown values; treat it like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
