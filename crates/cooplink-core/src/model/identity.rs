use serde::Serialize;

use super::device::DeviceRecord;

/// The tuple a host platform's device registry consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub identifier: String,
    pub name: String,
    pub manufacturer: String,
    pub model: Option<String>,
    pub firmware_version: Option<String>,
}

impl From<&DeviceRecord> for DeviceIdentity {
    fn from(record: &DeviceRecord) -> Self {
        Self {
            identifier: record.device_id.clone(),
            name: record.name.clone(),
            manufacturer: "Omlet".into(),
            model: record.device_type.clone(),
            firmware_version: record
                .state
                .general
                .as_ref()
                .and_then(|g| g.firmware_version.clone()),
        }
    }
}
