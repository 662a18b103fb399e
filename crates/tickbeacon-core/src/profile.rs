//! GATT profile constants for the tickbeacon service

use uuid::Uuid;

// ----------------------------------------------------------------------------
// Service and Characteristic UUIDs
// ----------------------------------------------------------------------------

/// tickbeacon primary service UUID
pub const TICKBEACON_SERVICE_UUID: Uuid = Uuid::from_u128(0x193DB24F_E42E_49D2_9A70_6A5616863A9D);

/// tickbeacon write-only trigger characteristic UUID
pub const TICKBEACON_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x43CDD5AB_3EF6_496A_A4CC_9933F5ADAF68);

// ----------------------------------------------------------------------------
// Service Identity
// ----------------------------------------------------------------------------

/// The pair of identifiers the peripheral publishes and advertises.
///
/// Fixed for the process lifetime; there is deliberately no way to configure
/// these at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceIdentity {
    /// Primary service UUID
    pub service: Uuid,
    /// The single write-only characteristic UUID
    pub characteristic: Uuid,
}

impl ServiceIdentity {
    /// The tickbeacon service identity.
    pub const fn tickbeacon() -> Self {
        Self {
            service: TICKBEACON_SERVICE_UUID,
            characteristic: TICKBEACON_CHARACTERISTIC_UUID,
        }
    }
}

impl Default for ServiceIdentity {
    fn default() -> Self {
        Self::tickbeacon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_values() {
        assert_eq!(
            TICKBEACON_SERVICE_UUID.to_string(),
            "193db24f-e42e-49d2-9a70-6a5616863a9d"
        );
        assert_eq!(
            TICKBEACON_CHARACTERISTIC_UUID.to_string(),
            "43cdd5ab-3ef6-496a-a4cc-9933f5adaf68"
        );
    }

    #[test]
    fn test_identity_is_fixed() {
        let identity = ServiceIdentity::default();
        assert_eq!(identity.service, TICKBEACON_SERVICE_UUID);
        assert_eq!(identity.characteristic, TICKBEACON_CHARACTERISTIC_UUID);
    }
}
