use uuid::Uuid;

/**
 * How often (milliseconds) to poll the adapters for discovered peripherals
 * while scanning.
 */
pub const SCAN_POLL_DELAY: u64 = 500;

/**
 * How long (milliseconds) a scan may run before the connect attempt is
 * abandoned because no DISTO showed up.
 */
pub const SCAN_DEADLINE: u64 = 15_000;

/**
 * How often (milliseconds) to check whether the device is still connected.
 */
pub const CONNECTED_POLL_DELAY: u64 = 1000;

/**
 * How long (milliseconds) checking if the peripheral is still connected may
 * take. On some platforms the call can hang after the link drops.
 */
pub const IS_CONNECTED_DEADLINE: u64 = 2000;

/**
 * Advertised local names of DISTO devices start with this prefix.
 */
pub const DEVICE_NAME_PREFIX: &str = "DISTO";

/**
 * The UUID of the Bluetooth BLE service exposed by Leica DISTO devices.
 */
pub const DISTO_SERVICE: &str = "3ab10100-f831-4395-b29d-570977d5bf94";

/**
 * The UUID of the remote GATT characteristic that notifies distance
 * measurements.
 */
pub const DISTO_DISTANCE_CHARACTERISTIC: &str = "3ab10101-f831-4395-b29d-570977d5bf94";

pub fn make_disto_service_uuid() -> Uuid {
    Uuid::parse_str(DISTO_SERVICE).unwrap()
}

pub fn make_disto_distance_uuid() -> Uuid {
    Uuid::parse_str(DISTO_DISTANCE_CHARACTERISTIC).unwrap()
}
