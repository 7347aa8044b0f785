use mac_address::MacAddressIterator;
use tracing::debug;

/// First adapter address that is not all zeroes, as upper-case hex without separators.
#[must_use]
pub fn primary_mac() -> Option<String> {
    let addresses = match MacAddressIterator::new() {
        Ok(iter) => iter,
        Err(e) => {
            debug!(error = %e, "Cannot enumerate network adapters");
            return None;
        },
    };

    addresses.map(|addr| addr.bytes()).find(|bytes| bytes.iter().any(|b| *b != 0)).map(format_mac)
}

/// `[0xaa, 0xbb, ..]` to `AABB..`.
#[must_use]
pub fn format_mac(bytes: [u8; 6]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
