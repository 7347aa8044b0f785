pub mod fixtures;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use fixtures::setup_vault;
use proptest::prelude::*;
use tether_vault::VaultError;

proptest! {
    #[test]
    fn roundtrip_arbitrary_bytes(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let vault = setup_vault();
        let sealed = vault.seal_bytes(&data).unwrap();
        let opened = vault.open_bytes(&sealed).unwrap();
        prop_assert_eq!(data, opened);
    }

    #[test]
    fn roundtrip_arbitrary_json_strings(text in ".{0,256}", n in any::<i64>()) {
        let vault = setup_vault();
        let value = serde_json::json!({ "text": text, "n": n });
        let blob = vault.seal_record(&value).unwrap();
        let back: serde_json::Value = vault.open_record(&blob).unwrap();
        prop_assert_eq!(value, back);
    }

    #[test]
    fn any_single_bit_flip_is_rejected(
        data in proptest::collection::vec(any::<u8>(), 0..256),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let vault = setup_vault();
        let mut raw = vault.seal_bytes(&data).unwrap();
        let idx = position.index(raw.len());
        raw[idx] ^= 1 << bit;

        let blob = STANDARD.encode(&raw);
        let result = vault.open_record::<serde_json::Value>(&blob);
        prop_assert!(
            matches!(result, Err(VaultError::Tampered { .. } | VaultError::InvalidPayload { .. })),
            "flip at {} produced {:?}", idx, result
        );
    }
}
