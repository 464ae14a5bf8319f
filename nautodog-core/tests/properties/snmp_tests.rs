//! Property tests for SNMP credential handling

use nautodog_core::snmp::{
    AuthProtocol, NetSnmpChecker, PrivProtocol, SecurityLevel, SnmpV3Credentials,
};
use proptest::prelude::*;

/// Randomizes the case of each character
fn mixed_case(name: &str, mask: &[bool]) -> String {
    name.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
        .collect()
}

proptest! {
    /// Property: protocol names parse regardless of case
    #[test]
    fn protocol_names_are_case_insensitive(
        auth_index in 0usize..AuthProtocol::ALL.len(),
        priv_index in 0usize..PrivProtocol::ALL.len(),
        mask in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let auth = AuthProtocol::ALL[auth_index];
        let privacy = PrivProtocol::ALL[priv_index];
        prop_assert_eq!(mixed_case(auth.usm_name(), &mask).parse::<AuthProtocol>().unwrap(), auth);
        prop_assert_eq!(mixed_case(privacy.usm_name(), &mask).parse::<PrivProtocol>().unwrap(), privacy);
    }

    /// Property: unknown names are rejected
    #[test]
    fn unknown_names_rejected(name in "x[a-z]{3,10}") {
        prop_assert!(name.parse::<AuthProtocol>().is_err());
        prop_assert!(name.parse::<PrivProtocol>().is_err());
    }

    /// Property: the security level follows which keys are set
    #[test]
    fn security_level_follows_keys(
        auth_key in prop::option::of("[a-z]{8,16}"),
        priv_key in prop::option::of("[a-z]{8,16}"),
    ) {
        let mut creds = SnmpV3Credentials::new("10.0.0.1", "monitor");
        if let Some(key) = &auth_key {
            creds = creds.with_auth(key.as_str(), AuthProtocol::Sha);
        }
        if let Some(key) = &priv_key {
            creds = creds.with_priv(key.as_str(), PrivProtocol::Aes128);
        }

        let resolved = creds.resolve().unwrap();
        let expected = match (auth_key.is_some(), priv_key.is_some()) {
            (false, _) => SecurityLevel::NoAuthNoPriv,
            (true, false) => SecurityLevel::AuthNoPriv,
            (true, true) => SecurityLevel::AuthPriv,
        };
        prop_assert_eq!(resolved.level, expected);

        let args = NetSnmpChecker::v3_args(&creds).unwrap();
        prop_assert_eq!(args.contains(&"-A".to_string()), auth_key.is_some());
        prop_assert_eq!(args.contains(&"-X".to_string()), auth_key.is_some() && priv_key.is_some());
    }
}
