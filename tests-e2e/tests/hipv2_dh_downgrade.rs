//! HIPv2 lets the responder advertise an ordered DH group preference list
//! in R1; an initiator that skips the first group it actually supports is
//! attempting a downgrade, whether or not the group it picked is itself
//! secure.

use hip_crypto::dh::{detect_downgrade, DhGroup};
use hip_types::HipVersion;

#[test]
fn initiator_choosing_a_weaker_group_than_its_own_declared_support_is_flagged() {
    let version = HipVersion::V2;
    assert_eq!(version, HipVersion::V2);

    let responder_prefs = vec![DhGroup::NistP384, DhGroup::NistP256, DhGroup::Modp3072];
    let initiator_supported = vec![DhGroup::NistP384, DhGroup::NistP256, DhGroup::Modp3072];

    // The initiator claims to support NIST P-384 (the responder's top
    // choice) but sends I2 using the much weaker MODP-3072 group instead.
    assert!(detect_downgrade(&responder_prefs, &initiator_supported, DhGroup::Modp3072));
}

#[test]
fn initiator_using_its_first_mutually_supported_group_is_not_a_downgrade() {
    let responder_prefs = vec![DhGroup::NistP521, DhGroup::NistP384, DhGroup::Modp3072];
    // This initiator never implemented P-521; its first *supported* match
    // in the responder's list is P-384, and that's what it used.
    let initiator_supported = vec![DhGroup::NistP384, DhGroup::Modp3072];

    assert!(!detect_downgrade(&responder_prefs, &initiator_supported, DhGroup::NistP384));
}

#[test]
fn no_mutually_supported_group_is_itself_treated_as_a_downgrade_attempt() {
    let responder_prefs = vec![DhGroup::NistP521];
    let initiator_supported = vec![DhGroup::Modp1536];
    assert!(detect_downgrade(&responder_prefs, &initiator_supported, DhGroup::Modp1536));
}
