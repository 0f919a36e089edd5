use storefront_core::{clamp_limit, mask_sensitive};

#[test]
fn test_mask_sensitive_short_values() {
    assert_eq!(mask_sensitive(""), "***");
    assert_eq!(mask_sensitive("12345678"), "***");
}

#[test]
fn test_mask_sensitive_long_values() {
    assert_eq!(mask_sensitive("sepay_live_abcdef"), "sepa***cdef");
}

#[test]
fn test_mask_sensitive_multibyte() {
    // Must not split inside a UTF-8 sequence
    assert_eq!(mask_sensitive("đơnhàngsốmột"), "đơnh***ốmột");
}

#[test]
fn test_clamp_limit() {
    assert_eq!(clamp_limit(None, 10, 100), 10);
    assert_eq!(clamp_limit(Some(0), 10, 100), 1);
    assert_eq!(clamp_limit(Some(-5), 10, 100), 1);
    assert_eq!(clamp_limit(Some(1000), 10, 100), 100);
    assert_eq!(clamp_limit(Some(25), 10, 100), 25);
}
