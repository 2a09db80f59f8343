use quickchart::{NumberFormat, clean_value, clean_values};

#[test]
fn zero_ignores_settings() {
    for (decimals, places) in [(true, 0), (true, 4), (false, 2)] {
        assert_eq!(clean_value(0.0, decimals, places), "0");
    }
}

#[test]
fn fractions_keep_two_digits() {
    assert_eq!(clean_value(0.5, true, 4), "0.50");
    assert_eq!(clean_value(0.127, false, 0), "0.13");
    assert_eq!(clean_value(-0.25, true, 1), "-0.25");
}

#[test]
fn magnitudes_and_signs() {
    assert_eq!(clean_value(1_500.0, true, 1), "1.5K");
    assert_eq!(clean_value(1_500.0, false, 1), "2k");
    assert_eq!(clean_value(2_500_000_000.0, true, 1), "2.5B");
    assert_eq!(clean_value(-2_500_000_000.0, true, 1), "-2.5B");
    assert_eq!(clean_value(3_200_000.0, true, 2), "3.20M");
    assert_eq!(clean_value(1.0e12, true, 0), "1T");
}

#[test]
fn sequence_keeps_length() {
    let xs = [0.0, 12.0, 1_234.0, f64::NAN, 9.9e9];
    let out = clean_values(&xs, true, 1);
    assert_eq!(out.len(), xs.len());
    assert_eq!(out, ["0", "12.0", "1.2K", "NaN", "9.9B"]);
}

#[test]
fn affixes_wrap_the_number() {
    let nf = NumberFormat::new(true, 1);
    assert_eq!(nf.format_affixed(2_500.0, "$", ""), "$2.5K");
    assert_eq!(nf.format_affixed(45.0, "", "%"), "45.0%");
}
