use super::*;

fn hash_with(f: impl FnOnce(&mut StableHasher)) -> Fingerprint128 {
    let mut h = StableHasher::new();
    f(&mut h);
    h.finish()
}

#[test]
fn quantized_writes_absorb_float_noise() {
    let a = hash_with(|h| h.write_point(Point::new(1.0, 2.0)));
    let b = hash_with(|h| h.write_point(Point::new(1.0 + 1e-9, 2.0 - 1e-9)));
    let c = hash_with(|h| h.write_point(Point::new(1.5, 2.0)));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn strings_are_length_prefixed() {
    let a = hash_with(|h| {
        h.write_str("ab");
        h.write_str("c");
    });
    let b = hash_with(|h| {
        h.write_str("a");
        h.write_str("bc");
    });
    assert_ne!(a, b);
}

#[test]
fn fingerprints_are_stable_across_hashers() {
    let run = || {
        hash_with(|h| {
            h.write_affine(Affine::translate((3.0, 4.0)));
            h.write_bool(true);
            h.write_u32(7);
        })
    };
    assert_eq!(run(), run());
}
