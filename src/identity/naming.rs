//! Deterministic two-word display names derived from a peer identifier.

const ADJECTIVES: [&str; 10] = [
    "Red", "Blue", "Green", "Purple", "Golden", "Silver", "Crystal", "Cosmic", "Electric",
    "Mystic",
];

const NOUNS: [&str; 10] = [
    "Wolf", "Eagle", "Lion", "Phoenix", "Dragon", "Tiger", "Falcon", "Panther", "Hawk", "Bear",
];

/// Java's `String.hashCode()`: `h = h * 31 + c` over UTF-16 code units,
/// wrapping on signed 32-bit overflow at every step.
fn java_hash(s: &str) -> i32 {
    let mut h: i32 = 0;
    for c in s.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(c as i32);
    }
    h
}

/// Absolute value of a hash, with `i32::MIN` mapped to `0` rather than
/// widened to its unsigned bit pattern — `i32::MIN` has no positive
/// representation in `i32`, and zero keeps the index derivation a plain
/// `u32 % len` at every call site.
fn hash_abs(h: i32) -> u32 {
    if h == i32::MIN {
        0
    } else {
        h.unsigned_abs()
    }
}

fn pick<'a>(list: &'a [&'a str; 10], seed: &str) -> &'a str {
    let index = (hash_abs(java_hash(seed)) as usize) % list.len();
    list[index]
}

/// Derive the `"<Adjective> <Noun>"` display name for a peer identifier.
/// Deterministic: the same identifier always yields the same name, in this
/// process or any other.
pub fn display_name(peer_id: &str) -> String {
    let adjective = pick(&ADJECTIVES, &format!("{peer_id}adjective"));
    let noun = pick(&NOUNS, &format!("{peer_id}noun"));
    format!("{adjective} {noun}")
}
