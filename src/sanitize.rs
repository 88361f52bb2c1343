//! Identifier shortening for table and column names.
//!
//! Deeply nested key paths produce long table names (`Root_orders_lines_...`).
//! Most stores cap identifier length, so anything longer than
//! [`MAX_IDENTIFIER_LEN`] is replaced by a fixed-length name built from a
//! content hash and the tail of the original.

/// Longest identifier the sanitizer ever returns, in characters.
pub const MAX_IDENTIFIER_LEN: usize = 110;

const HASH_PREFIX: char = 't';
const HASH_SEPARATOR: char = '_';
const HASH_HEX_LEN: usize = 8;

/// Return a store-safe identifier for `name`.
///
/// Names of at most [`MAX_IDENTIFIER_LEN`] characters come back unchanged.
/// Longer names become `t<hash>_<tail>`, exactly [`MAX_IDENTIFIER_LEN`]
/// characters long, where `<hash>` is the FNV-1a hash of the full name and
/// `<tail>` is the end of the original name.
///
/// The output is deterministic and `sanitize(sanitize(x)) == sanitize(x)`.
/// Two long names with the same hash and tail would collide; that is not
/// detected here.
pub fn sanitize(name: &str) -> String {
    let char_count = name.chars().count();
    if char_count <= MAX_IDENTIFIER_LEN {
        return name.to_string();
    }

    let hash = format!("{:08x}", fnv1a_32(name.as_bytes()));
    let tail_len = MAX_IDENTIFIER_LEN - HASH_HEX_LEN - 2;
    let tail: String = name.chars().skip(char_count - tail_len).collect();

    let mut out = String::with_capacity(MAX_IDENTIFIER_LEN + 4);
    out.push(HASH_PREFIX);
    out.push_str(&hash);
    out.push(HASH_SEPARATOR);
    out.push_str(&tail);
    out
}

/// 32-bit FNV-1a. Stable across processes and platforms, unlike `DefaultHasher`.
fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811c_9dc5u32;
    for byte in bytes {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}
