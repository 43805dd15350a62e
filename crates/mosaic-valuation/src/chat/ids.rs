//! Session and message identifiers

use rand::RngCore;

/// Mint a random UUID v4 string from the given source
pub fn mint_id<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string()
}

/// True for `8-4-4-4-12` lowercase hex with version nibble `4` and variant
/// nibble in `{8, 9, a, b}`
pub fn is_v4_shape(id: &str) -> bool {
    let groups: Vec<&str> = id.split('-').collect();
    let lengths_ok = groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(group, len)| group.len() == len);
    if !lengths_ok {
        return false;
    }

    let hex = |c: char| c.is_ascii_digit() || ('a'..='f').contains(&c);
    groups.iter().all(|group| group.chars().all(hex))
        && groups[2].starts_with('4')
        && groups[3].starts_with(['8', '9', 'a', 'b'])
}
