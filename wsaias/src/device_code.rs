//! Code d'identification des consoles (NWC24)
//!
//! Le code transmis dans `DeviceCode` est un entier de 53 bits qui embarque
//! l'identifiant matériel de la console et un CRC de 10 bits, le tout
//! brouillé par substitution de quartets, permutation d'octets, rotations
//! et masques XOR.

/// Code valide
pub const CHECK_OK: u32 = 0;
/// Valeur sur plus de 53 bits
pub const CHECK_OUT_OF_RANGE: u32 = 1;
/// CRC incorrect
pub const CHECK_BAD_CRC: u32 = 2;

const ID_MASK: u64 = 0x001F_FFFF_FFFF_FFFF;
const CRC_POLY: u64 = 0x635;
const CRC_MASK: u64 = 0x3FF;
const INNER_XOR: u64 = 0x0000_B3B3_B3B3_B3B3;
const OUTER_XOR: u64 = 0x0000_5E5E_5E5E_5E5E;

const NIBBLE_TABLE: [u8; 16] = [
    0x4, 0xB, 0x7, 0x9, 0xF, 0x1, 0xD, 0x3, 0xC, 0x2, 0x6, 0xE, 0x8, 0x0, 0xA, 0x5,
];
const INVERSE_NIBBLE_TABLE: [u8; 16] = [
    0xD, 0x5, 0x9, 0x7, 0x0, 0xF, 0xA, 0x2, 0xC, 0x3, 0xE, 0x1, 0x8, 0x6, 0xB, 0x4,
];
const BYTE_PERMUTATION: [u32; 6] = [1, 5, 0, 4, 2, 3];

fn crc(mut value: u64) -> u64 {
    for ctr in 0..=42u32 {
        if (value >> (52 - ctr)) & 1 == 1 {
            value ^= CRC_POLY << (42 - ctr);
        }
    }
    value & CRC_MASK
}

fn byte(value: u64, index: u32) -> u8 {
    (value >> (index * 8)) as u8
}

fn with_byte(value: u64, index: u32, b: u8) -> u64 {
    let shift = index * 8;
    (value & !(0xFFu64 << shift)) | (u64::from(b) << shift)
}

fn substitute(value: u64, table: &[u8; 16]) -> u64 {
    (0..6).fold(value, |acc, i| {
        let b = byte(acc, i);
        let mixed = (table[usize::from(b >> 4)] << 4) | table[usize::from(b & 0xF)];
        with_byte(acc, i, mixed)
    })
}

fn permute(value: u64) -> u64 {
    (0..6u32).fold(value, |acc, i| {
        with_byte(acc, BYTE_PERMUTATION[i as usize], byte(value, i))
    })
}

fn unpermute(value: u64) -> u64 {
    (0..6u32).fold(value, |acc, i| {
        with_byte(acc, i, byte(value, BYTE_PERMUTATION[i as usize]))
    })
}

/// Construit le code d'une console
///
/// `area_code` doit tenir sur 3 bits et `hardware_model` sur 3 bits.
pub fn nwc24_make_user_id(hollywood_id: u32, id_ctr: u16, hardware_model: u8, area_code: u8) -> u64 {
    let base = (u64::from(area_code) << 50)
        | (u64::from(hardware_model) << 47)
        | (u64::from(hollywood_id) << 15)
        | (u64::from(id_ctr) << 10);

    let mut mix = (base | crc(base)) ^ INNER_XOR;
    mix = (mix >> 10) | ((mix & CRC_MASK) << 43);
    mix = substitute(mix, &NIBBLE_TABLE);
    mix = permute(mix) & ID_MASK;
    mix = (mix << 1) | ((mix >> 52) & 1);
    (mix ^ OUTER_XOR) & ID_MASK
}

/// Vérifie un code de console
///
/// Retourne [`CHECK_OK`] (0) si le code est bien formé, une valeur non
/// nulle sinon.
pub fn nwc24_check_user_id(user_id: u64) -> u32 {
    if user_id & !ID_MASK != 0 {
        return CHECK_OUT_OF_RANGE;
    }

    let mut mix = user_id ^ OUTER_XOR;
    mix = (mix >> 1) | ((mix & 1) << 52);
    mix = unpermute(mix);
    mix = substitute(mix, &INVERSE_NIBBLE_TABLE);
    mix = ((mix << 10) & ID_MASK) | (mix >> 43);
    mix ^= INNER_XOR;

    if crc(mix & !CRC_MASK) == mix & CRC_MASK {
        CHECK_OK
    } else {
        CHECK_BAD_CRC
    }
}
