//! Top-level op codes and value type codes of the snapshot format.

/// Auxiliary field. Arbitrary key-value settings.
pub const OP_AUX: u8 = 0xFA;
/// Hash table sizes for the main keyspace and expires.
pub const OP_RESIZE_DB: u8 = 0xFB;
/// Expire time in milliseconds.
pub const OP_EXPIRE_TIME_MS: u8 = 0xFC;
/// Expire time in seconds.
pub const OP_EXPIRE_TIME: u8 = 0xFD;
/// Database selector.
pub const OP_SELECT_DB: u8 = 0xFE;
/// End of the snapshot file.
pub const OP_EOF: u8 = 0xFF;

pub const STRING_VALUE_TYPE: u8 = 0;
pub const LIST_VALUE_TYPE: u8 = 1;
pub const SET_VALUE_TYPE: u8 = 2;
pub const HASH_MAP_VALUE_TYPE: u8 = 4;

/// Op codes that terminate a database section.
pub fn is_section_indicator(op_code: u8) -> bool {
    matches!(op_code, OP_AUX | OP_SELECT_DB | OP_EOF)
}
