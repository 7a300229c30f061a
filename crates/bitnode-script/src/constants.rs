/// Maximum script length in bytes.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum number of bytes pushable to the stack.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// The maximum combined height of stack and alt stack during script execution.
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum number of public keys per multisig.
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 20;

/// Maximum number of non-push operations per script.
pub const MAX_OPS_PER_SCRIPT: usize = 201;

/// Byte length of a compressed public key.
pub const COMPRESSED_PUBKEY_SIZE: usize = 33;

/// Byte length of an uncompressed public key.
pub const UNCOMPRESSED_PUBKEY_SIZE: usize = 65;

/// Threshold for nLockTime: below this value it is interpreted as block number,
/// otherwise as UNIX timestamp.
pub const LOCKTIME_THRESHOLD: i64 = 500_000_000;

/// Setting nSequence to this value for every input in a transaction disables nLockTime.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Below flags apply in the context of BIP 68
/// If this flag set, CTxIn::nSequence is NOT interpreted as a relative lock-time.
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;

/// If CTxIn::nSequence encodes a relative lock-time and this flag is set, the
/// relative lock-time has units of 512 seconds, otherwise it specifies blocks.
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;

/// If CTxIn::nSequence encodes a relative lock-time, this mask is applied to
/// extract that lock-time from the sequence field.
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

pub const SIGHASH_ALL: u32 = 0x01;
pub const SIGHASH_NONE: u32 = 0x02;
pub const SIGHASH_SINGLE: u32 = 0x03;
pub const SIGHASH_FORKID: u32 = 0x40;
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Mask selecting the base signature hash type.
pub const SIGHASH_BASE_MASK: u32 = 0x1f;
