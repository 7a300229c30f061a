//! Verification flag sets.

use crate::VerifyFlags;

/// Flags every valid block must satisfy.
pub const MANDATORY_SCRIPT_VERIFY_FLAGS: VerifyFlags = VerifyFlags::P2SH;

/// Flags applied to transactions before relay.
pub const STANDARD_SCRIPT_VERIFY_FLAGS: VerifyFlags = MANDATORY_SCRIPT_VERIFY_FLAGS
    .union(VerifyFlags::STRICTENC)
    .union(VerifyFlags::DERSIG)
    .union(VerifyFlags::LOW_S)
    .union(VerifyFlags::NULLDUMMY)
    .union(VerifyFlags::SIGPUSHONLY)
    .union(VerifyFlags::MINIMALDATA)
    .union(VerifyFlags::DISCOURAGE_UPGRADABLE_NOPS)
    .union(VerifyFlags::CLEANSTACK)
    .union(VerifyFlags::CHECKLOCKTIMEVERIFY)
    .union(VerifyFlags::CHECKSEQUENCEVERIFY)
    .union(VerifyFlags::MINIMALIF)
    .union(VerifyFlags::NULLFAIL);

/// Standard flags that are not enforced in blocks.
pub const STANDARD_NOT_MANDATORY_VERIFY_FLAGS: VerifyFlags =
    STANDARD_SCRIPT_VERIFY_FLAGS.difference(MANDATORY_SCRIPT_VERIFY_FLAGS);
