//! Bitcoin script interpreter.
//!
//! Evaluates a locking script against an unlocking script under a set of
//! [`VerifyFlags`], including P2SH redemption and the legacy and fork-id
//! signature digests.

mod constants;
mod error;
mod interpreter;
mod num;
mod opcode;
pub mod policy;
mod script;
mod sighash;
mod signature_checker;
mod stack;


use bitflags::bitflags;

pub use self::constants::*;
pub use self::error::ScriptError;
pub use self::interpreter::{
    check_pubkey_encoding, check_signature_encoding, eval_script, is_defined_hashtype_signature,
    is_low_der_signature, is_valid_signature_encoding, verify_input, verify_script,
    SignatureEncodingError,
};
pub use self::num::{NumError, ScriptNum};
pub use self::opcode::{Opcode, OpcodeCategory};
pub use self::script::{push_data_bytes, Builder, DecodeError, Instructions, ParsedOpCode, Script};
pub use self::sighash::{forkid_signature_hash, legacy_signature_hash, SighashMidstate};
pub use self::signature_checker::{
    NoSignatureCheck, SignatureChecker, TransactionSignatureChecker,
};
pub use self::stack::{cast_to_bool, GenericStack, Stack, StackError};

/// Log target used by this crate.
pub(crate) const LOG_TARGET: &str = "script";

bitflags! {
    /// Script verification flags.
    ///
    /// Bit 11 is unassigned.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VerifyFlags: u32 {
        const NONE = 0;
        /// Evaluate P2SH subscripts (BIP16).
        const P2SH = 1 << 0;
        /// Enforce strict signature and public key encodings; also enforces the
        /// fork-id hash type rules.
        const STRICTENC = 1 << 1;
        /// Enforce strict DER signatures (BIP66).
        const DERSIG = 1 << 2;
        /// Enforce low S values in signatures.
        const LOW_S = 1 << 3;
        /// The CHECKMULTISIG dummy argument must be empty.
        const NULLDUMMY = 1 << 4;
        /// scriptSig must consist of pushes only.
        const SIGPUSHONLY = 1 << 5;
        /// Require minimal pushes and minimally encoded numbers.
        const MINIMALDATA = 1 << 6;
        /// Fail on the upgradable NOPs instead of ignoring them.
        const DISCOURAGE_UPGRADABLE_NOPS = 1 << 7;
        /// Exactly one item must remain on the stack after evaluation.
        const CLEANSTACK = 1 << 8;
        /// Enable OP_CHECKLOCKTIMEVERIFY (BIP65).
        const CHECKLOCKTIMEVERIFY = 1 << 9;
        /// Enable OP_CHECKSEQUENCEVERIFY (BIP112).
        const CHECKSEQUENCEVERIFY = 1 << 10;
        /// Accepted for compatibility, has no effect since witness programs
        /// are not evaluated.
        const DISCOURAGE_UPGRADABLE_WITNESS_PROGRAM = 1 << 12;
        /// OP_IF/OP_NOTIF arguments must be empty or exactly `0x01`.
        const MINIMALIF = 1 << 13;
        /// Failed signature checks require empty signatures.
        const NULLFAIL = 1 << 14;
        /// Public keys must be compressed.
        const COMPRESSED_PUBKEYTYPE = 1 << 15;
        /// Enable the fork-id signature digest.
        const ENABLE_SIGHASH_FORKID = 1 << 16;
    }
}

impl VerifyFlags {
    pub fn verify_p2sh(&self) -> bool {
        self.contains(Self::P2SH)
    }

    pub fn verify_minimaldata(&self) -> bool {
        self.contains(Self::MINIMALDATA)
    }

    pub fn verify_cleanstack(&self) -> bool {
        self.contains(Self::CLEANSTACK)
    }

    pub fn enable_sighash_forkid(&self) -> bool {
        self.contains(Self::ENABLE_SIGHASH_FORKID)
    }
}
