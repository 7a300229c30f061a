use crate::constants::{
    MAX_OPS_PER_SCRIPT, MAX_PUBKEYS_PER_MULTISIG, MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE,
    MAX_STACK_SIZE,
};
use crate::interpreter::SignatureEncodingError;
use crate::num::NumError;
use crate::opcode::Opcode;
use crate::script::DecodeError;
use crate::stack::StackError;

/// Script error type.
///
/// Exactly one kind is reported per failed evaluation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum ScriptError {
    /// The script evaluated without error but terminated with an empty stack
    /// or a false top stack element.
    #[error("script terminated with a false stack element")]
    EvalFalse,
    #[error("OP_RETURN was executed")]
    OpReturn,

    // Max sizes.
    #[error("script exceeds the maximum size of {MAX_SCRIPT_SIZE} bytes")]
    ScriptSize,
    #[error("push exceeds MAX_SCRIPT_ELEMENT_SIZE ({MAX_SCRIPT_ELEMENT_SIZE})")]
    PushSize,
    #[error("exceeds max operations ({MAX_OPS_PER_SCRIPT}) per script")]
    OpCount,
    #[error("stack and altstack exceed the limit of {MAX_STACK_SIZE} items")]
    StackSize,
    #[error("signature count out of range")]
    SigCount,
    #[error("pubkey count out of range [0, {MAX_PUBKEYS_PER_MULTISIG}]")]
    PubkeyCount,

    // Failed verify operations.
    #[error("OP_VERIFY failed")]
    Verify,
    #[error("OP_EQUALVERIFY failed")]
    EqualVerify,
    #[error("OP_CHECKMULTISIGVERIFY failed")]
    CheckMultiSigVerify,
    #[error("OP_CHECKSIGVERIFY failed")]
    CheckSigVerify,
    #[error("OP_NUMEQUALVERIFY failed")]
    NumEqualVerify,

    // Logical/Format/Canonical errors.
    #[error("bad opcode 0x{0:02x}")]
    BadOpcode(u8),
    #[error("attempt to execute disabled opcode {0}")]
    DisabledOpcode(Opcode),
    #[error("invalid stack operation")]
    InvalidStackOperation,
    #[error("invalid altstack operation")]
    InvalidAltStackOperation,
    /// An OP_ELSE or OP_ENDIF without a matching OP_IF, or the end of script
    /// reached inside an open conditional.
    #[error("unbalanced conditional")]
    UnbalancedConditional,

    // CHECKLOCKTIMEVERIFY and CHECKSEQUENCEVERIFY
    #[error("negative locktime")]
    NegativeLocktime,
    #[error("locktime requirement not satisfied")]
    UnsatisfiedLocktime,

    // Malleability
    #[error("signature hash type missing or not understood")]
    SigHashType,
    #[error("non-canonical DER signature: {0}")]
    SigDer(SignatureEncodingError),
    #[error("data push larger than necessary")]
    MinimalData,
    #[error("only push operators allowed in signatures")]
    SigPushOnly,
    #[error("non-canonical signature: S value is unnecessarily high")]
    SigHighS,
    #[error("dummy CHECKMULTISIG argument must be zero")]
    SigNullDummy,
    #[error("public key is neither compressed or uncompressed")]
    PubkeyType,
    #[error("stack size must be exactly one after execution")]
    CleanStack,
    #[error("OP_IF/NOTIF argument must be minimal")]
    MinimalIf,
    #[error("signature must be zero for failed CHECK(MULTI)SIG operation")]
    SigNullFail,

    // Softfork safeness.
    #[error("NOPx reserved for soft-fork upgrades")]
    DiscourageUpgradableNops,

    // Fork id.
    #[error("illegal use of SIGHASH_FORKID")]
    IllegalForkId,
    #[error("signature must use SIGHASH_FORKID")]
    MustUseForkId,
    #[error("using non-compressed public key")]
    NonCompressedPubkey,

    // Extended errors.
    #[error(transparent)]
    Num(#[from] NumError),
    #[error("malformed script: {0}")]
    Decode(#[from] DecodeError),
    #[error("CLEANSTACK requires P2SH to be enabled")]
    InvalidFlags,
    #[error("input index {index} out of range, transaction has {inputs} inputs")]
    InputIndex { index: usize, inputs: usize },
}

impl From<StackError> for ScriptError {
    fn from(err: StackError) -> Self {
        match err {
            StackError::InvalidOperation => Self::InvalidStackOperation,
            StackError::Num(err) => Self::Num(err),
        }
    }
}
