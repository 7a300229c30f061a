use crate::constants::{
    COMPRESSED_PUBKEY_SIZE, SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_FORKID, SIGHASH_SINGLE,
    UNCOMPRESSED_PUBKEY_SIZE,
};
use crate::error::ScriptError;
use crate::opcode::Opcode;
use crate::script::{push_data_bytes, Script};
use crate::signature_checker::SignatureChecker;
use crate::stack::Stack;
use crate::VerifyFlags;
use bitcoin::secp256k1::ecdsa::Signature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureEncodingError {
    #[error("DER encoded signature is too short")]
    TooShort,
    #[error("DER encoded signature is too long")]
    TooLong,
    #[error("signature does not have the expected ASN.1 sequence ID")]
    InvalidSequenceId,
    #[error("signature length does not match its elements")]
    InvalidDataLength,
    #[error("R integer marker")]
    InvalidIntegerIdR,
    #[error("R length is zero")]
    ZeroLengthR,
    #[error("R is negative")]
    NegativeR,
    #[error("R value has too much padding")]
    TooMuchPaddingR,
    #[error("S integer marker")]
    InvalidIntegerIdS,
    #[error("S length is zero")]
    ZeroLengthS,
    #[error("S is negative")]
    NegativeS,
    #[error("S value has too much padding")]
    TooMuchPaddingS,
}

/// Handles OP_CHECKSIG and OP_CHECKSIGVERIFY.
///
/// `[sig pubkey] -> [bool]`
pub(super) fn eval_checksig(
    opcode: Opcode,
    stack: &mut Stack,
    script_code: &Script,
    flags: &VerifyFlags,
    checker: &mut impl SignatureChecker,
) -> Result<(), ScriptError> {
    stack.require(2)?;

    let pubkey = stack.pop()?;
    let sig = stack.pop()?;

    let script_code = remove_signatures(script_code, [sig.as_slice()], flags);

    check_signature_encoding(&sig, flags)?;
    check_pubkey_encoding(&pubkey, flags)?;

    let success = checker.check_signature(&sig, &pubkey, &script_code, *flags);

    if !success && flags.contains(VerifyFlags::NULLFAIL) && !sig.is_empty() {
        return Err(ScriptError::SigNullFail);
    }

    match opcode {
        Opcode::OP_CHECKSIGVERIFY if !success => Err(ScriptError::CheckSigVerify),
        Opcode::OP_CHECKSIGVERIFY => Ok(()),
        _ => {
            stack.push_bool(success);
            Ok(())
        }
    }
}

/// Drops the push-encoded signatures from the script code, unless a signature
/// commits to the fork-id digest, which does not sign over itself.
pub(super) fn remove_signatures<'a>(
    script_code: &Script,
    sigs: impl IntoIterator<Item = &'a [u8]>,
    flags: &VerifyFlags,
) -> Script {
    let mut script_code = script_code.clone();

    for sig in sigs {
        if flags.enable_sighash_forkid() && has_forkid(sig) {
            continue;
        }
        let (cleaned, _found) = script_code.find_and_delete(&push_data_bytes(sig));
        script_code = cleaned;
    }

    script_code
}

fn has_forkid(sig: &[u8]) -> bool {
    sig.last()
        .is_some_and(|&hash_type| u32::from(hash_type) & SIGHASH_FORKID != 0)
}

/// Checks the signature encoding against the verification flags.
///
/// The empty signature always passes so that a CHECK(MULTI)SIG can be made to
/// fail cleanly.
pub fn check_signature_encoding(sig: &[u8], flags: &VerifyFlags) -> Result<(), ScriptError> {
    if sig.is_empty() {
        return Ok(());
    }

    if flags.intersects(VerifyFlags::DERSIG | VerifyFlags::LOW_S | VerifyFlags::STRICTENC) {
        is_valid_signature_encoding(sig).map_err(ScriptError::SigDer)?;
    }

    if flags.contains(VerifyFlags::LOW_S) {
        is_low_der_signature(sig)?;
    }

    if flags.contains(VerifyFlags::STRICTENC) {
        if !is_defined_hashtype_signature(sig) {
            return Err(ScriptError::SigHashType);
        }

        let uses_forkid = has_forkid(sig);
        let forkid_enabled = flags.enable_sighash_forkid();

        if !forkid_enabled && uses_forkid {
            return Err(ScriptError::IllegalForkId);
        }

        if forkid_enabled && !uses_forkid {
            return Err(ScriptError::MustUseForkId);
        }
    }

    Ok(())
}

// 0x30 [total-length] 0x02 [R-length] [R] 0x02 [S-length] [S] [sighash-type]
//
// https://github.com/bitcoin/bips/blob/master/bip-0066.mediawiki#der-encoding-reference
pub fn is_valid_signature_encoding(sig: &[u8]) -> Result<(), SignatureEncodingError> {
    if sig.len() < 9 {
        return Err(SignatureEncodingError::TooShort);
    }

    if sig.len() > 73 {
        return Err(SignatureEncodingError::TooLong);
    }

    // A signature is of type 0x30 (compound)
    if sig[0] != 0x30 {
        return Err(SignatureEncodingError::InvalidSequenceId);
    }

    // Make sure the length covers the entire signature
    if usize::from(sig[1]) != sig.len() - 3 {
        return Err(SignatureEncodingError::InvalidDataLength);
    }

    let len_r = usize::from(sig[3]);

    // Make sure the length of the S element is still inside the signature
    if 5 + len_r >= sig.len() {
        return Err(SignatureEncodingError::InvalidDataLength);
    }

    let len_s = usize::from(sig[5 + len_r]);

    if len_r + len_s + 7 != sig.len() {
        return Err(SignatureEncodingError::InvalidDataLength);
    }

    if sig[2] != 0x02 {
        return Err(SignatureEncodingError::InvalidIntegerIdR);
    }

    if len_r == 0 {
        return Err(SignatureEncodingError::ZeroLengthR);
    }

    if sig[4] & 0x80 != 0 {
        return Err(SignatureEncodingError::NegativeR);
    }

    // Null bytes at the start of R are not allowed, unless R would otherwise be interpreted as a negative number
    if len_r > 1 && sig[4] == 0x00 && sig[5] & 0x80 == 0 {
        return Err(SignatureEncodingError::TooMuchPaddingR);
    }

    if sig[len_r + 4] != 0x02 {
        return Err(SignatureEncodingError::InvalidIntegerIdS);
    }

    if len_s == 0 {
        return Err(SignatureEncodingError::ZeroLengthS);
    }

    if sig[len_r + 6] & 0x80 != 0 {
        return Err(SignatureEncodingError::NegativeS);
    }

    if len_s > 1 && sig[len_r + 6] == 0x00 && sig[len_r + 7] & 0x80 == 0 {
        return Err(SignatureEncodingError::TooMuchPaddingS);
    }

    Ok(())
}

/// Requires a valid encoding whose S value is at most half the curve order.
pub fn is_low_der_signature(sig: &[u8]) -> Result<(), ScriptError> {
    is_valid_signature_encoding(sig).map_err(ScriptError::SigDer)?;

    let Some((_hash_type, der)) = sig.split_last() else {
        return Err(ScriptError::SigDer(SignatureEncodingError::TooShort));
    };

    let Ok(signature) = Signature::from_der_lax(der) else {
        return Err(ScriptError::SigHighS);
    };

    let mut normalized = signature;
    normalized.normalize_s();

    if normalized != signature {
        return Err(ScriptError::SigHighS);
    }

    Ok(())
}

/// The hash type byte, ignoring ANYONECANPAY and FORKID, must be one of
/// ALL, NONE or SINGLE.
pub fn is_defined_hashtype_signature(sig: &[u8]) -> bool {
    let Some(&hash_type) = sig.last() else {
        return false;
    };

    let base = u32::from(hash_type) & !(SIGHASH_ANYONECANPAY | SIGHASH_FORKID);

    (SIGHASH_ALL..=SIGHASH_SINGLE).contains(&base)
}

/// Checks whether or not the passed public key adheres to the encoding
/// requirements of the flags.
pub fn check_pubkey_encoding(pubkey: &[u8], flags: &VerifyFlags) -> Result<(), ScriptError> {
    if flags.contains(VerifyFlags::STRICTENC) && !is_public_key(pubkey) {
        return Err(ScriptError::PubkeyType);
    }

    if flags.contains(VerifyFlags::COMPRESSED_PUBKEYTYPE) && !is_compressed_pubkey(pubkey) {
        return Err(ScriptError::NonCompressedPubkey);
    }

    Ok(())
}

fn is_public_key(v: &[u8]) -> bool {
    match v.len() {
        COMPRESSED_PUBKEY_SIZE => is_compressed_pubkey(v),
        UNCOMPRESSED_PUBKEY_SIZE => v[0] == 0x04,
        _ => false,
    }
}

fn is_compressed_pubkey(pubkey: &[u8]) -> bool {
    pubkey.len() == COMPRESSED_PUBKEY_SIZE && matches!(pubkey[0], 0x02 | 0x03)
}
