use super::sig::{check_pubkey_encoding, check_signature_encoding, remove_signatures};
use crate::constants::{MAX_OPS_PER_SCRIPT, MAX_PUBKEYS_PER_MULTISIG};
use crate::error::ScriptError;
use crate::num::ScriptNum;
use crate::opcode::Opcode;
use crate::script::Script;
use crate::signature_checker::SignatureChecker;
use crate::stack::Stack;
use crate::VerifyFlags;

/// Handles OP_CHECKMULTISIG and OP_CHECKMULTISIGVERIFY.
///
/// `[dummy sig_1 .. sig_m m key_1 .. key_n n] -> [bool]`
///
/// Signatures must be in the same order as the keys they match. Each key is
/// tried at most once, so the check fails as soon as more signatures remain
/// than keys.
pub(super) fn eval_checkmultisig(
    opcode: Opcode,
    stack: &mut Stack,
    script_code: &Script,
    flags: &VerifyFlags,
    checker: &mut impl SignatureChecker,
    op_count: &mut usize,
) -> Result<(), ScriptError> {
    stack.require(1)?;

    let keys_count = stack.top_num(0, ScriptNum::MAX_NUM_SIZE)?.to_i32();
    if keys_count < 0 || keys_count as usize > MAX_PUBKEYS_PER_MULTISIG {
        return Err(ScriptError::PubkeyCount);
    }
    let keys_count = keys_count as usize;

    *op_count += keys_count;
    if *op_count > MAX_OPS_PER_SCRIPT {
        return Err(ScriptError::OpCount);
    }

    // Keys sit right below their count, topmost first.
    stack.require(keys_count + 2)?;

    let sigs_count = stack
        .top_num(keys_count + 1, ScriptNum::MAX_NUM_SIZE)?
        .to_i32();
    if sigs_count < 0 || sigs_count as usize > keys_count {
        return Err(ScriptError::SigCount);
    }
    let sigs_count = sigs_count as usize;

    // Both counts, the items and the dummy.
    stack.require(keys_count + sigs_count + 3)?;

    let keys = (1..=keys_count)
        .map(|i| stack.top(i).cloned())
        .collect::<Result<Vec<_>, _>>()?;
    let sigs = (0..sigs_count)
        .map(|i| stack.top(keys_count + 2 + i).cloned())
        .collect::<Result<Vec<_>, _>>()?;

    let script_code = remove_signatures(script_code, sigs.iter().map(Vec::as_slice), flags);

    let mut success = true;
    let mut isig = 0;
    let mut ikey = 0;

    while success && isig < sigs_count {
        let sig = &sigs[isig];
        let pubkey = &keys[ikey];

        // Only the pairs actually visited have their encodings checked.
        check_signature_encoding(sig, flags)?;
        check_pubkey_encoding(pubkey, flags)?;

        if checker.check_signature(sig, pubkey, &script_code, *flags) {
            isig += 1;
        }
        ikey += 1;

        if sigs_count - isig > keys_count - ikey {
            success = false;
        }
    }

    if !success
        && flags.contains(VerifyFlags::NULLFAIL)
        && sigs.iter().any(|sig| !sig.is_empty())
    {
        return Err(ScriptError::SigNullFail);
    }

    stack.drop(keys_count + sigs_count + 2)?;

    // A historical off-by-one consumes one extra item, which must be empty
    // under NULLDUMMY.
    let dummy = stack.pop()?;
    if flags.contains(VerifyFlags::NULLDUMMY) && !dummy.is_empty() {
        return Err(ScriptError::SigNullDummy);
    }

    match opcode {
        Opcode::OP_CHECKMULTISIGVERIFY if !success => Err(ScriptError::CheckMultiSigVerify),
        Opcode::OP_CHECKMULTISIGVERIFY => Ok(()),
        _ => {
            stack.push_bool(success);
            Ok(())
        }
    }
}
