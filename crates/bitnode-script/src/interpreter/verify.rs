use super::eval_script;
use crate::error::ScriptError;
use crate::script::Script;
use crate::signature_checker::{SignatureChecker, TransactionSignatureChecker};
use crate::stack::Stack;
use crate::{VerifyFlags, LOG_TARGET};
use bitcoin::secp256k1::{Secp256k1, Verification};
use bitcoin::{Transaction, TxOut};

/// Verifies that `script_sig` satisfies `script_pubkey`.
///
/// - Ok(()): the spend is valid.
/// - Err(err): the first failure encountered.
pub fn verify_script(
    script_sig: &Script,
    script_pubkey: &Script,
    flags: VerifyFlags,
    checker: &mut impl SignatureChecker,
) -> Result<(), ScriptError> {
    verify_script_inner(script_sig, script_pubkey, flags, checker).inspect_err(|err| {
        tracing::debug!(
            target: LOG_TARGET,
            ?script_sig,
            ?script_pubkey,
            ?flags,
            "Script verification failed: {err}"
        );
    })
}

fn verify_script_inner(
    script_sig: &Script,
    script_pubkey: &Script,
    flags: VerifyFlags,
    checker: &mut impl SignatureChecker,
) -> Result<(), ScriptError> {
    if flags.contains(VerifyFlags::SIGPUSHONLY) && !script_sig.is_push_only() {
        return Err(ScriptError::SigPushOnly);
    }

    // scriptSig and scriptPubKey must be evaluated sequentially on the same stack rather
    // than being simply concatenated (see CVE-2010-5141).
    let mut stack = Stack::empty();

    eval_script(&mut stack, script_sig, &flags, checker)?;

    let stack_copy = flags.verify_p2sh().then(|| stack.clone());

    if !eval_script(&mut stack, script_pubkey, &flags, checker)? {
        return Err(ScriptError::EvalFalse);
    }

    // Additional validation for spend-to-script-hash transactions.
    if flags.verify_p2sh() && script_pubkey.is_p2sh() {
        if !script_sig.is_push_only() {
            return Err(ScriptError::SigPushOnly);
        }

        let Some(copy) = stack_copy else {
            return Err(ScriptError::InvalidStackOperation);
        };

        // Restore the stack as left by scriptSig.
        stack = copy;

        let redeem_script = Script::from(stack.pop()?);

        if !eval_script(&mut stack, &redeem_script, &flags, checker)? {
            return Err(ScriptError::EvalFalse);
        }
    }

    // The CLEANSTACK check is only performed after potential P2SH evaluation,
    // as the non-P2SH evaluation of a P2SH script will obviously not result in
    // a clean stack (the P2SH inputs remain).
    if flags.verify_cleanstack() {
        // Disallow CLEANSTACK without P2SH, as otherwise a switch CLEANSTACK->P2SH+CLEANSTACK
        // would be possible, which is not a softfork (and P2SH should be one).
        if !flags.verify_p2sh() {
            return Err(ScriptError::InvalidFlags);
        }

        if stack.len() != 1 {
            return Err(ScriptError::CleanStack);
        }
    }

    Ok(())
}

/// Verifies input `input_index` of `tx` spending `spent_output`.
pub fn verify_input<C: Verification>(
    tx: &Transaction,
    input_index: usize,
    spent_output: &TxOut,
    flags: VerifyFlags,
    secp: &Secp256k1<C>,
) -> Result<(), ScriptError> {
    let Some(input) = tx.input.get(input_index) else {
        return Err(ScriptError::InputIndex {
            index: input_index,
            inputs: tx.input.len(),
        });
    };

    let script_sig = Script::from(input.script_sig.as_script());
    let script_pubkey = Script::from(spent_output.script_pubkey.as_script());

    let mut checker =
        TransactionSignatureChecker::new(tx, input_index, spent_output.value, secp);

    verify_script(&script_sig, &script_pubkey, flags, &mut checker)
}
