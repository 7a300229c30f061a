use super::flow::eval_upgradable_nop;
use crate::constants::SEQUENCE_LOCKTIME_DISABLE_FLAG;
use crate::error::ScriptError;
use crate::num::ScriptNum;
use crate::opcode::Opcode;
use crate::signature_checker::SignatureChecker;
use crate::stack::Stack;
use crate::VerifyFlags;

/// Handles OP_CHECKLOCKTIMEVERIFY (BIP65) and OP_CHECKSEQUENCEVERIFY (BIP112).
///
/// The operand is left on the stack.
pub(super) fn eval_locktime(
    opcode: Opcode,
    stack: &Stack,
    flags: &VerifyFlags,
    checker: &impl SignatureChecker,
) -> Result<(), ScriptError> {
    match opcode {
        Opcode::OP_CHECKLOCKTIMEVERIFY => {
            if !flags.contains(VerifyFlags::CHECKLOCKTIMEVERIFY) {
                return eval_upgradable_nop(flags);
            }

            // Five bytes so that times up to 2^39-1 can be expressed.
            let lock_time = stack.top_num(0, ScriptNum::LOCKTIME_NUM_SIZE)?;

            if lock_time.is_negative() {
                return Err(ScriptError::NegativeLocktime);
            }

            if !checker.check_lock_time(lock_time) {
                return Err(ScriptError::UnsatisfiedLocktime);
            }
        }
        Opcode::OP_CHECKSEQUENCEVERIFY => {
            if !flags.contains(VerifyFlags::CHECKSEQUENCEVERIFY) {
                return eval_upgradable_nop(flags);
            }

            let sequence = stack.top_num(0, ScriptNum::LOCKTIME_NUM_SIZE)?;

            if sequence.is_negative() {
                return Err(ScriptError::NegativeLocktime);
            }

            // With the disable flag set the operand only has to be well formed.
            if sequence.value() & i64::from(SEQUENCE_LOCKTIME_DISABLE_FLAG) != 0 {
                return Ok(());
            }

            if !checker.check_sequence(sequence) {
                return Err(ScriptError::UnsatisfiedLocktime);
            }
        }
        _ => return Err(ScriptError::BadOpcode(opcode.to_u8())),
    }

    Ok(())
}
