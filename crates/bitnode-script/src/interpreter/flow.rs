use crate::error::ScriptError;
use crate::opcode::Opcode;
use crate::stack::{cast_to_bool, Stack};
use crate::VerifyFlags;

/// Handles the flow control opcodes.
///
/// OP_IF, OP_NOTIF, OP_ELSE and OP_ENDIF are evaluated even in unexecuted
/// branches to keep `exec_stack` balanced; the rest only run when executing.
pub(super) fn eval_flow(
    opcode: Opcode,
    stack: &mut Stack,
    exec_stack: &mut Vec<bool>,
    executing: bool,
    flags: &VerifyFlags,
) -> Result<(), ScriptError> {
    match opcode {
        Opcode::OP_NOP => {}
        Opcode::OP_IF | Opcode::OP_NOTIF => {
            let mut value = false;

            if executing {
                let top = stack
                    .pop()
                    .map_err(|_| ScriptError::UnbalancedConditional)?;

                if flags.contains(VerifyFlags::MINIMALIF) && !is_minimal_if(&top) {
                    return Err(ScriptError::MinimalIf);
                }

                value = cast_to_bool(&top);

                if opcode == Opcode::OP_NOTIF {
                    value = !value;
                }
            }

            exec_stack.push(value);
        }
        Opcode::OP_ELSE => {
            let last = exec_stack
                .last_mut()
                .ok_or(ScriptError::UnbalancedConditional)?;
            *last = !*last;
        }
        Opcode::OP_ENDIF => {
            exec_stack
                .pop()
                .ok_or(ScriptError::UnbalancedConditional)?;
        }
        Opcode::OP_VERIFY => {
            if !stack.peek_bool()? {
                return Err(ScriptError::Verify);
            }
            stack.pop()?;
        }
        Opcode::OP_RETURN => return Err(ScriptError::OpReturn),
        _ => return Err(ScriptError::BadOpcode(opcode.to_u8())),
    }

    Ok(())
}

fn is_minimal_if(data: &[u8]) -> bool {
    matches!(data, [] | [1])
}

/// OP_NOP1 and OP_NOP4..OP_NOP10, as well as the locktime opcodes when their
/// soft fork is not active.
pub(super) fn eval_upgradable_nop(flags: &VerifyFlags) -> Result<(), ScriptError> {
    if flags.contains(VerifyFlags::DISCOURAGE_UPGRADABLE_NOPS) {
        return Err(ScriptError::DiscourageUpgradableNops);
    }
    Ok(())
}
