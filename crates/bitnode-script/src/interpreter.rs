mod arith;
mod crypto;
mod flow;
mod locktime;
mod multisig;
mod sig;
mod stack_ops;
mod verify;

use crate::constants::{MAX_OPS_PER_SCRIPT, MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE, MAX_STACK_SIZE};
use crate::error::ScriptError;
use crate::opcode::{Opcode, OpcodeCategory};
use crate::script::Script;
use crate::signature_checker::SignatureChecker;
use crate::stack::Stack;
use crate::{VerifyFlags, LOG_TARGET};

pub use self::sig::{
    check_pubkey_encoding, check_signature_encoding, is_defined_hashtype_signature,
    is_low_der_signature, is_valid_signature_encoding, SignatureEncodingError,
};
pub use self::verify::{verify_input, verify_script};

/// Executes `script` on top of `stack`.
///
/// Returns whether the resulting stack is non-empty with a true top element.
/// The stack is left as the script produced it on success, e.g. for the P2SH
/// redeem step.
pub fn eval_script<SC: SignatureChecker>(
    stack: &mut Stack,
    script: &Script,
    flags: &VerifyFlags,
    checker: &mut SC,
) -> Result<bool, ScriptError> {
    if script.len() > MAX_SCRIPT_SIZE {
        return Err(ScriptError::ScriptSize);
    }

    stack.set_verify_minimaldata(flags.verify_minimaldata());

    let mut alt_stack = Stack::new(Vec::new(), flags.verify_minimaldata());

    // Evaluation state of the enclosing OP_IF blocks.
    let mut exec_stack: Vec<bool> = Vec::new();

    // Start of the script code signed by CHECKSIG, moved by OP_CODESEPARATOR.
    let mut begincode = 0;

    let mut op_count = 0;

    for instruction in script.instructions() {
        let instruction = instruction?;

        let executing = exec_stack.iter().all(|branch| *branch);

        if instruction.data.len() > MAX_SCRIPT_ELEMENT_SIZE {
            return Err(ScriptError::PushSize);
        }

        // Unassigned opcodes count too, pushes and OP_RESERVED do not.
        if instruction.opcode > Opcode::OP_16.to_u8() {
            op_count += 1;
            if op_count > MAX_OPS_PER_SCRIPT {
                return Err(ScriptError::OpCount);
            }
        }

        let Some(opcode) = instruction.op() else {
            if executing {
                return Err(ScriptError::BadOpcode(instruction.opcode));
            }
            continue;
        };

        if opcode.is_disabled() {
            return Err(ScriptError::DisabledOpcode(opcode));
        }

        if executing && instruction.is_push() {
            if flags.verify_minimaldata() && !instruction.check_minimal_push() {
                return Err(ScriptError::MinimalData);
            }
            stack.push(instruction.data.to_vec());
        } else if executing || (Opcode::OP_IF..=Opcode::OP_ENDIF).contains(&opcode) {
            tracing::trace!(target: LOG_TARGET, %opcode, %stack, "Executing opcode");

            match opcode.category() {
                // Handled above.
                OpcodeCategory::Push => {}
                OpcodeCategory::Constant => {
                    if let Some(n) = opcode.small_int() {
                        stack.push_num(n);
                    }
                }
                OpcodeCategory::Control => {
                    flow::eval_flow(opcode, stack, &mut exec_stack, executing, flags)?;
                }
                OpcodeCategory::Stack | OpcodeCategory::Splice | OpcodeCategory::Bitwise => {
                    stack_ops::eval_stack_op(opcode, stack, &mut alt_stack)?;
                }
                OpcodeCategory::Arithmetic => arith::eval_arith(opcode, stack)?,
                OpcodeCategory::Crypto => match opcode {
                    Opcode::OP_CODESEPARATOR => begincode = instruction.end(),
                    Opcode::OP_CHECKSIG | Opcode::OP_CHECKSIGVERIFY => {
                        let script_code = script.subscript(begincode);
                        sig::eval_checksig(opcode, stack, &script_code, flags, checker)?;
                    }
                    Opcode::OP_CHECKMULTISIG | Opcode::OP_CHECKMULTISIGVERIFY => {
                        let script_code = script.subscript(begincode);
                        multisig::eval_checkmultisig(
                            opcode,
                            stack,
                            &script_code,
                            flags,
                            checker,
                            &mut op_count,
                        )?;
                    }
                    _ => crypto::eval_hash(opcode, stack)?,
                },
                OpcodeCategory::Locktime => locktime::eval_locktime(opcode, stack, flags, checker)?,
                OpcodeCategory::Nop => flow::eval_upgradable_nop(flags)?,
                OpcodeCategory::Reserved => return Err(ScriptError::BadOpcode(opcode.to_u8())),
            }
        }

        if stack.len() + alt_stack.len() > MAX_STACK_SIZE {
            return Err(ScriptError::StackSize);
        }
    }

    if !exec_stack.is_empty() {
        return Err(ScriptError::UnbalancedConditional);
    }

    Ok(!stack.is_empty() && stack.peek_bool()?)
}
