use crate::error::ScriptError;
use crate::opcode::Opcode;
use crate::stack::Stack;

/// Handles the stack, splice and bitwise opcodes that are still enabled.
pub(super) fn eval_stack_op(
    opcode: Opcode,
    stack: &mut Stack,
    alt_stack: &mut Stack,
) -> Result<(), ScriptError> {
    match opcode {
        Opcode::OP_TOALTSTACK => {
            alt_stack.push(stack.pop()?);
        }
        Opcode::OP_FROMALTSTACK => {
            let value = alt_stack
                .pop()
                .map_err(|_| ScriptError::InvalidAltStackOperation)?;
            stack.push(value);
        }
        Opcode::OP_2DROP => stack.drop(2)?,
        Opcode::OP_2DUP => stack.dup(2)?,
        Opcode::OP_3DUP => stack.dup(3)?,
        Opcode::OP_2OVER => stack.over(2)?,
        Opcode::OP_2ROT => stack.rot(2)?,
        Opcode::OP_2SWAP => stack.swap(2)?,
        Opcode::OP_IFDUP => {
            if stack.peek_bool()? {
                stack.dup(1)?;
            }
        }
        Opcode::OP_DEPTH => {
            let depth = stack.len() as i64;
            stack.push_num(depth);
        }
        Opcode::OP_DROP => stack.drop(1)?,
        Opcode::OP_DUP => stack.dup(1)?,
        Opcode::OP_NIP => stack.nip()?,
        Opcode::OP_OVER => stack.over(1)?,
        Opcode::OP_PICK | Opcode::OP_ROLL => {
            // (xn ... x2 x1 x0 n - xn ... x2 x1 x0 xn)
            // (xn ... x2 x1 x0 n - ... x2 x1 x0 xn)
            stack.require(2)?;

            let n = stack.pop_num()?.to_i32();

            if n < 0 || n as usize >= stack.len() {
                return Err(ScriptError::InvalidStackOperation);
            }

            let value = if opcode == Opcode::OP_ROLL {
                stack.remove(n as usize)?
            } else {
                stack.top(n as usize)?.clone()
            };

            stack.push(value);
        }
        Opcode::OP_ROT => stack.rot(1)?,
        Opcode::OP_SWAP => stack.swap(1)?,
        Opcode::OP_TUCK => stack.tuck()?,
        Opcode::OP_SIZE => {
            let size = stack.last()?.len() as i64;
            stack.push_num(size);
        }
        Opcode::OP_EQUAL | Opcode::OP_EQUALVERIFY => {
            stack.require(2)?;

            let x1 = stack.pop()?;
            let x2 = stack.pop()?;
            let equal = x1 == x2;

            if opcode == Opcode::OP_EQUALVERIFY {
                if !equal {
                    return Err(ScriptError::EqualVerify);
                }
            } else {
                stack.push_bool(equal);
            }
        }
        _ => return Err(ScriptError::BadOpcode(opcode.to_u8())),
    }

    Ok(())
}
