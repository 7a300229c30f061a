use crate::error::ScriptError;
use crate::num::ScriptNum;
use crate::opcode::Opcode;
use crate::stack::Stack;

/// Handles the enabled arithmetic opcodes. Operands are at most four bytes.
pub(super) fn eval_arith(opcode: Opcode, stack: &mut Stack) -> Result<(), ScriptError> {
    match opcode {
        Opcode::OP_1ADD
        | Opcode::OP_1SUB
        | Opcode::OP_NEGATE
        | Opcode::OP_ABS
        | Opcode::OP_NOT
        | Opcode::OP_0NOTEQUAL => {
            // (in -- out)
            stack.require(1)?;

            let n = stack.pop_num()?;
            let one = ScriptNum::from(1i64);

            let result = match opcode {
                Opcode::OP_1ADD => (n + one)?,
                Opcode::OP_1SUB => (n - one)?,
                Opcode::OP_NEGATE => (-n)?,
                Opcode::OP_ABS => n.abs()?,
                Opcode::OP_NOT => ScriptNum::from(n.is_zero()),
                _ => ScriptNum::from(!n.is_zero()),
            };

            stack.push_num(result);
        }
        Opcode::OP_WITHIN => {
            // (x min max -- out)
            stack.require(3)?;

            let max = stack.pop_num()?;
            let min = stack.pop_num()?;
            let x = stack.pop_num()?;

            stack.push_bool(min <= x && x < max);
        }
        _ => {
            // (x1 x2 -- out)
            stack.require(2)?;

            let b = stack.pop_num()?;
            let a = stack.pop_num()?;

            match opcode {
                Opcode::OP_ADD => {
                    stack.push_num((a + b)?);
                }
                Opcode::OP_SUB => {
                    stack.push_num((a - b)?);
                }
                Opcode::OP_BOOLAND => {
                    stack.push_bool(!a.is_zero() && !b.is_zero());
                }
                Opcode::OP_BOOLOR => {
                    stack.push_bool(!a.is_zero() || !b.is_zero());
                }
                Opcode::OP_NUMEQUAL => {
                    stack.push_bool(a == b);
                }
                Opcode::OP_NUMEQUALVERIFY => {
                    if a != b {
                        return Err(ScriptError::NumEqualVerify);
                    }
                }
                Opcode::OP_NUMNOTEQUAL => {
                    stack.push_bool(a != b);
                }
                Opcode::OP_LESSTHAN => {
                    stack.push_bool(a < b);
                }
                Opcode::OP_GREATERTHAN => {
                    stack.push_bool(a > b);
                }
                Opcode::OP_LESSTHANOREQUAL => {
                    stack.push_bool(a <= b);
                }
                Opcode::OP_GREATERTHANOREQUAL => {
                    stack.push_bool(a >= b);
                }
                Opcode::OP_MIN => {
                    stack.push_num(a.min(b));
                }
                Opcode::OP_MAX => {
                    stack.push_num(a.max(b));
                }
                _ => return Err(ScriptError::BadOpcode(opcode.to_u8())),
            }
        }
    }

    Ok(())
}
