use crate::error::ScriptError;
use crate::opcode::Opcode;
use crate::stack::Stack;
use bitcoin::hashes::{hash160, ripemd160, sha1, sha256, sha256d, Hash};

/// Replaces the top stack item with its digest.
pub(super) fn eval_hash(opcode: Opcode, stack: &mut Stack) -> Result<(), ScriptError> {
    let data = stack.pop()?;

    let digest = match opcode {
        Opcode::OP_RIPEMD160 => ripemd160::Hash::hash(&data).to_byte_array().to_vec(),
        Opcode::OP_SHA1 => sha1::Hash::hash(&data).to_byte_array().to_vec(),
        Opcode::OP_SHA256 => sha256::Hash::hash(&data).to_byte_array().to_vec(),
        Opcode::OP_HASH160 => hash160::Hash::hash(&data).to_byte_array().to_vec(),
        Opcode::OP_HASH256 => sha256d::Hash::hash(&data).to_byte_array().to_vec(),
        _ => return Err(ScriptError::BadOpcode(opcode.to_u8())),
    };

    stack.push(digest);

    Ok(())
}
