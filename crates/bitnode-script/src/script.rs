//! Script byte code and its decomposition into opcodes and push data.

use crate::constants::MAX_PUBKEYS_PER_MULTISIG;
use crate::num::ScriptNum;
use crate::opcode::Opcode;
use std::fmt;

/// Script decoding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The length prefix of `OP_PUSHDATA1/2/4` is cut off.
    #[error("truncated push length prefix at offset {offset}")]
    TruncatedLength { offset: usize },
    /// A push declares more data than remains in the script.
    #[error("push at offset {offset} declares {declared} bytes, only {available} available")]
    PushOverrun {
        offset: usize,
        declared: usize,
        available: usize,
    },
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedOpCode<'a> {
    /// Raw opcode byte.
    pub opcode: u8,
    /// Push data, empty for non-push opcodes.
    pub data: &'a [u8],
    /// Byte offset of the opcode within the script.
    pub offset: usize,
    /// Encoded length including the opcode byte and any length prefix.
    pub len: usize,
}

impl ParsedOpCode<'_> {
    /// Returns the typed opcode, `None` for unassigned byte values.
    pub fn op(&self) -> Option<Opcode> {
        Opcode::from_u8(self.opcode)
    }

    /// Whether this is a data push (`OP_0` through `OP_PUSHDATA4`).
    pub fn is_push(&self) -> bool {
        self.opcode <= Opcode::OP_PUSHDATA4.to_u8()
    }

    /// Offset of the byte following this instruction.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Checks that the push data was pushed with the shortest possible opcode.
    pub fn check_minimal_push(&self) -> bool {
        let data = self.data;
        let opcode = self.opcode;

        if data.is_empty() {
            // Should have used OP_0.
            return opcode == Opcode::OP_0.to_u8();
        }
        if data.len() == 1 && (1..=16).contains(&data[0]) {
            // Should have used OP_1 .. OP_16.
            return false;
        }
        if data.len() == 1 && data[0] == 0x81 {
            // Should have used OP_1NEGATE.
            return false;
        }
        if data.len() <= 75 {
            return usize::from(opcode) == data.len();
        }
        if data.len() <= 255 {
            return opcode == Opcode::OP_PUSHDATA1.to_u8();
        }
        if data.len() <= 65535 {
            return opcode == Opcode::OP_PUSHDATA2.to_u8();
        }
        true
    }
}

/// Lazy decoder over the instructions of a script.
///
/// Yields one error and then stops when the script is malformed.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    bytes: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Instructions<'a> {
    fn decode_next(&mut self) -> Result<ParsedOpCode<'a>, DecodeError> {
        let offset = self.pos;
        let opcode = self.bytes[offset];
        let rest = &self.bytes[offset + 1..];

        let (prefix, declared) = match opcode {
            0x00..=0x4b => (0, usize::from(opcode)),
            0x4c => (1, read_le(rest, 1, offset)?),
            0x4d => (2, read_le(rest, 2, offset)?),
            0x4e => (4, read_le(rest, 4, offset)?),
            _ => {
                self.pos += 1;
                return Ok(ParsedOpCode {
                    opcode,
                    data: &[],
                    offset,
                    len: 1,
                });
            }
        };

        let available = rest.len() - prefix;
        if declared > available {
            return Err(DecodeError::PushOverrun {
                offset,
                declared,
                available,
            });
        }

        let len = 1 + prefix + declared;
        self.pos += len;

        Ok(ParsedOpCode {
            opcode,
            data: &rest[prefix..prefix + declared],
            offset,
            len,
        })
    }
}

fn read_le(bytes: &[u8], width: usize, offset: usize) -> Result<usize, DecodeError> {
    let prefix = bytes
        .get(..width)
        .ok_or(DecodeError::TruncatedLength { offset })?;
    Ok(prefix
        .iter()
        .rev()
        .fold(0usize, |acc, &b| (acc << 8) | usize::from(b)))
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<ParsedOpCode<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.bytes.len() {
            return None;
        }
        let item = self.decode_next();
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

/// An immutable script program.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Script {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&bitcoin::Script> for Script {
    fn from(script: &bitcoin::Script) -> Self {
        Self(script.as_bytes().to_vec())
    }
}

impl From<Script> for bitcoin::ScriptBuf {
    fn from(script: Script) -> Self {
        bitcoin::ScriptBuf::from_bytes(script.0)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the script starting at byte `offset`.
    pub fn subscript(&self, offset: usize) -> Script {
        Self(self.0.get(offset..).unwrap_or_default().to_vec())
    }

    /// Iterates over the instructions, decoding lazily.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            bytes: &self.0,
            pos: 0,
            done: false,
        }
    }

    /// Decodes the whole script.
    pub fn parse(&self) -> Result<Vec<ParsedOpCode<'_>>, DecodeError> {
        self.instructions().collect()
    }

    /// Whether the script consists only of push opcodes (`OP_16` or lower).
    ///
    /// The empty script is not push-only.
    pub fn is_push_only(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.instructions().all(|instruction| {
            instruction.is_ok_and(|op| op.opcode <= Opcode::OP_16.to_u8())
        })
    }

    /// Matches exactly `OP_HASH160 <20 bytes> OP_EQUAL`.
    pub fn is_p2sh(&self) -> bool {
        self.0.len() == 23
            && self.0[0] == Opcode::OP_HASH160.to_u8()
            && self.0[1] == Opcode::OP_PUSHBYTES_20.to_u8()
            && self.0[22] == Opcode::OP_EQUAL.to_u8()
    }

    /// Counts signature operations.
    ///
    /// `CHECKMULTISIG` counts as the preceding `OP_1..OP_16` value when
    /// `accurate` is set, otherwise as [`MAX_PUBKEYS_PER_MULTISIG`].
    /// Counting stops at the first malformed push.
    pub fn sig_op_count(&self, accurate: bool) -> usize {
        let mut count = 0;
        let mut last_opcode = None;

        for instruction in self.instructions() {
            let Ok(instruction) = instruction else {
                break;
            };

            match instruction.op() {
                Some(Opcode::OP_CHECKSIG | Opcode::OP_CHECKSIGVERIFY) => count += 1,
                Some(Opcode::OP_CHECKMULTISIG | Opcode::OP_CHECKMULTISIGVERIFY) => {
                    count += match last_opcode.and_then(Opcode::small_int) {
                        Some(n @ 1..=16) if accurate => n as usize,
                        _ => MAX_PUBKEYS_PER_MULTISIG,
                    };
                }
                _ => {}
            }

            last_opcode = instruction.op();
        }

        count
    }

    /// Counts the signature operations of the redeem script carried by
    /// `script_sig` when `self` is a P2SH output.
    pub fn p2sh_sig_op_count(&self, script_sig: &Script) -> usize {
        if !self.is_p2sh() {
            return self.sig_op_count(true);
        }

        let mut redeem_script = None;
        for instruction in script_sig.instructions() {
            match instruction {
                Ok(op) if op.opcode <= Opcode::OP_16.to_u8() => redeem_script = Some(op.data),
                _ => return 0,
            }
        }

        redeem_script
            .map(|data| Script::from(data).sig_op_count(true))
            .unwrap_or_default()
    }

    /// Removes every occurrence of `pattern` that starts on an instruction
    /// boundary. Returns the resulting script and the number of matches.
    pub fn find_and_delete(&self, pattern: &[u8]) -> (Script, usize) {
        if pattern.is_empty() {
            return (self.clone(), 0);
        }

        let bytes = self.as_bytes();
        let mut result = Vec::with_capacity(bytes.len());
        let mut found = 0;
        let mut pc = 0;
        let mut kept_from = 0;

        loop {
            result.extend_from_slice(&bytes[kept_from..pc]);
            while bytes[pc..].starts_with(pattern) {
                pc += pattern.len();
                found += 1;
            }
            kept_from = pc;

            match next_instruction_end(bytes, pc) {
                Some(end) => pc = end,
                None => break,
            }
        }

        if found == 0 {
            return (self.clone(), 0);
        }

        result.extend_from_slice(&bytes[kept_from..]);
        (Script(result), found)
    }

    /// Returns a copy with all `OP_CODESEPARATOR` instructions removed.
    pub fn without_codeseparators(&self) -> Script {
        let bytes = self.as_bytes();
        let mut result = Vec::with_capacity(bytes.len());

        for instruction in self.instructions() {
            match instruction {
                Ok(op) if op.opcode == Opcode::OP_CODESEPARATOR.to_u8() => {}
                Ok(op) => result.extend_from_slice(&bytes[op.offset..op.end()]),
                Err(err) => {
                    let offset = match err {
                        DecodeError::TruncatedLength { offset }
                        | DecodeError::PushOverrun { offset, .. } => offset,
                    };
                    result.extend_from_slice(&bytes[offset..]);
                }
            }
        }

        Script(result)
    }
}

fn next_instruction_end(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut instructions = Instructions {
        bytes,
        pos,
        done: false,
    };
    match instructions.next() {
        Some(Ok(op)) => Some(op.end()),
        _ => None,
    }
}

/// Serializes `data` as a single push instruction using the shortest encoding.
pub fn push_data_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 5);
    match data.len() {
        len @ 0..=75 => out.push(len as u8),
        len @ 76..=0xff => {
            out.push(Opcode::OP_PUSHDATA1.to_u8());
            out.push(len as u8);
        }
        len @ 0x100..=0xffff => {
            out.push(Opcode::OP_PUSHDATA2.to_u8());
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }
        len => {
            out.push(Opcode::OP_PUSHDATA4.to_u8());
            out.extend_from_slice(&(len as u32).to_le_bytes());
        }
    }
    out.extend_from_slice(data);
    out
}

/// Incrementally constructs a [`Script`].
#[derive(Debug, Clone, Default)]
pub struct Builder(Vec<u8>);

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(mut self, opcode: Opcode) -> Self {
        self.0.push(opcode.to_u8());
        self
    }

    /// Pushes data with the shortest push opcode. Single bytes that have a
    /// dedicated small-integer opcode are still pushed as data.
    pub fn push_slice(mut self, data: &[u8]) -> Self {
        self.0.extend(push_data_bytes(data));
        self
    }

    /// Pushes `n` the way a minimal script would: small-integer opcodes for
    /// `-1..=16`, minimally encoded data otherwise.
    pub fn push_int(self, n: i64) -> Self {
        match Opcode::from_small_int(n) {
            Some(opcode) => self.push_opcode(opcode),
            None => self.push_slice(&ScriptNum::from(n).to_bytes()),
        }
    }

    /// Appends raw bytes verbatim.
    pub fn push_raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn into_script(self) -> Script {
        Script(self.0)
    }
}
