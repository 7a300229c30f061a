//! Script opcodes.

use std::fmt;

macro_rules! define_opcodes {
    ($($name:ident = $value:literal),* $(,)?) => {
        /// Every defined script opcode.
        ///
        /// Byte values `0xba..=0xff` are not assigned and have no variant.
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $($name = $value),*
        }

        impl Opcode {
            /// Returns the opcode for `byte`, `None` for unassigned values.
            pub const fn from_u8(byte: u8) -> Option<Self> {
                match byte {
                    $($value => Some(Self::$name),)*
                    _ => None,
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }
    };
}

define_opcodes! {
    OP_0 = 0x00,
    OP_PUSHBYTES_1 = 0x01, OP_PUSHBYTES_2 = 0x02, OP_PUSHBYTES_3 = 0x03, OP_PUSHBYTES_4 = 0x04,
    OP_PUSHBYTES_5 = 0x05, OP_PUSHBYTES_6 = 0x06, OP_PUSHBYTES_7 = 0x07, OP_PUSHBYTES_8 = 0x08,
    OP_PUSHBYTES_9 = 0x09, OP_PUSHBYTES_10 = 0x0a, OP_PUSHBYTES_11 = 0x0b, OP_PUSHBYTES_12 = 0x0c,
    OP_PUSHBYTES_13 = 0x0d, OP_PUSHBYTES_14 = 0x0e, OP_PUSHBYTES_15 = 0x0f, OP_PUSHBYTES_16 = 0x10,
    OP_PUSHBYTES_17 = 0x11, OP_PUSHBYTES_18 = 0x12, OP_PUSHBYTES_19 = 0x13, OP_PUSHBYTES_20 = 0x14,
    OP_PUSHBYTES_21 = 0x15, OP_PUSHBYTES_22 = 0x16, OP_PUSHBYTES_23 = 0x17, OP_PUSHBYTES_24 = 0x18,
    OP_PUSHBYTES_25 = 0x19, OP_PUSHBYTES_26 = 0x1a, OP_PUSHBYTES_27 = 0x1b, OP_PUSHBYTES_28 = 0x1c,
    OP_PUSHBYTES_29 = 0x1d, OP_PUSHBYTES_30 = 0x1e, OP_PUSHBYTES_31 = 0x1f, OP_PUSHBYTES_32 = 0x20,
    OP_PUSHBYTES_33 = 0x21, OP_PUSHBYTES_34 = 0x22, OP_PUSHBYTES_35 = 0x23, OP_PUSHBYTES_36 = 0x24,
    OP_PUSHBYTES_37 = 0x25, OP_PUSHBYTES_38 = 0x26, OP_PUSHBYTES_39 = 0x27, OP_PUSHBYTES_40 = 0x28,
    OP_PUSHBYTES_41 = 0x29, OP_PUSHBYTES_42 = 0x2a, OP_PUSHBYTES_43 = 0x2b, OP_PUSHBYTES_44 = 0x2c,
    OP_PUSHBYTES_45 = 0x2d, OP_PUSHBYTES_46 = 0x2e, OP_PUSHBYTES_47 = 0x2f, OP_PUSHBYTES_48 = 0x30,
    OP_PUSHBYTES_49 = 0x31, OP_PUSHBYTES_50 = 0x32, OP_PUSHBYTES_51 = 0x33, OP_PUSHBYTES_52 = 0x34,
    OP_PUSHBYTES_53 = 0x35, OP_PUSHBYTES_54 = 0x36, OP_PUSHBYTES_55 = 0x37, OP_PUSHBYTES_56 = 0x38,
    OP_PUSHBYTES_57 = 0x39, OP_PUSHBYTES_58 = 0x3a, OP_PUSHBYTES_59 = 0x3b, OP_PUSHBYTES_60 = 0x3c,
    OP_PUSHBYTES_61 = 0x3d, OP_PUSHBYTES_62 = 0x3e, OP_PUSHBYTES_63 = 0x3f, OP_PUSHBYTES_64 = 0x40,
    OP_PUSHBYTES_65 = 0x41, OP_PUSHBYTES_66 = 0x42, OP_PUSHBYTES_67 = 0x43, OP_PUSHBYTES_68 = 0x44,
    OP_PUSHBYTES_69 = 0x45, OP_PUSHBYTES_70 = 0x46, OP_PUSHBYTES_71 = 0x47, OP_PUSHBYTES_72 = 0x48,
    OP_PUSHBYTES_73 = 0x49, OP_PUSHBYTES_74 = 0x4a, OP_PUSHBYTES_75 = 0x4b,
    OP_PUSHDATA1 = 0x4c, OP_PUSHDATA2 = 0x4d, OP_PUSHDATA4 = 0x4e,

    // Constants
    OP_1NEGATE = 0x4f,
    OP_RESERVED = 0x50,
    OP_1 = 0x51, OP_2 = 0x52, OP_3 = 0x53, OP_4 = 0x54, OP_5 = 0x55, OP_6 = 0x56,
    OP_7 = 0x57, OP_8 = 0x58, OP_9 = 0x59, OP_10 = 0x5a, OP_11 = 0x5b, OP_12 = 0x5c,
    OP_13 = 0x5d, OP_14 = 0x5e, OP_15 = 0x5f, OP_16 = 0x60,

    // Flow control
    OP_NOP = 0x61, OP_VER = 0x62, OP_IF = 0x63, OP_NOTIF = 0x64, OP_VERIF = 0x65,
    OP_VERNOTIF = 0x66, OP_ELSE = 0x67, OP_ENDIF = 0x68, OP_VERIFY = 0x69, OP_RETURN = 0x6a,

    // Stack
    OP_TOALTSTACK = 0x6b, OP_FROMALTSTACK = 0x6c, OP_2DROP = 0x6d, OP_2DUP = 0x6e,
    OP_3DUP = 0x6f, OP_2OVER = 0x70, OP_2ROT = 0x71, OP_2SWAP = 0x72, OP_IFDUP = 0x73,
    OP_DEPTH = 0x74, OP_DROP = 0x75, OP_DUP = 0x76, OP_NIP = 0x77, OP_OVER = 0x78,
    OP_PICK = 0x79, OP_ROLL = 0x7a, OP_ROT = 0x7b, OP_SWAP = 0x7c, OP_TUCK = 0x7d,

    // Splice
    OP_CAT = 0x7e, OP_SUBSTR = 0x7f, OP_LEFT = 0x80, OP_RIGHT = 0x81, OP_SIZE = 0x82,

    // Bitwise logic
    OP_INVERT = 0x83, OP_AND = 0x84, OP_OR = 0x85, OP_XOR = 0x86, OP_EQUAL = 0x87,
    OP_EQUALVERIFY = 0x88, OP_RESERVED1 = 0x89, OP_RESERVED2 = 0x8a,

    // Arithmetic
    OP_1ADD = 0x8b, OP_1SUB = 0x8c, OP_2MUL = 0x8d, OP_2DIV = 0x8e, OP_NEGATE = 0x8f,
    OP_ABS = 0x90, OP_NOT = 0x91, OP_0NOTEQUAL = 0x92, OP_ADD = 0x93, OP_SUB = 0x94,
    OP_MUL = 0x95, OP_DIV = 0x96, OP_MOD = 0x97, OP_LSHIFT = 0x98, OP_RSHIFT = 0x99,
    OP_BOOLAND = 0x9a, OP_BOOLOR = 0x9b, OP_NUMEQUAL = 0x9c, OP_NUMEQUALVERIFY = 0x9d,
    OP_NUMNOTEQUAL = 0x9e, OP_LESSTHAN = 0x9f, OP_GREATERTHAN = 0xa0,
    OP_LESSTHANOREQUAL = 0xa1, OP_GREATERTHANOREQUAL = 0xa2, OP_MIN = 0xa3, OP_MAX = 0xa4,
    OP_WITHIN = 0xa5,

    // Crypto
    OP_RIPEMD160 = 0xa6, OP_SHA1 = 0xa7, OP_SHA256 = 0xa8, OP_HASH160 = 0xa9,
    OP_HASH256 = 0xaa, OP_CODESEPARATOR = 0xab, OP_CHECKSIG = 0xac,
    OP_CHECKSIGVERIFY = 0xad, OP_CHECKMULTISIG = 0xae, OP_CHECKMULTISIGVERIFY = 0xaf,

    // Expansion
    OP_NOP1 = 0xb0, OP_CHECKLOCKTIMEVERIFY = 0xb1, OP_CHECKSEQUENCEVERIFY = 0xb2,
    OP_NOP4 = 0xb3, OP_NOP5 = 0xb4, OP_NOP6 = 0xb5, OP_NOP7 = 0xb6, OP_NOP8 = 0xb7,
    OP_NOP9 = 0xb8, OP_NOP10 = 0xb9,
}

/// Coarse grouping of opcodes, each group handled by its own evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeCategory {
    /// Data pushes, `OP_0` through `OP_PUSHDATA4`.
    Push,
    /// `OP_1NEGATE` and `OP_1` through `OP_16`.
    Constant,
    Control,
    Stack,
    Splice,
    Bitwise,
    Arithmetic,
    Crypto,
    Locktime,
    /// Upgradable no-ops.
    Nop,
    /// Opcodes that fail the script whenever executed.
    Reserved,
}

impl Opcode {
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn category(self) -> OpcodeCategory {
        use Opcode::*;

        match self as u8 {
            0x00..=0x4e => OpcodeCategory::Push,
            _ => match self {
                OP_1NEGATE | OP_1 | OP_2 | OP_3 | OP_4 | OP_5 | OP_6 | OP_7 | OP_8 | OP_9
                | OP_10 | OP_11 | OP_12 | OP_13 | OP_14 | OP_15 | OP_16 => OpcodeCategory::Constant,
                OP_NOP | OP_IF | OP_NOTIF | OP_ELSE | OP_ENDIF | OP_VERIFY | OP_RETURN => {
                    OpcodeCategory::Control
                }
                OP_TOALTSTACK | OP_FROMALTSTACK | OP_2DROP | OP_2DUP | OP_3DUP | OP_2OVER
                | OP_2ROT | OP_2SWAP | OP_IFDUP | OP_DEPTH | OP_DROP | OP_DUP | OP_NIP
                | OP_OVER | OP_PICK | OP_ROLL | OP_ROT | OP_SWAP | OP_TUCK => {
                    OpcodeCategory::Stack
                }
                OP_CAT | OP_SUBSTR | OP_LEFT | OP_RIGHT | OP_SIZE => OpcodeCategory::Splice,
                OP_INVERT | OP_AND | OP_OR | OP_XOR | OP_EQUAL | OP_EQUALVERIFY => {
                    OpcodeCategory::Bitwise
                }
                OP_1ADD | OP_1SUB | OP_2MUL | OP_2DIV | OP_NEGATE | OP_ABS | OP_NOT
                | OP_0NOTEQUAL | OP_ADD | OP_SUB | OP_MUL | OP_DIV | OP_MOD | OP_LSHIFT
                | OP_RSHIFT | OP_BOOLAND | OP_BOOLOR | OP_NUMEQUAL | OP_NUMEQUALVERIFY
                | OP_NUMNOTEQUAL | OP_LESSTHAN | OP_GREATERTHAN | OP_LESSTHANOREQUAL
                | OP_GREATERTHANOREQUAL | OP_MIN | OP_MAX | OP_WITHIN => {
                    OpcodeCategory::Arithmetic
                }
                OP_RIPEMD160 | OP_SHA1 | OP_SHA256 | OP_HASH160 | OP_HASH256
                | OP_CODESEPARATOR | OP_CHECKSIG | OP_CHECKSIGVERIFY | OP_CHECKMULTISIG
                | OP_CHECKMULTISIGVERIFY => OpcodeCategory::Crypto,
                OP_CHECKLOCKTIMEVERIFY | OP_CHECKSEQUENCEVERIFY => OpcodeCategory::Locktime,
                OP_NOP1 | OP_NOP4 | OP_NOP5 | OP_NOP6 | OP_NOP7 | OP_NOP8 | OP_NOP9
                | OP_NOP10 => OpcodeCategory::Nop,
                _ => OpcodeCategory::Reserved,
            },
        }
    }

    /// Opcodes removed from the language; they fail a script even inside an
    /// unexecuted branch.
    pub const fn is_disabled(self) -> bool {
        use Opcode::*;

        matches!(
            self,
            OP_CAT
                | OP_SUBSTR
                | OP_LEFT
                | OP_RIGHT
                | OP_INVERT
                | OP_AND
                | OP_OR
                | OP_XOR
                | OP_2MUL
                | OP_2DIV
                | OP_MUL
                | OP_DIV
                | OP_MOD
                | OP_LSHIFT
                | OP_RSHIFT
        )
    }

    /// Returns the value of `OP_0`, `OP_1NEGATE` and `OP_1`..`OP_16`.
    pub const fn small_int(self) -> Option<i64> {
        match self as u8 {
            0x00 => Some(0),
            0x4f => Some(-1),
            v @ 0x51..=0x60 => Some((v - 0x50) as i64),
            _ => None,
        }
    }

    /// Returns the opcode pushing the small integer `n` in `-1..=16`.
    pub fn from_small_int(n: i64) -> Option<Self> {
        match n {
            0 => Some(Self::OP_0),
            -1 => Some(Self::OP_1NEGATE),
            1..=16 => Self::from_u8(0x50 + n as u8),
            _ => None,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
