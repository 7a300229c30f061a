use crate::num::{NumError, ScriptNum};
use crate::opcode::Opcode::{self, *};
use crate::script::{push_data_bytes, Builder, DecodeError, Script};
use crate::signature_checker::{NoSignatureCheck, SignatureChecker};
use crate::stack::Stack;
use crate::{eval_script, ScriptError, VerifyFlags, MAX_OPS_PER_SCRIPT, MAX_STACK_SIZE};

struct EvalResult {
    /// Result of [`eval_script`].
    result: Result<bool, ScriptError>,
    /// Stack after the evaluation if no error occurs.
    expected_stack: Option<Stack>,
}

impl EvalResult {
    fn ok(success: bool, stack: Stack) -> Self {
        Self {
            result: Ok(success),
            expected_stack: Some(stack),
        }
    }

    fn err(err: impl Into<ScriptError>) -> Self {
        Self {
            result: Err(err.into()),
            expected_stack: None,
        }
    }
}

fn basic_test(script: &Script, eval_result: EvalResult) {
    basic_test_with_flags(script, VerifyFlags::P2SH, eval_result)
}

fn basic_test_with_flags(script: &Script, flags: VerifyFlags, eval_result: EvalResult) {
    super::init_logger();

    let EvalResult {
        result: expected,
        expected_stack,
    } = eval_result;

    let mut checker = NoSignatureCheck;
    let mut stack = Stack::empty();
    let eval_script_result = eval_script(&mut stack, script, &flags, &mut checker);
    assert_eq!(eval_script_result, expected);
    if expected.is_ok() {
        let expected_stack =
            expected_stack.expect("Expected stack must be Some if eval result is ok");
        assert_eq!(stack, expected_stack);
    }
}

fn repeat(opcode: Opcode, n: usize) -> Builder {
    (0..n).fold(Builder::new(), |builder, _| builder.push_opcode(opcode))
}

#[test]
fn test_equal() {
    let script = Builder::new()
        .push_slice(&[0x4])
        .push_slice(&[0x4])
        .push_opcode(OP_EQUAL)
        .into_script();
    let result = EvalResult::ok(true, Stack::from(vec![vec![1]]));
    basic_test(&script, result);
}

#[test]
fn test_equal_false() {
    let script = Builder::default()
        .push_slice(&[0x4])
        .push_slice(&[0x3])
        .push_opcode(OP_EQUAL)
        .into_script();
    let result = EvalResult::ok(false, Stack::from(vec![vec![]]));
    basic_test(&script, result);
}

#[test]
fn test_equal_invalid_stack() {
    let script = Builder::default()
        .push_slice(&[0x4])
        .push_opcode(OP_EQUAL)
        .into_script();
    let result = EvalResult::err(ScriptError::InvalidStackOperation);
    basic_test(&script, result);
}

#[test]
fn test_equal_verify() {
    let script = Builder::default()
        .push_slice(&[0x4])
        .push_slice(&[0x4])
        .push_opcode(OP_EQUALVERIFY)
        .into_script();
    let result = EvalResult::ok(false, Stack::empty());
    basic_test(&script, result);
}

#[test]
fn test_equal_verify_failed() {
    let script = Builder::default()
        .push_slice(&[0x4])
        .push_slice(&[0x3])
        .push_opcode(OP_EQUALVERIFY)
        .into_script();
    let result = EvalResult::err(ScriptError::EqualVerify);
    basic_test(&script, result);
}

#[test]
fn test_size() {
    let script = Builder::default()
        .push_slice(&[0x12, 0x34])
        .push_opcode(OP_SIZE)
        .into_script();
    let mut stack = Stack::empty();
    stack.push(vec![0x12, 0x34]).push(vec![0x2]);
    basic_test(&script, EvalResult::ok(true, stack));
}

#[test]
fn test_hash256() {
    let script = Builder::default()
        .push_slice(b"hello")
        .push_opcode(OP_HASH256)
        .into_script();
    let digest =
        hex::decode("9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50").unwrap();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![digest])));
}

#[test]
fn test_arithmetic_script() {
    // 2 + 3 == 5
    let script = Builder::new()
        .push_int(2)
        .push_int(3)
        .push_opcode(OP_ADD)
        .push_int(5)
        .push_opcode(OP_NUMEQUAL)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![1]])));

    let script = Builder::new()
        .push_int(-1)
        .push_opcode(OP_ABS)
        .push_int(1000)
        .push_opcode(OP_SUB)
        .into_script();
    basic_test(
        &script,
        EvalResult::ok(true, Stack::from(vec![ScriptNum::from(-999i64).to_bytes()])),
    );
}

#[test]
fn test_if_else_endif() {
    let script = Builder::new()
        .push_int(1)
        .push_opcode(OP_IF)
        .push_int(2)
        .push_opcode(OP_ELSE)
        .push_int(3)
        .push_opcode(OP_ENDIF)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![2]])));

    let script = Builder::new()
        .push_int(0)
        .push_opcode(OP_IF)
        .push_int(2)
        .push_opcode(OP_ELSE)
        .push_int(3)
        .push_opcode(OP_ENDIF)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![3]])));
}

#[test]
fn test_nested_if() {
    // 0 IF 1 IF RETURN ENDIF ELSE 7 ENDIF
    let script = Builder::new()
        .push_int(0)
        .push_opcode(OP_IF)
        .push_int(1)
        .push_opcode(OP_IF)
        .push_opcode(OP_RETURN)
        .push_opcode(OP_ENDIF)
        .push_opcode(OP_ELSE)
        .push_int(7)
        .push_opcode(OP_ENDIF)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![7]])));

    // 1 NOTIF 5 ENDIF
    let script = Builder::new()
        .push_int(1)
        .push_opcode(OP_NOTIF)
        .push_int(5)
        .push_opcode(OP_ENDIF)
        .into_script();
    basic_test(&script, EvalResult::ok(false, Stack::empty()));
}

#[test]
fn test_multiple_else() {
    // Each ELSE toggles the branch.
    let script = Builder::new()
        .push_int(1)
        .push_opcode(OP_IF)
        .push_int(2)
        .push_opcode(OP_ELSE)
        .push_int(3)
        .push_opcode(OP_ELSE)
        .push_int(4)
        .push_opcode(OP_ENDIF)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![2], vec![4]])));
}

#[test]
fn test_unbalanced_conditional() {
    let script = Builder::new().push_int(1).push_opcode(OP_IF).into_script();
    basic_test(&script, EvalResult::err(ScriptError::UnbalancedConditional));

    let script = Builder::new().push_opcode(OP_ENDIF).into_script();
    basic_test(&script, EvalResult::err(ScriptError::UnbalancedConditional));

    let script = Builder::new().push_opcode(OP_IF).into_script();
    basic_test(&script, EvalResult::err(ScriptError::UnbalancedConditional));
}

#[test]
fn test_op_return() {
    let script = Builder::new()
        .push_int(1)
        .push_opcode(OP_RETURN)
        .into_script();
    basic_test(&script, EvalResult::err(ScriptError::OpReturn));

    // Not executed.
    let script = Builder::new()
        .push_int(0)
        .push_opcode(OP_IF)
        .push_opcode(OP_RETURN)
        .push_opcode(OP_ENDIF)
        .push_int(1)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![1]])));
}

#[test]
fn test_disabled_opcode_in_unexecuted_branch() {
    let script = Builder::new()
        .push_int(0)
        .push_opcode(OP_IF)
        .push_opcode(OP_CAT)
        .push_opcode(OP_ENDIF)
        .push_int(1)
        .into_script();
    basic_test(&script, EvalResult::err(ScriptError::DisabledOpcode(OP_CAT)));
}

#[test]
fn test_bad_opcodes() {
    // Unassigned and reserved opcodes only fail when executed.
    for raw in [0xba, 0xff, OP_RESERVED.to_u8(), OP_VER.to_u8(), OP_RESERVED2.to_u8()] {
        let skipped = Builder::new()
            .push_int(0)
            .push_opcode(OP_IF)
            .push_raw(&[raw])
            .push_opcode(OP_ENDIF)
            .push_int(1)
            .into_script();
        basic_test(&skipped, EvalResult::ok(true, Stack::from(vec![vec![1]])));

        let executed = Builder::new().push_int(1).push_raw(&[raw]).into_script();
        basic_test(&executed, EvalResult::err(ScriptError::BadOpcode(raw)));
    }

    // OP_VERIF and OP_VERNOTIF fail even when not executed.
    for opcode in [OP_VERIF, OP_VERNOTIF] {
        let script = Builder::new()
            .push_int(0)
            .push_opcode(OP_IF)
            .push_opcode(opcode)
            .push_opcode(OP_ENDIF)
            .push_int(1)
            .into_script();
        basic_test(&script, EvalResult::err(ScriptError::BadOpcode(opcode.to_u8())));
    }
}

#[test]
fn test_push_size() {
    let script = Builder::new().push_slice(&[0u8; 520]).into_script();
    basic_test(&script, EvalResult::ok(false, Stack::from(vec![vec![0u8; 520]])));

    // Oversized pushes fail even in unexecuted branches.
    let script = Builder::new()
        .push_int(0)
        .push_opcode(OP_IF)
        .push_slice(&[0u8; 521])
        .push_opcode(OP_ENDIF)
        .into_script();
    basic_test(&script, EvalResult::err(ScriptError::PushSize));
}

#[test]
fn test_op_count() {
    let script = repeat(OP_NOP, MAX_OPS_PER_SCRIPT).push_int(1).into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![1]])));

    let script = repeat(OP_NOP, MAX_OPS_PER_SCRIPT + 1).push_int(1).into_script();
    basic_test(&script, EvalResult::err(ScriptError::OpCount));

    // Pushes do not count.
    let script = repeat(OP_1, 300)
        .push_opcode(OP_2DROP)
        .into_script();
    let stack = Stack::from(vec![vec![1]; 298]);
    basic_test(&script, EvalResult::ok(true, stack));
}

#[test]
fn test_script_size() {
    let script = Script::from(vec![OP_NOP.to_u8(); 10_001]);
    basic_test(&script, EvalResult::err(ScriptError::ScriptSize));
}

#[test]
fn test_stack_size() {
    let script = repeat(OP_1, MAX_STACK_SIZE).into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![1]; MAX_STACK_SIZE])));

    let script = repeat(OP_1, MAX_STACK_SIZE - 1)
        .push_opcode(OP_TOALTSTACK)
        .push_int(1)
        .push_int(1)
        .into_script();
    basic_test(&script, EvalResult::err(ScriptError::StackSize));
}

#[test]
fn test_minimal_data() {
    let script = Script::from(vec![OP_PUSHBYTES_1.to_u8(), 0x05]);
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![0x05]])));
    basic_test_with_flags(
        &script,
        VerifyFlags::MINIMALDATA,
        EvalResult::err(ScriptError::MinimalData),
    );

    let script = Script::from(vec![OP_PUSHDATA1.to_u8(), 0x01, 0xaa]);
    basic_test_with_flags(
        &script,
        VerifyFlags::MINIMALDATA,
        EvalResult::err(ScriptError::MinimalData),
    );

    // Non-minimal numeric operand.
    let script = Builder::new()
        .push_slice(&[0x01, 0x00])
        .push_opcode(OP_1ADD)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![0x02]])));
    basic_test_with_flags(
        &script,
        VerifyFlags::MINIMALDATA,
        EvalResult::err(ScriptError::Num(NumError::NotMinimallyEncoded)),
    );
}

#[test]
fn test_upgradable_nops() {
    let script = Builder::new()
        .push_int(1)
        .push_opcode(OP_NOP1)
        .push_opcode(OP_NOP10)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![1]])));
    basic_test_with_flags(
        &script,
        VerifyFlags::DISCOURAGE_UPGRADABLE_NOPS,
        EvalResult::err(ScriptError::DiscourageUpgradableNops),
    );

    // Witness programs are plain pushes here.
    let witness_program = Builder::new()
        .push_int(0)
        .push_slice(&[0xab; 20])
        .into_script();
    basic_test_with_flags(
        &witness_program,
        VerifyFlags::DISCOURAGE_UPGRADABLE_WITNESS_PROGRAM,
        EvalResult::ok(true, Stack::from(vec![vec![], vec![0xab; 20]])),
    );
}

#[test]
fn test_pick_roll() {
    let script = Builder::new()
        .push_int(7)
        .push_int(8)
        .push_int(9)
        .push_int(2)
        .push_opcode(OP_ROLL)
        .into_script();
    basic_test(
        &script,
        EvalResult::ok(true, Stack::from(vec![vec![8], vec![9], vec![7]])),
    );

    let script = Builder::new()
        .push_int(7)
        .push_int(1)
        .push_opcode(OP_PICK)
        .into_script();
    basic_test(&script, EvalResult::err(ScriptError::InvalidStackOperation));
}

#[test]
fn test_altstack() {
    let script = Builder::new()
        .push_int(3)
        .push_opcode(OP_TOALTSTACK)
        .push_int(4)
        .push_opcode(OP_FROMALTSTACK)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![4], vec![3]])));

    let script = Builder::new().push_opcode(OP_FROMALTSTACK).into_script();
    basic_test(&script, EvalResult::err(ScriptError::InvalidAltStackOperation));
}

#[test]
fn test_decode_error() {
    let script = Script::from(vec![OP_1.to_u8(), OP_PUSHDATA2.to_u8(), 0x01]);
    basic_test(
        &script,
        EvalResult::err(DecodeError::TruncatedLength { offset: 1 }),
    );
}

#[test]
fn test_inactive_locktime_opcodes_are_nops() {
    let script = Builder::new()
        .push_int(1)
        .push_opcode(OP_CHECKLOCKTIMEVERIFY)
        .push_opcode(OP_CHECKSEQUENCEVERIFY)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![1]])));

    // Negative operands only matter once activated.
    let script = Builder::new()
        .push_int(-1)
        .push_opcode(OP_CHECKLOCKTIMEVERIFY)
        .into_script();
    basic_test_with_flags(
        &script,
        VerifyFlags::CHECKLOCKTIMEVERIFY,
        EvalResult::err(ScriptError::NegativeLocktime),
    );
}

#[test]
fn test_checkmultisig_script() {
    // 0 <sig> 1 <key> 1 CHECKMULTISIG
    let script = Builder::new()
        .push_int(0)
        .push_slice(&[0xaa, 0x01])
        .push_int(1)
        .push_slice(&[0x02; 33])
        .push_int(1)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script();
    basic_test(&script, EvalResult::ok(true, Stack::from(vec![vec![1]])));

    // Each key adds to the op count: 180 NOPs, the CHECKMULTISIG and 20 keys
    // reach the limit, the missing keys are only noticed afterwards.
    let script = repeat(OP_NOP, MAX_OPS_PER_SCRIPT - 21)
        .push_int(0)
        .push_int(0)
        .push_int(20)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script();
    basic_test(&script, EvalResult::err(ScriptError::InvalidStackOperation));

    let script = repeat(OP_NOP, MAX_OPS_PER_SCRIPT - 20)
        .push_int(0)
        .push_int(0)
        .push_int(20)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script();
    basic_test(&script, EvalResult::err(ScriptError::OpCount));
}

/// Records the script code of the last signature check.
#[derive(Default)]
struct RecordingChecker {
    result: bool,
    script_code: Option<Script>,
}

impl SignatureChecker for RecordingChecker {
    fn check_signature(
        &mut self,
        _sig: &[u8],
        _pubkey: &[u8],
        script_code: &Script,
        _flags: VerifyFlags,
    ) -> bool {
        self.script_code = Some(script_code.clone());
        self.result
    }

    fn check_lock_time(&self, _lock_time: ScriptNum) -> bool {
        false
    }

    fn check_sequence(&self, _sequence: ScriptNum) -> bool {
        false
    }
}

#[test]
fn test_codeseparator_and_signature_removal() {
    let sig = [0xaa, 0x01];
    let pubkey = [0x02; 33];

    let script = Builder::new()
        .push_int(1)
        .push_opcode(OP_CODESEPARATOR)
        .push_slice(&sig)
        .push_slice(&pubkey)
        .push_opcode(OP_CHECKSIG)
        .into_script();

    let mut checker = RecordingChecker {
        result: true,
        script_code: None,
    };
    let mut stack = Stack::empty();
    let result = eval_script(&mut stack, &script, &VerifyFlags::NONE, &mut checker);
    assert_eq!(result, Ok(true));

    let mut expected = push_data_bytes(&pubkey);
    expected.push(OP_CHECKSIG.to_u8());
    assert_eq!(checker.script_code, Some(Script::from(expected)));
}

#[test]
fn test_checksig_null_fail() {
    let script = Builder::new()
        .push_slice(&[0xaa, 0x01])
        .push_slice(&[0x02; 33])
        .push_opcode(OP_CHECKSIG)
        .into_script();

    let mut checker = RecordingChecker::default();
    let mut stack = Stack::empty();
    assert_eq!(
        eval_script(&mut stack, &script, &VerifyFlags::NONE, &mut checker),
        Ok(false)
    );

    let mut stack = Stack::empty();
    assert_eq!(
        eval_script(&mut stack, &script, &VerifyFlags::NULLFAIL, &mut checker),
        Err(ScriptError::SigNullFail)
    );

    let script = Builder::new()
        .push_int(0)
        .push_slice(&[0x02; 33])
        .push_opcode(OP_CHECKSIGVERIFY)
        .into_script();
    let mut stack = Stack::empty();
    assert_eq!(
        eval_script(&mut stack, &script, &VerifyFlags::NULLFAIL, &mut checker),
        Err(ScriptError::CheckSigVerify)
    );
}
