use crate::constants::{
    LOCKTIME_THRESHOLD, SEQUENCE_FINAL, SEQUENCE_LOCKTIME_DISABLE_FLAG, SEQUENCE_LOCKTIME_MASK,
    SEQUENCE_LOCKTIME_TYPE_FLAG, SIGHASH_FORKID,
};
use crate::num::ScriptNum;
use crate::script::Script;
use crate::sighash::{forkid_signature_hash, legacy_signature_hash, SighashMidstate};
use crate::VerifyFlags;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::ecdsa::Signature;
use bitcoin::secp256k1::{Message, PublicKey, Secp256k1, Verification};
use bitcoin::{Amount, Transaction};

/// Checks transaction signatures and locktimes on behalf of the interpreter.
pub trait SignatureChecker {
    /// `sig` carries the hash type as its last byte, `script_code` has already
    /// been stripped of the signatures being checked.
    fn check_signature(
        &mut self,
        sig: &[u8],
        pubkey: &[u8],
        script_code: &Script,
        flags: VerifyFlags,
    ) -> bool;

    fn check_lock_time(&self, lock_time: ScriptNum) -> bool;

    fn check_sequence(&self, sequence: ScriptNum) -> bool;
}

/// Accepts every signature and locktime.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignatureCheck;

impl SignatureChecker for NoSignatureCheck {
    fn check_signature(
        &mut self,
        _sig: &[u8],
        _pubkey: &[u8],
        _script_code: &Script,
        _flags: VerifyFlags,
    ) -> bool {
        true
    }

    fn check_lock_time(&self, _lock_time: ScriptNum) -> bool {
        true
    }

    fn check_sequence(&self, _sequence: ScriptNum) -> bool {
        true
    }
}

/// Checks signatures against one input of a transaction.
///
/// The secp256k1 context is borrowed so that a single verification context can
/// be shared by all inputs and threads.
pub struct TransactionSignatureChecker<'a, C: Verification> {
    tx: &'a Transaction,
    input_index: usize,
    amount: Amount,
    secp: &'a Secp256k1<C>,
    // Computed on the first fork-id signature.
    midstate: Option<SighashMidstate>,
}

impl<'a, C: Verification> TransactionSignatureChecker<'a, C> {
    /// Constructs a new instance of [`TransactionSignatureChecker`].
    ///
    /// `amount` is the value of the spent output, only committed to by the
    /// fork-id digest.
    pub fn new(
        tx: &'a Transaction,
        input_index: usize,
        amount: Amount,
        secp: &'a Secp256k1<C>,
    ) -> Self {
        Self {
            tx,
            input_index,
            amount,
            secp,
            midstate: None,
        }
    }

    fn input_sequence(&self) -> Option<u32> {
        self.tx
            .input
            .get(self.input_index)
            .map(|input| input.sequence.0)
    }
}

impl<C: Verification> SignatureChecker for TransactionSignatureChecker<'_, C> {
    fn check_signature(
        &mut self,
        sig: &[u8],
        pubkey: &[u8],
        script_code: &Script,
        flags: VerifyFlags,
    ) -> bool {
        let Ok(pubkey) = PublicKey::from_slice(pubkey) else {
            return false;
        };

        let Some((&hash_type, der)) = sig.split_last() else {
            return false;
        };

        let Ok(mut signature) = Signature::from_der_lax(der) else {
            return false;
        };

        // libsecp256k1 only verifies low S signatures.
        signature.normalize_s();

        let hash_type = u32::from(hash_type);

        let tx = self.tx;

        let sighash = if flags.enable_sighash_forkid() && hash_type & SIGHASH_FORKID != 0 {
            let midstate = self
                .midstate
                .get_or_insert_with(|| SighashMidstate::new(tx));
            forkid_signature_hash(
                tx,
                self.input_index,
                script_code,
                self.amount,
                hash_type,
                midstate,
            )
        } else {
            legacy_signature_hash(tx, self.input_index, script_code, hash_type)
        };

        let msg = Message::from_digest(sighash.to_byte_array());

        self.secp.verify_ecdsa(&msg, &signature, &pubkey).is_ok()
    }

    fn check_lock_time(&self, lock_time: ScriptNum) -> bool {
        let tx_lock_time = i64::from(self.tx.lock_time.to_consensus_u32());
        let lock_time = lock_time.value();

        // There are two kinds of nLockTime: lock-by-blockheight and
        // lock-by-blocktime, distinguished by whether nLockTime <
        // LOCKTIME_THRESHOLD. Only the same kind can be compared.
        let same_kind = (tx_lock_time < LOCKTIME_THRESHOLD && lock_time < LOCKTIME_THRESHOLD)
            || (tx_lock_time >= LOCKTIME_THRESHOLD && lock_time >= LOCKTIME_THRESHOLD);

        if !same_kind || lock_time > tx_lock_time {
            return false;
        }

        // A final input would bypass nLockTime entirely.
        matches!(self.input_sequence(), Some(sequence) if sequence != SEQUENCE_FINAL)
    }

    fn check_sequence(&self, sequence: ScriptNum) -> bool {
        let Some(tx_sequence) = self.input_sequence() else {
            return false;
        };

        // Relative lock times are only enforced from version 2 on; the version
        // is compared unsigned.
        if (self.tx.version.0 as u32) < 2 {
            return false;
        }

        if tx_sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
            return false;
        }

        let mask = i64::from(SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK);
        let type_flag = i64::from(SEQUENCE_LOCKTIME_TYPE_FLAG);

        let tx_masked = i64::from(tx_sequence) & mask;
        let masked = sequence.value() & mask;

        let same_kind = (tx_masked < type_flag && masked < type_flag)
            || (tx_masked >= type_flag && masked >= type_flag);

        same_kind && masked <= tx_masked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::absolute::LockTime;
    use bitcoin::transaction::Version;
    use bitcoin::{OutPoint, ScriptBuf, Sequence, TxIn, Witness};

    fn tx_with(version: i32, lock_time: u32, sequence: u32) -> Transaction {
        Transaction {
            version: Version(version),
            lock_time: LockTime::from_consensus(lock_time),
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::new(),
                sequence: Sequence(sequence),
                witness: Witness::new(),
            }],
            output: vec![],
        }
    }

    #[test]
    fn test_check_lock_time() {
        let secp = Secp256k1::verification_only();

        let tx = tx_with(1, 100, 0);
        let checker = TransactionSignatureChecker::new(&tx, 0, Amount::ZERO, &secp);
        assert!(checker.check_lock_time(ScriptNum::from(100i64)));
        assert!(checker.check_lock_time(ScriptNum::from(0i64)));
        assert!(!checker.check_lock_time(ScriptNum::from(101i64)));
        // Block height against timestamp.
        assert!(!checker.check_lock_time(ScriptNum::from(500_000_100i64)));

        let tx = tx_with(1, 500_000_200, 0);
        let checker = TransactionSignatureChecker::new(&tx, 0, Amount::ZERO, &secp);
        assert!(checker.check_lock_time(ScriptNum::from(500_000_100i64)));
        assert!(!checker.check_lock_time(ScriptNum::from(100i64)));

        let tx = tx_with(1, 100, SEQUENCE_FINAL);
        let checker = TransactionSignatureChecker::new(&tx, 0, Amount::ZERO, &secp);
        assert!(!checker.check_lock_time(ScriptNum::from(50i64)));
    }

    #[test]
    fn test_check_sequence() {
        let secp = Secp256k1::verification_only();

        let tx = tx_with(2, 0, 10);
        let checker = TransactionSignatureChecker::new(&tx, 0, Amount::ZERO, &secp);
        assert!(checker.check_sequence(ScriptNum::from(10i64)));
        assert!(!checker.check_sequence(ScriptNum::from(11i64)));
        // Time based against height based.
        assert!(!checker.check_sequence(ScriptNum::from(i64::from(SEQUENCE_LOCKTIME_TYPE_FLAG))));

        let tx = tx_with(1, 0, 10);
        let checker = TransactionSignatureChecker::new(&tx, 0, Amount::ZERO, &secp);
        assert!(!checker.check_sequence(ScriptNum::from(10i64)));

        let tx = tx_with(2, 0, SEQUENCE_LOCKTIME_DISABLE_FLAG | 10);
        let checker = TransactionSignatureChecker::new(&tx, 0, Amount::ZERO, &secp);
        assert!(!checker.check_sequence(ScriptNum::from(10i64)));

        // Bits outside of the mask are ignored.
        let tx = tx_with(2, 0, (1 << 20) | 10);
        let checker = TransactionSignatureChecker::new(&tx, 0, Amount::ZERO, &secp);
        assert!(checker.check_sequence(ScriptNum::from((1i64 << 21) | 10)));
    }

    #[test]
    fn test_malformed_inputs_fail() {
        let secp = Secp256k1::verification_only();
        let tx = tx_with(1, 0, 0);
        let mut checker = TransactionSignatureChecker::new(&tx, 0, Amount::ZERO, &secp);

        assert!(!checker.check_signature(&[], &[2; 33], &Script::new(), VerifyFlags::NONE));
        assert!(!checker.check_signature(&[0x30, 0x01], &[], &Script::new(), VerifyFlags::NONE));
    }
}
