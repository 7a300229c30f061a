//! Transaction digests committed to by signatures.

use crate::constants::{SIGHASH_ANYONECANPAY, SIGHASH_BASE_MASK, SIGHASH_NONE, SIGHASH_SINGLE};
use crate::script::Script;
use bitcoin::consensus::encode::serialize;
use bitcoin::hashes::{sha256d, Hash};
use bitcoin::{Amount, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness};

/// Returned for an out of range input, or SIGHASH_SINGLE without a matching
/// output. Signing it is a long standing consensus quirk that must be kept.
const SIGHASH_ONE: [u8; 32] = {
    let mut one = [0u8; 32];
    one[0] = 1;
    one
};

/// Computes the legacy signature hash of input `input_index`.
///
/// `script_code` is the subscript from the last executed OP_CODESEPARATOR,
/// any remaining OP_CODESEPARATOR is dropped before hashing.
pub fn legacy_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    hash_type: u32,
) -> sha256d::Hash {
    let base_type = hash_type & SIGHASH_BASE_MASK;

    if input_index >= tx.input.len()
        || (base_type == SIGHASH_SINGLE && input_index >= tx.output.len())
    {
        return sha256d::Hash::from_byte_array(SIGHASH_ONE);
    }

    let script_code = ScriptBuf::from(script_code.without_codeseparators());
    let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY != 0;
    let sign_other_sequences = base_type != SIGHASH_NONE && base_type != SIGHASH_SINGLE;

    let input = tx
        .input
        .iter()
        .enumerate()
        .filter(|(i, _)| !anyone_can_pay || *i == input_index)
        .map(|(i, txin)| {
            let signed = i == input_index;
            TxIn {
                previous_output: txin.previous_output,
                script_sig: if signed {
                    script_code.clone()
                } else {
                    ScriptBuf::new()
                },
                sequence: if signed || sign_other_sequences {
                    txin.sequence
                } else {
                    Sequence::ZERO
                },
                witness: Witness::new(),
            }
        })
        .collect();

    let output = match base_type {
        SIGHASH_NONE => Vec::new(),
        SIGHASH_SINGLE => tx
            .output
            .iter()
            .take(input_index + 1)
            .enumerate()
            .map(|(i, txout)| {
                if i == input_index {
                    txout.clone()
                } else {
                    TxOut::NULL
                }
            })
            .collect(),
        _ => tx.output.clone(),
    };

    let tx_copy = Transaction {
        version: tx.version,
        lock_time: tx.lock_time,
        input,
        output,
    };

    let mut preimage = serialize(&tx_copy);
    preimage.extend_from_slice(&hash_type.to_le_bytes());

    sha256d::Hash::hash(&preimage)
}

/// Per-transaction hashes shared by every fork-id digest of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SighashMidstate {
    hash_prevouts: sha256d::Hash,
    hash_sequence: sha256d::Hash,
    hash_outputs: sha256d::Hash,
}

impl SighashMidstate {
    pub fn new(tx: &Transaction) -> Self {
        let mut prevouts = Vec::with_capacity(tx.input.len() * 36);
        let mut sequences = Vec::with_capacity(tx.input.len() * 4);

        for txin in &tx.input {
            prevouts.extend(serialize(&txin.previous_output));
            sequences.extend(txin.sequence.0.to_le_bytes());
        }

        let outputs: Vec<u8> = tx.output.iter().flat_map(serialize).collect();

        Self {
            hash_prevouts: sha256d::Hash::hash(&prevouts),
            hash_sequence: sha256d::Hash::hash(&sequences),
            hash_outputs: sha256d::Hash::hash(&outputs),
        }
    }
}

/// Computes the fork-id signature hash of input `input_index`, which follows
/// the BIP143 layout and commits to the spent `amount`.
///
/// Unlike the legacy digest, `script_code` is hashed as is.
pub fn forkid_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    amount: Amount,
    hash_type: u32,
    midstate: &SighashMidstate,
) -> sha256d::Hash {
    let Some(txin) = tx.input.get(input_index) else {
        return sha256d::Hash::from_byte_array(SIGHASH_ONE);
    };

    let zero = sha256d::Hash::from_byte_array([0u8; 32]);
    let base_type = hash_type & SIGHASH_BASE_MASK;
    let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY != 0;

    let hash_prevouts = if anyone_can_pay {
        zero
    } else {
        midstate.hash_prevouts
    };

    let hash_sequence =
        if anyone_can_pay || base_type == SIGHASH_SINGLE || base_type == SIGHASH_NONE {
            zero
        } else {
            midstate.hash_sequence
        };

    let hash_outputs = if base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
        midstate.hash_outputs
    } else if base_type == SIGHASH_SINGLE && input_index < tx.output.len() {
        sha256d::Hash::hash(&serialize(&tx.output[input_index]))
    } else {
        zero
    };

    let mut preimage = Vec::with_capacity(256 + script_code.len());
    preimage.extend(tx.version.0.to_le_bytes());
    preimage.extend(hash_prevouts.as_byte_array());
    preimage.extend(hash_sequence.as_byte_array());
    preimage.extend(serialize(&txin.previous_output));
    preimage.extend(serialize(&ScriptBuf::from(script_code.clone())));
    preimage.extend(amount.to_sat().to_le_bytes());
    preimage.extend(txin.sequence.0.to_le_bytes());
    preimage.extend(hash_outputs.as_byte_array());
    preimage.extend(tx.lock_time.to_consensus_u32().to_le_bytes());
    preimage.extend(hash_type.to_le_bytes());

    sha256d::Hash::hash(&preimage)
}
