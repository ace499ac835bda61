//! Transaction assembly and signing, delegated to the `bitcoin` crate.
//!
//! The core never serializes transactions itself: inputs, outputs, and key
//! material go in, a consensus-serialized signed transaction in hex comes
//! out. All inputs are assumed to be legacy P2PKH outputs controlled by the
//! one supplied key, matching what the UTXO providers report for a single
//! source address.

use bitcoin::absolute::LockTime;
use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::hashes::Hash;
use bitcoin::key::PrivateKey;
use bitcoin::script::{Builder, PushBytesBuf, ScriptBuf};
use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, NetworkKind, OutPoint, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};

use crate::errors::SendsatsError;
use crate::types::{Network, UnspentOutput};
use crate::Result;

/// Build and sign a legacy P2PKH transaction, returning its hex serialization.
///
/// `outputs` are `(address, satoshis)` pairs; each address must belong to
/// `network`. The key is checked against the network before any signing
/// happens.
pub fn assemble_signed_tx(
    network: Network,
    inputs: &[UnspentOutput],
    outputs: &[(String, u64)],
    private_key_wif: &str,
) -> Result<String> {
    if inputs.is_empty() {
        return Err(SendsatsError::Assembly("transaction has no inputs".into()));
    }

    let net = network.to_bitcoin_network();

    let private_key = PrivateKey::from_wif(private_key_wif).map_err(|e| {
        SendsatsError::validation("private_key_wif", format!("not a valid WIF key: {e}"))
    })?;
    if private_key.network != NetworkKind::from(net) {
        return Err(SendsatsError::validation(
            "private_key_wif",
            format!("key is not a {network} key"),
        ));
    }

    let secp = Secp256k1::new();
    let public_key = private_key.public_key(&secp);
    // scriptPubKey of the outputs being spent; doubles as the script code for
    // legacy sighash computation.
    let spent_script = ScriptBuf::new_p2pkh(&public_key.pubkey_hash());

    let mut tx_inputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let txid: Txid = input.txid.parse().map_err(|e| {
            SendsatsError::Assembly(format!("invalid input txid {:?}: {e}", input.txid))
        })?;
        tx_inputs.push(TxIn {
            previous_output: OutPoint::new(txid, input.vout),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        });
    }

    let mut tx_outputs = Vec::with_capacity(outputs.len());
    for (address, amount_sats) in outputs {
        let parsed: Address = address
            .parse::<Address<NetworkUnchecked>>()
            .map_err(|e| {
                SendsatsError::validation("address", format!("invalid address {address:?}: {e}"))
            })?
            .require_network(net)
            .map_err(|e| {
                SendsatsError::validation("address", format!("{address:?} is not a {network} address: {e}"))
            })?;
        tx_outputs.push(TxOut {
            value: Amount::from_sat(*amount_sats),
            script_pubkey: parsed.script_pubkey(),
        });
    }

    let unsigned = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: tx_inputs,
        output: tx_outputs,
    };

    let mut signed = unsigned.clone();
    let sighash_cache = SighashCache::new(&unsigned);
    for input_index in 0..signed.input.len() {
        let sighash = sighash_cache
            .legacy_signature_hash(input_index, &spent_script, EcdsaSighashType::All.to_u32())
            .map_err(|e| SendsatsError::Assembly(format!("sighash computation failed: {e}")))?;

        let message = Message::from_digest(sighash.to_byte_array());
        let signature = secp.sign_ecdsa(&message, &private_key.inner);

        let mut sig_bytes = signature.serialize_der().to_vec();
        sig_bytes.push(EcdsaSighashType::All as u8);
        let sig_push = PushBytesBuf::try_from(sig_bytes)
            .map_err(|e| SendsatsError::Assembly(format!("signature push failed: {e}")))?;

        signed.input[input_index].script_sig = Builder::new()
            .push_slice(sig_push)
            .push_key(&public_key)
            .into_script();
    }

    Ok(bitcoin::consensus::encode::serialize_hex(&signed))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compressed mainnet key from the WIF test vectors.
    const MAINNET_WIF: &str = "KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617";

    fn p2pkh_address_for(wif: &str, network: Network) -> String {
        let secp = Secp256k1::new();
        let key = PrivateKey::from_wif(wif).unwrap();
        Address::p2pkh(&key.public_key(&secp), network.to_bitcoin_network()).to_string()
    }

    fn input(amount_sats: u64) -> UnspentOutput {
        UnspentOutput {
            txid: "aa".repeat(32),
            vout: 0,
            amount_sats,
            confirmations: 6,
        }
    }

    #[test]
    fn signs_single_input_two_outputs() {
        let from = p2pkh_address_for(MAINNET_WIF, Network::Mainnet);
        let outputs = vec![
            ("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(), 40_000),
            (from, 59_000),
        ];
        let hex = assemble_signed_tx(Network::Mainnet, &[input(100_000)], &outputs, MAINNET_WIF)
            .unwrap();
        // Version 2, little-endian, then at least one signed input.
        assert!(hex.starts_with("02000000"));
        assert!(hex.len() > 300);
    }

    #[test]
    fn rejects_bad_wif() {
        let err = assemble_signed_tx(
            Network::Mainnet,
            &[input(100_000)],
            &[("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(), 40_000)],
            "not-a-wif",
        )
        .unwrap_err();
        assert!(matches!(err, SendsatsError::Validation { field: "private_key_wif", .. }));
    }

    #[test]
    fn rejects_key_from_wrong_network() {
        let err = assemble_signed_tx(
            Network::Testnet,
            &[input(100_000)],
            &[("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(), 40_000)],
            MAINNET_WIF,
        )
        .unwrap_err();
        assert!(matches!(err, SendsatsError::Validation { field: "private_key_wif", .. }));
    }

    #[test]
    fn rejects_address_from_wrong_network() {
        let secp = Secp256k1::new();
        let key = PrivateKey::from_wif(MAINNET_WIF).unwrap();
        let testnet_wif = PrivateKey::new(key.inner, NetworkKind::Test).to_wif();
        let mainnet_addr = Address::p2pkh(&key.public_key(&secp), bitcoin::Network::Bitcoin);

        let err = assemble_signed_tx(
            Network::Testnet,
            &[input(100_000)],
            &[(mainnet_addr.to_string(), 40_000)],
            &testnet_wif,
        )
        .unwrap_err();
        assert!(matches!(err, SendsatsError::Validation { field: "address", .. }));
    }

    #[test]
    fn rejects_empty_input_list() {
        let err = assemble_signed_tx(
            Network::Mainnet,
            &[],
            &[("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(), 40_000)],
            MAINNET_WIF,
        )
        .unwrap_err();
        assert!(matches!(err, SendsatsError::Assembly(_)));
    }

    #[test]
    fn rejects_malformed_input_txid() {
        let mut bad = input(100_000);
        bad.txid = "zz".repeat(32);
        let err = assemble_signed_tx(
            Network::Mainnet,
            &[bad],
            &[("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(), 40_000)],
            MAINNET_WIF,
        )
        .unwrap_err();
        assert!(matches!(err, SendsatsError::Assembly(_)));
    }
}
