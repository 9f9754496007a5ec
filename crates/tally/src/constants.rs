//! Domain separators, personalizations and protocol limits.
//!
//! All BLAKE2b personalizations are at most 16 bytes (the BLAKE2b personal
//! field width) and live under the `Tally` namespace so that no digest in
//! this crate can collide with another.

/// BLAKE2b-512 personalization for `PRF^expand`: key expansion from a
/// spending key to child keys (`ak`, `nk`).
pub const PRF_EXPAND_PERSONALIZATION: &[u8; 16] = b"Tally_ExpandSeed";

/// BLAKE2b-512 personalization for note commitments.
///
/// $$\mathsf{cm} = \text{ToBase}(\text{BLAKE2b-512}(\text{"Tally-NoteCommit"},\;
///   \mathsf{owner} \| v \| \mathsf{rcm}))$$
pub const NOTE_COMMITMENT_PERSONALIZATION: &[u8; 16] = b"Tally-NoteCommit";

/// BLAKE2b-512 personalization for nullifier derivation.
///
/// $$\mathsf{nf} = \text{ToBase}(\text{BLAKE2b-512}(\text{"Tally-Nullifier"},\;
///   \mathsf{nk} \| \mathsf{cm}))$$
pub const NULLIFIER_PERSONALIZATION: &[u8; 15] = b"Tally-Nullifier";

/// BLAKE2b-256 personalization for public operation selectors.
pub const SELECTOR_PERSONALIZATION: &[u8; 14] = b"Tally-Selector";

/// BLAKE2b-256 personalization for the call queue digest.
///
/// The digest commits to every deferred call in enqueue order, so any
/// reordering, drop or duplication changes it.
pub const CALL_QUEUE_PERSONALIZATION: &[u8; 15] = b"Tally-CallQueue";

/// BLAKE2b-512 personalization for the proof statement (public inputs).
pub const STATEMENT_PERSONALIZATION: &[u8; 15] = b"Tally-Statement";

/// BLAKE2b-512 personalization for the transaction sighash.
///
/// The origin signs this digest. It covers the statement and the proof, so
/// neither can be swapped after signing.
pub const SIGHASH_PERSONALIZATION: &[u8; 15] = b"Tally-TxSigHash";

/// BLAKE2b-256 personalization for transaction identifiers.
pub const TX_ID_PERSONALIZATION: &[u8; 10] = b"Tally-TxId";

/// BLAKE2b-256 personalization for the commitment log root.
pub const COMMITMENT_LOG_PERSONALIZATION: &[u8; 15] = b"Tally-CmLogRoot";

/// Signature string of the public aggregate-increment operation.
pub const AGGREGATE_INCREMENT_SIGNATURE: &str = "aggregate_increment(u64)";

/// Label the default configuration derives its circuit identifier from.
pub const DEFAULT_CIRCUIT_LABEL: &str = "tally:private-counter:v1";

/// Default bound on deferred calls carried by one transaction.
pub const DEFAULT_MAX_CALLS_PER_TRANSACTION: usize = 16;

/// Largest value a counter (and therefore the aggregate) may reach.
///
/// Equal to `i64::MAX` so that every amount accepted at the signed API
/// boundary fits.
pub const COUNTER_MAX: u64 = 0x7fff_ffff_ffff_ffff;

/// Domain-separated key expansion from a spending key.
///
/// `PRF^expand_sk(t) = BLAKE2b-512("Tally_ExpandSeed", sk || t)`
#[derive(Clone, Copy, Debug)]
pub(crate) struct PrfExpand {
    domain_separator: u8,
}

impl PrfExpand {
    /// `[0x00]` -> `ask` (authorizing key, scalar field)
    pub(crate) const ASK: Self = Self {
        domain_separator: 0x00,
    };
    /// `[0x01]` -> `nk` (nullifier key, base field)
    pub(crate) const NK: Self = Self {
        domain_separator: 0x01,
    };

    /// Evaluate the PRF: `BLAKE2b-512("Tally_ExpandSeed", sk || domain_sep)`.
    ///
    /// Returns 64 bytes suitable for unbiased reduction into either field
    /// via `FromUniformBytes`.
    pub(crate) fn with(self, sk: &[u8; 32]) -> [u8; 64] {
        *blake2b_simd::Params::new()
            .hash_length(64)
            .personal(PRF_EXPAND_PERSONALIZATION)
            .to_state()
            .update(sk)
            .update(&[self.domain_separator])
            .finalize()
            .as_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Same key, different domain separators -> different outputs.
    #[test]
    fn prf_expand_domain_separators_independent() {
        let sk = [0x42u8; 32];
        assert_ne!(PrfExpand::ASK.with(&sk), PrfExpand::NK.with(&sk));
    }

    #[test]
    fn counter_max_matches_signed_boundary() {
        assert_eq!(Some(COUNTER_MAX), u64::try_from(i64::MAX).ok());
    }
}
