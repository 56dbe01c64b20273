// Copyright 2023, 2024 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Entry points assembling per-key proof lookups.

use crate::{
	keccak_hasher::{KeccakHash, KeccakHasher},
	lookup::Lookup,
	node::decode_hash,
	proof_nodes::ProofNodes,
	rstd::{boxed::Box, vec::Vec},
	CError, DBValue, EthereumLayout, ProofError, Result, SubstrateLayout, TrieHash, TrieLayout,
};
use log::trace;

/// Storage key prefix under which the root of a default child trie is
/// stored in the top trie.
pub const DEFAULT_CHILD_STORAGE_KEY_PREFIX: &[u8] = b":child_storage:default:";

/// Verify a proof for a set of keys under a trusted `root`.
///
/// The result holds one entry per key, in key order: the value bytes the
/// trie associates with the key, or an empty value when the trie holds
/// none. Identical inputs produce byte-identical results.
pub fn verify_proof<L: TrieLayout>(
	root: &TrieHash<L>,
	proof: &[impl AsRef<[u8]>],
	keys: &[impl AsRef<[u8]>],
) -> Result<Vec<DBValue>, TrieHash<L>, CError<L>> {
	trace!(target: "trie", "verifying {} keys against a proof of {} nodes", keys.len(), proof.len());
	let nodes = ProofNodes::<L::Hash>::new(proof);
	keys.iter()
		.map(|key| {
			let value = Lookup::<L> { proof: &nodes, hash: *root }.look_up(key.as_ref())?;
			Ok(value.map(|v| v.to_vec()).unwrap_or_default())
		})
		.collect()
}

/// Verify a Substrate trie proof for the given keys.
pub fn verify_substrate_proof(
	root: &KeccakHash,
	proof: &[impl AsRef<[u8]>],
	keys: &[impl AsRef<[u8]>],
) -> Result<Vec<DBValue>, KeccakHash, crate::substrate::Error> {
	verify_proof::<SubstrateLayout<KeccakHasher>>(root, proof, keys)
}

/// Verify an Ethereum trie proof for the given keys.
pub fn verify_ethereum_proof(
	root: &KeccakHash,
	proof: &[impl AsRef<[u8]>],
	keys: &[impl AsRef<[u8]>],
) -> Result<Vec<DBValue>, KeccakHash, rlp::DecoderError> {
	verify_proof::<EthereumLayout<KeccakHasher>>(root, proof, keys)
}

/// Verify a Substrate child-trie proof.
///
/// The child root is first read from the top trie under the
/// [`DEFAULT_CHILD_STORAGE_KEY_PREFIX`] key derived from `child_info`,
/// then `keys` are resolved under that root. Both phases draw their nodes
/// from the same proof. A missing, zero or malformed child root fails with
/// [`ProofError::InvalidChildProof`].
pub fn read_child_proof_check(
	root: &KeccakHash,
	proof: &[impl AsRef<[u8]>],
	keys: &[impl AsRef<[u8]>],
	child_info: &[u8],
) -> Result<Vec<DBValue>, KeccakHash, crate::substrate::Error> {
	type Layout = SubstrateLayout<KeccakHasher>;

	let nodes = ProofNodes::<KeccakHasher>::new(proof);

	let mut child_key =
		Vec::with_capacity(DEFAULT_CHILD_STORAGE_KEY_PREFIX.len() + child_info.len());
	child_key.extend_from_slice(DEFAULT_CHILD_STORAGE_KEY_PREFIX);
	child_key.extend_from_slice(child_info);

	let child_root = Lookup::<Layout> { proof: &nodes, hash: *root }
		.look_up(&child_key)?
		.and_then(decode_hash::<KeccakHasher>)
		.filter(|root| root != &KeccakHash::default())
		.ok_or_else(|| Box::new(ProofError::InvalidChildProof))?;
	trace!(target: "trie", "resolved child trie root {:?}", child_root);

	keys.iter()
		.map(|key| {
			let value =
				Lookup::<Layout> { proof: &nodes, hash: child_root }.look_up(key.as_ref())?;
			Ok(value.map(|v| v.to_vec()).unwrap_or_default())
		})
		.collect()
}
