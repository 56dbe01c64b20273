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

//! Verification of Merkle-Patricia trie proofs against a trusted root.
//!
//! Given a root hash, an unordered bag of encoded trie nodes and a set of
//! keys, the functions in this crate resolve each key to the value the trie
//! associates with it, or to an empty value when the trie holds none. Two
//! node encodings are supported: the Ethereum hex-prefix trie
//! ([`EthereumLayout`]) and the Substrate radix-16 trie
//! ([`SubstrateLayout`]), including Substrate child tries whose root is
//! stored as a value of the top trie.
//!
//! Verification is pure and stateless: a call performs no I/O, holds no
//! resources past its return and yields byte-identical results for
//! identical inputs.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
mod rstd {
	pub use std::{boxed, cmp, error::Error, fmt, hash, marker, result, vec};
}

#[cfg(not(feature = "std"))]
mod rstd {
	pub use alloc::{boxed, vec};
	pub use core::{cmp, fmt, hash, marker, result};

	pub trait Error {}
	impl<T> Error for T {}
}

pub mod ethereum;
pub mod nibble;
pub mod node;
pub mod substrate;

mod keccak_hasher;
mod lookup;
mod node_codec;
mod proof_nodes;
mod verify;

pub use hash_db::Hasher;

pub use self::{
	ethereum::EthereumLayout,
	keccak_hasher::{KeccakHash, KeccakHasher},
	lookup::Lookup,
	nibble::NibbleSlice,
	node_codec::NodeCodec,
	proof_nodes::ProofNodes,
	substrate::SubstrateLayout,
	verify::{
		read_child_proof_check, verify_ethereum_proof, verify_proof, verify_substrate_proof,
		DEFAULT_CHILD_STORAGE_KEY_PREFIX,
	},
};

use crate::rstd::{boxed::Box, fmt, vec::Vec};

#[cfg(feature = "std")]
pub trait MaybeDebug: fmt::Debug {}
#[cfg(feature = "std")]
impl<T: fmt::Debug> MaybeDebug for T {}
#[cfg(not(feature = "std"))]
pub trait MaybeDebug {}
#[cfg(not(feature = "std"))]
impl<T> MaybeDebug for T {}

/// Value bytes read out of a trie.
pub type DBValue = Vec<u8>;

/// Maximum number of nodes a single key lookup may traverse.
///
/// A proof whose node graph chains further than this along some key path
/// cannot assert the presence of that key; lookups give up at the bound and
/// report the value as absent.
pub const MAX_TRIE_DEPTH: usize = 50;

/// Definitions required for a trie flavour to be verified: the hash used to
/// address proof nodes and the codec that decodes them.
pub trait TrieLayout {
	/// Hasher addressing the proof nodes.
	type Hash: Hasher;
	/// Codec decoding the encoded nodes of this trie flavour.
	type Codec: NodeCodec<HashOut = <Self::Hash as Hasher>::Out>;
}

/// Alias accessor to hasher output of a `TrieLayout`.
pub type TrieHash<L> = <<L as TrieLayout>::Hash as Hasher>::Out;
/// Alias accessor to the codec error of a `TrieLayout`.
pub type CError<L> = <<L as TrieLayout>::Codec as NodeCodec>::Error;

/// Proof verification errors.
///
/// The offending hash is copied out of the proof so the error can outlive
/// the proof buffers.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ProofError<T, E> {
	/// A node referenced by hash during traversal is absent from the proof.
	MissingNode(T),
	/// A proof node's bytes do not parse under the expected encoding. The
	/// hash is the one of the nearest enclosing hash-resolved node.
	DecodeError(T, E),
	/// The child-root lookup of a child-trie verification returned no
	/// usable root digest.
	InvalidChildProof,
}

impl<T, E> fmt::Display for ProofError<T, E>
where
	T: fmt::Debug,
	E: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			ProofError::MissingNode(ref hash) => write!(f, "Proof is missing node {:?}", hash),
			ProofError::DecodeError(ref hash, ref err) =>
				write!(f, "Decoding failed for node {:?}; err: {:?}", hash, err),
			ProofError::InvalidChildProof =>
				write!(f, "Child trie root not found under the parent root"),
		}
	}
}

#[cfg(feature = "std")]
impl<T, E> std::error::Error for ProofError<T, E>
where
	T: fmt::Debug,
	E: fmt::Debug,
{
}

/// Verification result type. Boxed to avoid copying around extra space for
/// the hash on successful lookups.
pub type Result<T, H, E> = crate::rstd::result::Result<T, Box<ProofError<H, E>>>;
