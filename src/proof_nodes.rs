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

//! Content-addressed index over the nodes of a proof.

#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(not(feature = "std"))]
use hashbrown::HashMap;

use crate::{
	node::NodeHandle,
	rstd::{boxed::Box, hash::BuildHasherDefault},
	ProofError, Result,
};
use hash_db::Hasher;

/// Content-addressed lookup of proof nodes by their hash.
///
/// Built once at verification entry by hashing every encoded node of the
/// proof, and dropped when the call returns. Duplicate proof entries are
/// permitted and collapse into a single slot. Keys are uniformly
/// distributed hashes already, so the map reuses their prefix through
/// `H::StdHasher` instead of hashing a second time.
pub struct ProofNodes<'a, H: Hasher> {
	nodes: HashMap<H::Out, &'a [u8], BuildHasherDefault<H::StdHasher>>,
}

impl<'a, H: Hasher> ProofNodes<'a, H> {
	/// Index every node of the proof under its hash.
	pub fn new(proof: &'a [impl AsRef<[u8]>]) -> Self {
		let nodes = proof
			.iter()
			.map(|raw| {
				let raw = raw.as_ref();
				(H::hash(raw), raw)
			})
			.collect();
		ProofNodes { nodes }
	}

	/// Get the encoded node carrying the given hash. Fails when the proof
	/// holds no such node.
	pub fn get<E>(&self, hash: &H::Out) -> Result<&'a [u8], H::Out, E> {
		self.nodes
			.get(hash)
			.copied()
			.ok_or_else(|| Box::new(ProofError::MissingNode(*hash)))
	}

	/// Resolve a node handle to encoded node bytes: inline handles carry
	/// them directly, hash handles are looked up in the proof.
	pub fn load<E>(&self, handle: NodeHandle<'a, H::Out>) -> Result<&'a [u8], H::Out, E> {
		match handle {
			NodeHandle::Hash(ref hash) => self.get(hash),
			NodeHandle::Inline(data) => Ok(data),
		}
	}
}
