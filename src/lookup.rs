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

//! Trie lookup via the content-addressed proof node index.

use crate::{
	nibble::NibbleSlice,
	node::{Node, NodeHandle},
	node_codec::NodeCodec,
	proof_nodes::ProofNodes,
	rstd::boxed::Box,
	CError, ProofError, Result, TrieHash, TrieLayout, MAX_TRIE_DEPTH,
};
use log::trace;

/// Proof lookup helper object.
pub struct Lookup<'a, L: TrieLayout> {
	/// Proof node index to resolve hash references from.
	pub proof: &'a ProofNodes<'a, L::Hash>,
	/// Hash of the trie root to start at.
	pub hash: TrieHash<L>,
}

impl<'a, L: TrieLayout> Lookup<'a, L> {
	/// Look up the given key under the proof root.
	///
	/// Returns `Ok(None)` when the proof shows the trie holds no value for
	/// the key, including when the lookup gives up after
	/// [`MAX_TRIE_DEPTH`] nodes.
	pub fn look_up(self, key: &[u8]) -> Result<Option<&'a [u8]>, TrieHash<L>, CError<L>> {
		let mut partial = NibbleSlice::new(key);
		// The root is resolved by hash even when its encoding would be
		// short enough to inline.
		let mut hash = self.hash;
		let mut node_data = self.proof.get(&hash)?;

		for _ in 0..MAX_TRIE_DEPTH {
			let decoded = match L::Codec::decode(node_data) {
				Ok(node) => node,
				Err(e) => return Err(Box::new(ProofError::DecodeError(hash, e))),
			};
			let next_node = match decoded {
				Node::Empty => return Ok(None),
				Node::Leaf(slice, value) =>
					return Ok(match slice == partial {
						true => Some(value),
						false => None,
					}),
				Node::Extension(slice, item) =>
					if partial.starts_with(&slice) {
						partial = partial.mid(slice.len());
						item
					} else {
						return Ok(None)
					},
				Node::Branch(children, value) => match partial.is_empty() {
					true => return Ok(value),
					false => match children[partial.at(0) as usize] {
						Some(x) => {
							partial = partial.mid(1);
							x
						},
						None => return Ok(None),
					},
				},
				Node::NibbledBranch(slice, children, value) => {
					if !partial.starts_with(&slice) {
						return Ok(None)
					}

					match partial.len() == slice.len() {
						true => return Ok(value),
						false => match children[partial.at(slice.len()) as usize] {
							Some(x) => {
								partial = partial.mid(slice.len() + 1);
								x
							},
							None => return Ok(None),
						},
					}
				},
			};

			if let NodeHandle::Hash(h) = next_node {
				hash = h;
			}
			node_data = self.proof.load(next_node)?;
		}

		trace!(target: "trie", "lookup chained through {} nodes, reporting the key absent", MAX_TRIE_DEPTH);
		Ok(None)
	}
}
