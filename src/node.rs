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

//! Borrowed representation of decoded trie nodes.

use crate::nibble::{nibble_ops, NibbleSlice};
use hash_db::Hasher;

/// A reference to a trie node which may be stored within another trie node.
///
/// Both supported encodings fix hash references at exactly
/// [`Hasher::LENGTH`] bytes, so the hash is decoded eagerly; anything else
/// embedded in a parent node is carried verbatim as an inline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeHandle<'a, H> {
	Hash(H),
	Inline(&'a [u8]),
}

/// Read a hash from a slice into a Hasher output. Returns None if the
/// slice is the wrong length.
pub fn decode_hash<H: Hasher>(data: &[u8]) -> Option<H::Out> {
	if data.len() != H::LENGTH {
		return None
	}
	let mut hash = H::Out::default();
	hash.as_mut().copy_from_slice(data);
	Some(hash)
}

/// Type of node in the trie and essential information thereof.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Node<'a, H> {
	/// Null trie node; could be an empty root or an empty branch entry.
	Empty,
	/// Leaf node; has key slice and value. Value may not be empty.
	Leaf(NibbleSlice<'a>, &'a [u8]),
	/// Extension node; has key slice and node handle. Only produced by the
	/// Ethereum encoding.
	Extension(NibbleSlice<'a>, NodeHandle<'a, H>),
	/// Branch node; has slice of child nodes (each possibly null) and an
	/// optional immediate node data. Only produced by the Ethereum
	/// encoding.
	Branch([Option<NodeHandle<'a, H>>; nibble_ops::NIBBLE_LENGTH], Option<&'a [u8]>),
	/// Branch node with support for a nibble (when extension nodes are not
	/// used). Only produced by the Substrate encoding.
	NibbledBranch(
		NibbleSlice<'a>,
		[Option<NodeHandle<'a, H>>; nibble_ops::NIBBLE_LENGTH],
		Option<&'a [u8]>,
	),
}
