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

//! Generic trait for trie node decoding. Takes a `hash_db::Hasher` output
//! to parametrize the hashes used in child references.

use crate::{node::Node, rstd::hash, MaybeDebug};

/// Trait for trie node decoding.
pub trait NodeCodec: Sized {
	/// Codec error type.
	type Error: crate::rstd::Error;

	/// Output type of encoded node hasher.
	type HashOut: AsRef<[u8]>
		+ AsMut<[u8]>
		+ Default
		+ MaybeDebug
		+ PartialEq
		+ Eq
		+ hash::Hash
		+ Send
		+ Sync
		+ Clone
		+ Copy;

	/// Decode bytes to a `Node` borrowing from `data`. Returns
	/// `Self::Error` on malformed input.
	fn decode<'a>(data: &'a [u8]) -> Result<Node<'a, Self::HashOut>, Self::Error>;
}
