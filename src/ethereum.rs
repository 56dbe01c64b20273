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

//! Node codec for the Ethereum trie encoding (RLP framing, hex-prefix
//! partial keys).

use crate::{
	nibble::{nibble_ops, NibbleSlice},
	node::{decode_hash, Node, NodeHandle},
	node_codec::NodeCodec,
	rstd::marker::PhantomData,
	TrieLayout,
};
use hash_db::Hasher;
use rlp::{DecoderError, Prototype, Rlp};

/// Decode the hex-prefix header of a leaf/extension partial key, returning
/// the key as a `NibbleSlice` over the payload and whether the node is a
/// leaf.
///
/// The header nibble carries the leaf flag in its second bit and the
/// odd-length flag in its first; an even length leaves the rest of the
/// first byte as zero padding.
fn decode_hex_prefix(data: &[u8]) -> Result<(NibbleSlice, bool), DecoderError> {
	if data.is_empty() {
		return Err(DecoderError::Custom("empty partial key"))
	}
	let flag = data[0] >> nibble_ops::BIT_PER_NIBBLE;
	if flag > 0b11 {
		return Err(DecoderError::Custom("invalid hex-prefix flag"))
	}
	let is_leaf = flag & 0b10 != 0;
	let is_odd = flag & 0b01 != 0;
	if !is_odd && nibble_ops::pad_right(data[0]) != 0 {
		return Err(DecoderError::Custom("nonzero hex-prefix padding"))
	}
	Ok((NibbleSlice::new_offset(data, nibble_ops::NIBBLE_PER_BYTE - is_odd as usize), is_leaf))
}

/// Interpret one RLP item as a child reference: a 32-byte string names a
/// node by hash, a nested list embeds it verbatim.
fn decode_child<'a, H: Hasher>(rlp: Rlp<'a>) -> Result<NodeHandle<'a, H::Out>, DecoderError> {
	if rlp.is_data() {
		match decode_hash::<H>(rlp.data()?) {
			Some(hash) => Ok(NodeHandle::Hash(hash)),
			None => Err(DecoderError::Custom("invalid length for a child hash")),
		}
	} else {
		Ok(NodeHandle::Inline(rlp.as_raw()))
	}
}

/// Concrete implementation of a [`NodeCodec`] for the Ethereum trie
/// encoding.
///
/// It is generic over `H` the [`Hasher`].
pub struct EthereumCodec<H>(PhantomData<H>);

impl<H: Hasher> NodeCodec for EthereumCodec<H> {
	type Error = DecoderError;
	type HashOut = H::Out;

	fn decode<'a>(data: &'a [u8]) -> Result<Node<'a, H::Out>, Self::Error> {
		let r = Rlp::new(data);
		match r.prototype()? {
			Prototype::List(2) => {
				let (partial, is_leaf) = decode_hex_prefix(r.at(0)?.data()?)?;
				if is_leaf {
					Ok(Node::Leaf(partial, r.at(1)?.data()?))
				} else {
					Ok(Node::Extension(partial, decode_child::<H>(r.at(1)?)?))
				}
			},
			Prototype::List(17) => {
				let mut children = [None; nibble_ops::NIBBLE_LENGTH];
				for (i, child) in children.iter_mut().enumerate() {
					let item = r.at(i)?;
					if !matches!(item.prototype()?, Prototype::Data(0)) {
						*child = Some(decode_child::<H>(item)?);
					}
				}
				let value = match r.at(16)?.prototype()? {
					Prototype::Data(0) => None,
					Prototype::Data(_) => Some(r.at(16)?.data()?),
					_ => return Err(DecoderError::Custom("branch value is not a string")),
				};
				Ok(Node::Branch(children, value))
			},
			Prototype::Data(0) => Ok(Node::Empty),
			_ => Err(DecoderError::Custom("unexpected trie node prototype")),
		}
	}
}

/// Ethereum trie layout over a given hasher.
pub struct EthereumLayout<H>(PhantomData<H>);

impl<H: Hasher> TrieLayout for EthereumLayout<H> {
	type Hash = H;
	type Codec = EthereumCodec<H>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{keccak_hasher::KeccakHasher, nibble::NibbleSlice, node::Node};
	use hex_literal::hex;

	type Codec = EthereumCodec<KeccakHasher>;

	#[test]
	fn decode_empty() {
		assert_eq!(Codec::decode(&[0x80]).unwrap(), Node::Empty);
	}

	#[test]
	fn decode_leaf_with_empty_partial() {
		// `[0x20, 0x0a]`: leaf header for an empty key, value 0x0a
		let encoded = hex!("c2200a");
		match Codec::decode(&encoded).unwrap() {
			Node::Leaf(partial, value) => {
				assert!(partial.is_empty());
				assert_eq!(value, &[0x0a]);
			},
			node => panic!("expected leaf, got {:?}", node),
		}
	}

	#[test]
	fn decode_leaf_with_odd_partial() {
		// leaf header `3f` packs the first key nibble
		let encoded = hex!("c8823f128461626364");
		match Codec::decode(&encoded).unwrap() {
			Node::Leaf(partial, value) => {
				assert_eq!(partial, NibbleSlice::new_offset(&hex!("3f12"), 1));
				assert_eq!(partial.len(), 3);
				assert_eq!(partial.at(0), 0xf);
				assert_eq!(value, b"abcd");
			},
			node => panic!("expected leaf, got {:?}", node),
		}
	}

	#[test]
	fn decode_extension_with_hash_child() {
		let child_hash = [0x22u8; 32];
		let mut encoded = hex!("e58300abcda0").to_vec();
		encoded.extend_from_slice(&child_hash);
		match Codec::decode(&encoded).unwrap() {
			Node::Extension(partial, child) => {
				assert_eq!(partial, NibbleSlice::new_offset(&hex!("00abcd"), 2));
				assert_eq!(partial.len(), 4);
				assert_eq!(child, NodeHandle::Hash(child_hash));
			},
			node => panic!("expected extension, got {:?}", node),
		}
	}

	#[test]
	fn decode_branch_with_inline_child() {
		// slot 1 carries an embedded leaf, slot 16 the branch value
		let encoded = hex!("d380c2206180808080808080808080808080806b");
		match Codec::decode(&encoded).unwrap() {
			Node::Branch(children, value) => {
				assert_eq!(children[1], Some(NodeHandle::Inline(&hex!("c22061")[..])));
				for (i, child) in children.iter().enumerate() {
					if i != 1 {
						assert_eq!(*child, None);
					}
				}
				assert_eq!(value, Some(&hex!("6b")[..]));
			},
			node => panic!("expected branch, got {:?}", node),
		}
	}

	#[test]
	fn reject_invalid_hex_prefix_flag() {
		// header nibble 0x4 is outside the two defined flag bits
		let encoded = hex!("c2400a");
		assert!(matches!(Codec::decode(&encoded), Err(DecoderError::Custom(_))));
	}

	#[test]
	fn reject_nonzero_even_padding() {
		// even-length leaf whose header byte has a dirty low nibble
		let encoded = hex!("c2210a");
		assert!(matches!(Codec::decode(&encoded), Err(DecoderError::Custom(_))));
	}

	#[test]
	fn reject_non_hash_child_string() {
		// extension whose child is a 2-byte string, neither hash nor list
		let encoded = hex!("c51083abcdef");
		assert!(Codec::decode(&encoded).is_err());
	}

	#[test]
	fn reject_wrong_list_arity() {
		let mut stream = rlp::RlpStream::new_list(3);
		stream.append(&&b"a"[..]);
		stream.append(&&b"b"[..]);
		stream.append(&&b"c"[..]);
		let encoded = stream.out();
		assert!(matches!(
			Codec::decode(&encoded),
			Err(DecoderError::Custom("unexpected trie node prototype"))
		));
	}

	#[test]
	fn reject_garbage() {
		assert!(Codec::decode(b"this is not a trie node").is_err());
	}
}
