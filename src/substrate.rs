// Copyright (C) Parity Technologies (UK) Ltd.
//
// SPDX-License-Identifier: Apache-2.0

//! Node codec for the Substrate trie encoding (bit-packed header byte,
//! SCALE framing).

use crate::{
	nibble::{nibble_ops, NibbleSlice},
	node::{decode_hash, Node, NodeHandle},
	node_codec::NodeCodec,
	rstd::{fmt, marker::PhantomData},
	TrieLayout,
};
use hash_db::Hasher;
use parity_scale_codec::{self as codec, Compact, Decode, Input};

/// Constants of the node header byte.
mod trie_constants {
	pub const EMPTY_TRIE: u8 = 0b_0000_0000;
	pub const LEAF_PREFIX_MASK: u8 = 0b_01 << 6;
	pub const BRANCH_WITHOUT_MASK: u8 = 0b_10 << 6;
	pub const BRANCH_WITH_MASK: u8 = 0b_11 << 6;
}

/// Error type for Substrate node decoding.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
	/// A node does not follow the expected byte layout.
	BadFormat,
	/// A SCALE-encoded element of a node failed to decode.
	Decode(codec::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::BadFormat => write!(f, "Bad node format"),
			Error::Decode(err) => write!(f, "Decoding failed: {}", err),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<codec::Error> for Error {
	fn from(x: codec::Error) -> Self {
		Error::Decode(x)
	}
}

/// Helper struct for trie node decoding. This implements `codec::Input` on
/// a byte slice, while tracking the absolute position, and hands out
/// subslices that outlive the cursor.
struct ByteSliceInput<'a> {
	data: &'a [u8],
	offset: usize,
}

impl<'a> ByteSliceInput<'a> {
	fn new(data: &'a [u8]) -> Self {
		ByteSliceInput { data, offset: 0 }
	}

	fn take(&mut self, count: usize) -> Result<&'a [u8], codec::Error> {
		if self.offset + count > self.data.len() {
			return Err("out of data".into())
		}

		let range = self.offset..(self.offset + count);
		self.offset += count;
		Ok(&self.data[range])
	}
}

impl<'a> Input for ByteSliceInput<'a> {
	fn remaining_len(&mut self) -> Result<Option<usize>, codec::Error> {
		Ok(Some(self.data.len().saturating_sub(self.offset)))
	}

	fn read(&mut self, into: &mut [u8]) -> Result<(), codec::Error> {
		let data = self.take(into.len())?;
		into.copy_from_slice(data);
		Ok(())
	}

	fn read_byte(&mut self) -> Result<u8, codec::Error> {
		if self.offset + 1 > self.data.len() {
			return Err("out of data".into())
		}

		let byte = self.data[self.offset];
		self.offset += 1;
		Ok(byte)
	}
}

/// A node header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum NodeHeader {
	Null,
	// contains wether there is a value and nibble count
	Branch(bool, usize),
	// contains nibble count
	Leaf(usize),
}

impl NodeHeader {
	fn decode(input: &mut impl Input) -> Result<Self, Error> {
		let i = input.read_byte()?;
		if i == trie_constants::EMPTY_TRIE {
			return Ok(NodeHeader::Null)
		}
		match i & (0b11 << 6) {
			trie_constants::LEAF_PREFIX_MASK => Ok(NodeHeader::Leaf(decode_size(i, input)?)),
			trie_constants::BRANCH_WITH_MASK =>
				Ok(NodeHeader::Branch(true, decode_size(i, input)?)),
			trie_constants::BRANCH_WITHOUT_MASK =>
				Ok(NodeHeader::Branch(false, decode_size(i, input)?)),
			// the remaining `0b00` space carries no valid node
			_ => Err(Error::BadFormat),
		}
	}
}

/// Decode a nibble count from the header byte and stream input.
///
/// The count saturates the 6 low header bits first; a saturated header is
/// followed by a byte-wise varint where every `0xff` byte contributes 255
/// and the first other byte terminates the count.
fn decode_size(first: u8, input: &mut impl Input) -> Result<usize, Error> {
	let max_value = 255u8 >> 2;
	let mut result = (first & max_value) as usize;
	if result < max_value as usize {
		return Ok(result)
	}
	result -= 1;
	loop {
		let n = input.read_byte()? as usize;
		if n < 255 {
			return Ok(result + n + 1)
		}
		result += 255;
	}
}

const BITMAP_LENGTH: usize = 2;

/// Radix 16 trie, bitmap encoding implementation, it contains children
/// mapping information for a branch (children presence only), it encodes
/// into a compact bitmap encoding representation.
struct Bitmap(u16);

impl Bitmap {
	fn decode(data: &[u8]) -> Result<Self, Error> {
		let value = u16::decode(&mut &data[..])?;
		if value == 0 {
			Err(Error::BadFormat)
		} else {
			Ok(Bitmap(value))
		}
	}

	fn value_at(&self, i: usize) -> bool {
		self.0 & (1u16 << i) != 0
	}
}

/// Read a partial key of `nibble_count` nibbles. The padding nibble of an
/// odd count must be zero.
fn decode_partial<'a>(
	input: &mut ByteSliceInput<'a>,
	nibble_count: usize,
) -> Result<NibbleSlice<'a>, Error> {
	let padded = nibble_count % nibble_ops::NIBBLE_PER_BYTE != 0;
	let bytes = input.take(
		(nibble_count + (nibble_ops::NIBBLE_PER_BYTE - 1)) / nibble_ops::NIBBLE_PER_BYTE,
	)?;
	if padded && nibble_ops::pad_left(bytes[0]) != 0 {
		return Err(Error::BadFormat)
	}
	Ok(NibbleSlice::new_offset(bytes, nibble_ops::number_padding(nibble_count)))
}

/// Read a SCALE length-prefixed value.
fn decode_value<'a>(input: &mut ByteSliceInput<'a>) -> Result<&'a [u8], Error> {
	let count = <Compact<u32>>::decode(input)?.0 as usize;
	Ok(input.take(count)?)
}

/// Concrete implementation of a [`NodeCodec`] for the Substrate trie
/// encoding.
///
/// It is generic over `H` the [`Hasher`].
pub struct SubstrateCodec<H>(PhantomData<H>);

impl<H: Hasher> NodeCodec for SubstrateCodec<H> {
	type Error = Error;
	type HashOut = H::Out;

	fn decode<'a>(data: &'a [u8]) -> Result<Node<'a, H::Out>, Self::Error> {
		let mut input = ByteSliceInput::new(data);
		match NodeHeader::decode(&mut input)? {
			NodeHeader::Null => Ok(Node::Empty),
			NodeHeader::Leaf(nibble_count) => {
				let partial = decode_partial(&mut input, nibble_count)?;
				let value = decode_value(&mut input)?;
				Ok(Node::Leaf(partial, value))
			},
			NodeHeader::Branch(has_value, nibble_count) => {
				let partial = decode_partial(&mut input, nibble_count)?;
				let bitmap = Bitmap::decode(input.take(BITMAP_LENGTH)?)?;
				let value = if has_value { Some(decode_value(&mut input)?) } else { None };
				let mut children = [None; nibble_ops::NIBBLE_LENGTH];
				for (i, child) in children.iter_mut().enumerate() {
					if bitmap.value_at(i) {
						let count = <Compact<u32>>::decode(&mut input)?.0 as usize;
						let handle = input.take(count)?;
						*child = Some(match decode_hash::<H>(handle) {
							Some(hash) => NodeHandle::Hash(hash),
							None => NodeHandle::Inline(handle),
						});
					}
				}
				Ok(Node::NibbledBranch(partial, children, value))
			},
		}
	}
}

/// Substrate trie layout over a given hasher.
pub struct SubstrateLayout<H>(PhantomData<H>);

impl<H: Hasher> TrieLayout for SubstrateLayout<H> {
	type Hash = H;
	type Codec = SubstrateCodec<H>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{keccak_hasher::KeccakHasher, nibble::NibbleSlice, node::Node};
	use hex_literal::hex;

	type Codec = SubstrateCodec<KeccakHasher>;

	#[test]
	fn decode_empty() {
		assert_eq!(Codec::decode(&[0x00]).unwrap(), Node::Empty);
	}

	#[test]
	fn decode_leaf_with_odd_partial() {
		// one-nibble key `f`, value 0xdeadbeef
		let encoded = hex!("410f10deadbeef");
		match Codec::decode(&encoded).unwrap() {
			Node::Leaf(partial, value) => {
				assert_eq!(partial, NibbleSlice::new_offset(&[0x0f], 1));
				assert_eq!(value, &hex!("deadbeef"));
			},
			node => panic!("expected leaf, got {:?}", node),
		}
	}

	#[test]
	fn decode_leaf_with_even_partial() {
		// two-nibble key `6b`, value `v`
		let encoded = hex!("426b0476");
		match Codec::decode(&encoded).unwrap() {
			Node::Leaf(partial, value) => {
				assert_eq!(partial, NibbleSlice::new(&[0x6b]));
				assert_eq!(value, b"v");
			},
			node => panic!("expected leaf, got {:?}", node),
		}
	}

	#[test]
	fn decode_branch_with_value_and_children() {
		// partial `6162`, value `x`, hash child at slot 6, inline leaf
		// child at slot 7
		let child_hash = [0x11u8; 32];
		let inline_leaf = hex!("410f0478");
		let mut encoded = hex!("c46162c0000478").to_vec();
		encoded.push((32u8) << 2);
		encoded.extend_from_slice(&child_hash);
		encoded.push((inline_leaf.len() as u8) << 2);
		encoded.extend_from_slice(&inline_leaf);

		match Codec::decode(&encoded).unwrap() {
			Node::NibbledBranch(partial, children, value) => {
				assert_eq!(partial, NibbleSlice::new(&hex!("6162")));
				assert_eq!(value, Some(&b"x"[..]));
				assert_eq!(children[6], Some(NodeHandle::Hash(child_hash)));
				assert_eq!(children[7], Some(NodeHandle::Inline(&inline_leaf[..])));
				for (i, child) in children.iter().enumerate() {
					if i != 6 && i != 7 {
						assert_eq!(*child, None);
					}
				}
			},
			node => panic!("expected branch, got {:?}", node),
		}
	}

	#[test]
	fn decode_varint_nibble_count() {
		// 63 nibbles saturate the header; the follow-up byte finishes the
		// count
		let mut encoded = vec![0x40 | 0x3f, 0x00, 0x01];
		encoded.extend_from_slice(&[0x23; 31]);
		encoded.extend_from_slice(&hex!("0476"));
		match Codec::decode(&encoded).unwrap() {
			Node::Leaf(partial, value) => {
				assert_eq!(partial.len(), 63);
				assert_eq!(partial.at(0), 1);
				assert_eq!(partial.at(1), 2);
				assert_eq!(partial.at(62), 3);
				assert_eq!(value, b"v");
			},
			node => panic!("expected leaf, got {:?}", node),
		}
	}

	#[test]
	fn reject_nonzero_padding() {
		// odd count with a dirty padding nibble
		let encoded = hex!("41ff10deadbeef");
		assert_eq!(Codec::decode(&encoded), Err(Error::BadFormat));
	}

	#[test]
	fn reject_reserved_header() {
		// `0b00` prefix other than the empty node
		assert!(matches!(Codec::decode(&hex!("2a")), Err(Error::BadFormat)));
	}

	#[test]
	fn reject_empty_bitmap() {
		// branch header, empty partial, no children at all
		let encoded = hex!("800000");
		assert!(Codec::decode(&encoded).is_err());
	}

	#[test]
	fn reject_truncated_input() {
		assert!(matches!(Codec::decode(&hex!("410f10dead")), Err(Error::Decode(_))));
		assert!(Codec::decode(&[]).is_err());
	}
}
