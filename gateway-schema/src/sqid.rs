use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::registry::TypeRegistry;

const STD_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Decoded contents of an opaque id body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedId {
    pub model: String,
    pub type_num: u32,
    pub namespace: Option<u32>,
    pub timestamp_ms: u64,
    pub random: u32,
}

/// Seeded alphanumeric id codec.
///
/// The alphabet is a Fisher–Yates shuffle of the 62-character alphanumeric
/// set, seeded deterministically so the same seed always produces the
/// same encodings and two different seeds (overwhelmingly) don't.
#[derive(Debug, Clone)]
pub struct SqidCodec {
    alphabet: Vec<char>,
    index_of: [i8; 128],
    min_length: usize,
}

impl SqidCodec {
    pub fn new(seed: u64, min_length: usize) -> Self {
        let mut chars: Vec<char> = STD_ALPHABET.chars().collect();
        let mut rng = StdRng::seed_from_u64(seed);
        chars.shuffle(&mut rng);

        let mut index_of = [-1i8; 128];
        for (i, c) in chars.iter().enumerate() {
            index_of[*c as usize] = i as i8;
        }

        Self { alphabet: chars, min_length: min_length.max(1), index_of }
    }

    fn base(&self) -> u128 {
        self.alphabet.len() as u128
    }

    /// Encode `(typeNum, namespace?, timestamp, random)` into an opaque
    /// alphanumeric segment of at least `minLength` characters.
    pub fn encode(&self, type_num: u32, namespace: Option<u32>, timestamp_ms: u64, random: u32) -> String {
        let packed = pack(type_num, namespace, timestamp_ms, random);
        self.encode_u128(packed)
    }

    fn encode_u128(&self, mut n: u128) -> String {
        let base = self.base();
        if n == 0 {
            return self.alphabet[0].to_string().repeat(self.min_length);
        }
        let mut digits = Vec::new();
        while n > 0 {
            let rem = (n % base) as usize;
            digits.push(self.alphabet[rem]);
            n /= base;
        }
        while digits.len() < self.min_length {
            digits.push(self.alphabet[0]);
        }
        digits.iter().rev().collect()
    }

    fn decode_u128(&self, segment: &str) -> Option<u128> {
        let base = self.base();
        let mut n: u128 = 0;
        for c in segment.chars() {
            let idx = *self.index_of.get(c as usize)?;
            if idx < 0 {
                return None;
            }
            n = n.checked_mul(base)?.checked_add(idx as u128)?;
        }
        Some(n)
    }

    /// Decode a prefixed id (`"contact_" + segment`) back to its typed
    /// contents using `registry`. Returns `None` if the body doesn't
    /// decode to a known alphabet, or decodes to an unknown `typeNum`.
    pub fn decode(&self, prefixed_id: &str, registry: &TypeRegistry) -> Option<DecodedId> {
        let (_prefix, body) = prefixed_id.split_once('_')?;
        let packed = self.decode_u128(body)?;
        let (type_num, namespace, timestamp_ms, random) = unpack(packed);
        let model = registry.model_name(type_num)?.to_string();
        Some(DecodedId { model, type_num, namespace, timestamp_ms, random })
    }
}

const TYPE_BITS: u32 = 20;
const NS_FLAG_BITS: u32 = 1;
const NS_BITS: u32 = 27;
const TS_BITS: u32 = 48;
const RAND_BITS: u32 = 32;

fn pack(type_num: u32, namespace: Option<u32>, timestamp_ms: u64, random: u32) -> u128 {
    let type_num = (type_num as u128) & ((1 << TYPE_BITS) - 1);
    let (ns_flag, ns_val): (u128, u128) = match namespace {
        Some(n) => (1, (n as u128) & ((1u128 << NS_BITS) - 1)),
        None => (0, 0),
    };
    let ts = (timestamp_ms as u128) & ((1u128 << TS_BITS) - 1);
    let rnd = (random as u128) & ((1u128 << RAND_BITS) - 1);

    let mut out = type_num;
    out = (out << NS_FLAG_BITS) | ns_flag;
    out = (out << NS_BITS) | ns_val;
    out = (out << TS_BITS) | ts;
    out = (out << RAND_BITS) | rnd;
    out
}

fn unpack(packed: u128) -> (u32, Option<u32>, u64, u32) {
    let random = (packed & ((1u128 << RAND_BITS) - 1)) as u32;
    let rest = packed >> RAND_BITS;
    let timestamp_ms = (rest & ((1u128 << TS_BITS) - 1)) as u64;
    let rest = rest >> TS_BITS;
    let ns_val = (rest & ((1u128 << NS_BITS) - 1)) as u32;
    let rest = rest >> NS_BITS;
    let ns_flag = rest & ((1 << NS_FLAG_BITS) - 1);
    let rest = rest >> NS_FLAG_BITS;
    let type_num = (rest & ((1u128 << TYPE_BITS) - 1)) as u32;
    let namespace = if ns_flag == 1 { Some(ns_val) } else { None };
    (type_num, namespace, timestamp_ms, random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;
    use crate::schema::parse_schema;
    use indexmap::IndexMap;

    fn registry() -> TypeRegistry {
        let raw: IndexMap<String, IndexMap<String, String>> =
            [("Contact".to_string(), [("name".to_string(), "string!".to_string())].into_iter().collect())]
                .into_iter()
                .collect();
        TypeRegistry::from_schema(&parse_schema(&raw).unwrap())
    }

    #[test]
    fn round_trips() {
        let codec = SqidCodec::new(42, 8);
        let registry = registry();
        let type_num = registry.type_num("Contact").unwrap();
        let encoded = codec.encode(type_num, None, 1_700_000_000_000, 12345);
        let prefixed = format!("contact_{encoded}");
        let decoded = codec.decode(&prefixed, &registry).unwrap();
        assert_eq!(decoded.model, "Contact");
        assert_eq!(decoded.type_num, type_num);
        assert_eq!(decoded.timestamp_ms, 1_700_000_000_000);
        assert_eq!(decoded.random, 12345);
        assert_eq!(decoded.namespace, None);
    }

    #[test]
    fn round_trips_with_namespace() {
        let codec = SqidCodec::new(7, 8);
        let registry = registry();
        let type_num = registry.type_num("Contact").unwrap();
        let encoded = codec.encode(type_num, Some(99), 1, 2);
        let decoded = codec.decode(&format!("contact_{encoded}"), &registry).unwrap();
        assert_eq!(decoded.namespace, Some(99));
    }

    #[test]
    fn respects_min_length() {
        let codec = SqidCodec::new(1, 12);
        let encoded = codec.encode(1, None, 0, 0);
        assert!(encoded.len() >= 12);
    }

    #[test]
    fn unknown_type_num_yields_none() {
        let codec = SqidCodec::new(1, 8);
        let registry = registry();
        let encoded = codec.encode(999, None, 1, 1);
        assert!(codec.decode(&format!("bogus_{encoded}"), &registry).is_none());
    }

    #[test]
    fn different_seeds_diverge() {
        let a = SqidCodec::new(1, 8).encode(1, None, 1_700_000_000_000, 555);
        let b = SqidCodec::new(2, 8).encode(1, None, 1_700_000_000_000, 555);
        assert_ne!(a, b);
    }

    #[test]
    fn consecutive_random_draws_all_differ() {
        let codec = SqidCodec::new(1, 8);
        let registry = registry();
        let type_num = registry.type_num("Contact").unwrap();
        let mut seen = std::collections::HashSet::new();
        for i in 0..100u32 {
            let encoded = codec.encode(type_num, None, 1_700_000_000_000 + i as u64, i);
            assert!(seen.insert(encoded));
        }
    }
}
