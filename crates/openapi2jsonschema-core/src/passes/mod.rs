//! Normalization pass modules.
//!
//! Each pass is a total `Value -> Value` fold: mappings and sequences are
//! rebuilt, scalars pass through unchanged. Passes run per component in
//! order (1-4) after extraction; passes 2-4 are gated by `strict` and
//! `kubernetes`.

pub mod p1_refs;
pub mod p2_strict;
pub mod p3_int_or_string;
pub mod p4_nullable_optional;
