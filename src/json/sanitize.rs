//! Serializer adapter used by [`super::safe_stringify`].
//!
//! Wraps any `serde::Serializer` and rewrites two things on the way through:
//! integers a JSON consumer cannot hold exactly become decimal strings, and
//! nesting deeper than [`MAX_DEPTH`] fails instead of recursing until the
//! stack runs out (the only symptom a reference cycle has through serde).

use serde::ser::{self, Serialize, Serializer};

/// Largest integer an IEEE-754 double represents exactly (`2^53 - 1`).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Deepest nesting serde_json will parse back (its parser stops at 128).
pub const MAX_DEPTH: usize = 127;

/// A value paired with the nesting depth it is serialized at.
pub(crate) struct Sanitized<'a, T: ?Sized> {
    value: &'a T,
    depth: usize,
}

impl<'a, T: ?Sized> Sanitized<'a, T> {
    pub(crate) fn root(value: &'a T) -> Self {
        Self { value, depth: 0 }
    }

    fn at(value: &'a T, depth: usize) -> Self {
        Self { value, depth }
    }
}

impl<T: Serialize + ?Sized> Serialize for Sanitized<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(Sanitizer {
            inner: serializer,
            depth: self.depth,
        })
    }
}

fn descend<E: ser::Error>(depth: usize) -> Result<usize, E> {
    let next = depth + 1;
    if next > MAX_DEPTH {
        return Err(E::custom(format!(
            "value nests deeper than {MAX_DEPTH} levels (possible reference cycle)"
        )));
    }
    Ok(next)
}

struct Sanitizer<S> {
    inner: S,
    depth: usize,
}

impl<S: Serializer> Serializer for Sanitizer<S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = Compound<S::SerializeSeq>;
    type SerializeTuple = Compound<S::SerializeTuple>;
    type SerializeTupleStruct = Compound<S::SerializeTupleStruct>;
    type SerializeTupleVariant = Compound<S::SerializeTupleVariant>;
    type SerializeMap = Compound<S::SerializeMap>;
    type SerializeStruct = Compound<S::SerializeStruct>;
    type SerializeStructVariant = Compound<S::SerializeStructVariant>;

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }

    // ── integers ─────────────────────────────────────────────────────────

    fn serialize_i8(self, v: i8) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i8(v)
    }

    fn serialize_i16(self, v: i16) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i16(v)
    }

    fn serialize_i32(self, v: i32) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i32(v)
    }

    fn serialize_i64(self, v: i64) -> Result<S::Ok, S::Error> {
        if v.unsigned_abs() > MAX_SAFE_INTEGER {
            self.inner.collect_str(&v)
        } else {
            self.inner.serialize_i64(v)
        }
    }

    fn serialize_i128(self, v: i128) -> Result<S::Ok, S::Error> {
        if v.unsigned_abs() > u128::from(MAX_SAFE_INTEGER) {
            self.inner.collect_str(&v)
        } else {
            // In range, so the narrowing is lossless.
            self.inner.serialize_i64(v as i64)
        }
    }

    fn serialize_u8(self, v: u8) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u8(v)
    }

    fn serialize_u16(self, v: u16) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u16(v)
    }

    fn serialize_u32(self, v: u32) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u32(v)
    }

    fn serialize_u64(self, v: u64) -> Result<S::Ok, S::Error> {
        if v > MAX_SAFE_INTEGER {
            self.inner.collect_str(&v)
        } else {
            self.inner.serialize_u64(v)
        }
    }

    fn serialize_u128(self, v: u128) -> Result<S::Ok, S::Error> {
        if v > u128::from(MAX_SAFE_INTEGER) {
            self.inner.collect_str(&v)
        } else {
            self.inner.serialize_u64(v as u64)
        }
    }

    // ── scalars ──────────────────────────────────────────────────────────

    fn serialize_bool(self, v: bool) -> Result<S::Ok, S::Error> {
        self.inner.serialize_bool(v)
    }

    fn serialize_f32(self, v: f32) -> Result<S::Ok, S::Error> {
        self.inner.serialize_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<S::Ok, S::Error> {
        self.inner.serialize_f64(v)
    }

    fn serialize_char(self, v: char) -> Result<S::Ok, S::Error> {
        self.inner.serialize_char(v)
    }

    fn serialize_str(self, v: &str) -> Result<S::Ok, S::Error> {
        self.inner.serialize_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<S::Ok, S::Error> {
        self.inner.serialize_bytes(v)
    }

    fn serialize_none(self) -> Result<S::Ok, S::Error> {
        self.inner.serialize_none()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<S::Ok, S::Error> {
        self.inner.serialize_some(&Sanitized::at(value, self.depth))
    }

    fn serialize_unit(self) -> Result<S::Ok, S::Error> {
        self.inner.serialize_unit()
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<S::Ok, S::Error> {
        self.inner.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<S::Ok, S::Error> {
        self.inner.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        self.inner.serialize_newtype_struct(name, &Sanitized::at(value, self.depth))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        let depth = descend::<S::Error>(self.depth)?;
        self.inner.serialize_newtype_variant(
            name,
            variant_index,
            variant,
            &Sanitized::at(value, depth),
        )
    }

    // ── compounds ────────────────────────────────────────────────────────

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, S::Error> {
        let depth = descend::<S::Error>(self.depth)?;
        Compound::wrap(self.inner.serialize_seq(len), depth)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, S::Error> {
        let depth = descend::<S::Error>(self.depth)?;
        Compound::wrap(self.inner.serialize_tuple(len), depth)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, S::Error> {
        let depth = descend::<S::Error>(self.depth)?;
        Compound::wrap(self.inner.serialize_tuple_struct(name, len), depth)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, S::Error> {
        let depth = descend::<S::Error>(self.depth)?;
        Compound::wrap(
            self.inner.serialize_tuple_variant(name, variant_index, variant, len),
            depth,
        )
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, S::Error> {
        let depth = descend::<S::Error>(self.depth)?;
        Compound::wrap(self.inner.serialize_map(len), depth)
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, S::Error> {
        let depth = descend::<S::Error>(self.depth)?;
        Compound::wrap(self.inner.serialize_struct(name, len), depth)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, S::Error> {
        let depth = descend::<S::Error>(self.depth)?;
        Compound::wrap(
            self.inner.serialize_struct_variant(name, variant_index, variant, len),
            depth,
        )
    }
}

/// Forwards compound serialization, wrapping every child at `depth`.
struct Compound<C> {
    inner: C,
    depth: usize,
}

impl<C> Compound<C> {
    fn wrap<E>(inner: Result<C, E>, depth: usize) -> Result<Self, E> {
        inner.map(|inner| Self { inner, depth })
    }
}

impl<C: ser::SerializeSeq> ser::SerializeSeq for Compound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_element(&Sanitized::at(value, self.depth))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTuple> ser::SerializeTuple for Compound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_element(&Sanitized::at(value, self.depth))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleStruct> ser::SerializeTupleStruct for Compound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_field(&Sanitized::at(value, self.depth))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleVariant> ser::SerializeTupleVariant for Compound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_field(&Sanitized::at(value, self.depth))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeMap> ser::SerializeMap for Compound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    // Keys go through untouched; serde_json already stringifies integer keys.
    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), C::Error> {
        self.inner.serialize_key(key)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_value(&Sanitized::at(value, self.depth))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeStruct> ser::SerializeStruct for Compound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), C::Error> {
        self.inner.serialize_field(key, &Sanitized::at(value, self.depth))
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), C::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeStructVariant> ser::SerializeStructVariant for Compound<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), C::Error> {
        self.inner.serialize_field(key, &Sanitized::at(value, self.depth))
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), C::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}
