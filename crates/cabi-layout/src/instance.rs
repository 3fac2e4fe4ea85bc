//! Schema + byte buffer.
//!
//! An `Instance` borrows its schema and owns (or borrows) its backing bytes.
//! Creating one freezes the schema. Many instances can share one schema;
//! instances backed by caller-supplied slices alias that memory.

use serde::{Serialize, Serializer};

use cabi_core::Value;

use crate::accessor::FieldAccessor;
use crate::error::{LayoutError, Result};
use crate::schema::{CompositeKind, CompositeType, FieldInfo};

pub struct Instance<'s, B = Vec<u8>> {
    schema: &'s CompositeType,
    buffer: B,
}

impl<'s> Instance<'s> {
    /// Instance over a fresh zero-filled buffer of `schema.size()` bytes.
    pub fn new(schema: &'s CompositeType) -> Self {
        schema.seal();
        Self {
            schema,
            buffer: schema.provider().allocate(schema.size()),
        }
    }
}

impl<'s, B: AsRef<[u8]>> Instance<'s, B> {
    /// Instance over existing bytes; `buffer` must hold at least
    /// `schema.size()` bytes.
    pub fn from_buffer(schema: &'s CompositeType, buffer: B) -> Result<Self> {
        let actual = buffer.as_ref().len();
        if actual < schema.size() {
            return Err(LayoutError::BufferTooSmall {
                needed: schema.size(),
                actual,
            });
        }
        schema.seal();
        Ok(Self { schema, buffer })
    }

    pub fn schema(&self) -> &'s CompositeType {
        self.schema
    }

    pub fn field(&self, name: &str) -> Result<&'s FieldInfo> {
        self.schema.require(name)
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        let info = self.field(name)?;
        info.accessor()
            .get(name, self.schema.provider().as_ref(), self.buffer.as_ref())
    }

    /// Read-only view of a nested struct or union field.
    pub fn nested(&self, name: &str) -> Result<Instance<'s, &[u8]>> {
        let (schema, offset) = self.composite_field(name)?;
        let buffer = &self.buffer.as_ref()[offset..offset + schema.size()];
        Ok(Instance { schema, buffer })
    }

    /// The whole backing buffer.
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    pub fn into_buffer(self) -> B {
        self.buffer
    }

    /// Every field as an ordered object, nested composites flattened.
    pub fn to_object(&self) -> Result<Value> {
        self.schema.read_object(self.buffer.as_ref())
    }

    /// `to_object` rendered as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_object()?)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_object()?)?)
    }

    fn composite_field(&self, name: &str) -> Result<(&'s CompositeType, usize)> {
        let info = self.field(name)?;
        match info.accessor() {
            FieldAccessor::Composite { offset, schema } => Ok((schema.as_ref(), *offset)),
            _ => Err(LayoutError::SchemaMismatch {
                field: name.to_string(),
                expected: "struct or union".to_string(),
                actual: info.ty().to_string(),
            }),
        }
    }
}

impl<'s, B: AsRef<[u8]> + AsMut<[u8]>> Instance<'s, B> {
    /// Instance over `buffer`, then each `(name, value)` applied through `set`.
    ///
    /// On error none of the values are written.
    pub fn with_values<N, V>(
        schema: &'s CompositeType,
        buffer: B,
        init: impl IntoIterator<Item = (N, V)>,
    ) -> Result<Self>
    where
        N: AsRef<str>,
        V: Into<Value>,
    {
        let mut instance = Self::from_buffer(schema, buffer)?;
        let init: Vec<(N, Value)> = init
            .into_iter()
            .map(|(name, value)| (name, value.into()))
            .collect();
        let size = schema.size();
        schema.write_entries(
            &mut instance.buffer.as_mut()[..size],
            init.iter().map(|(name, value)| (name.as_ref(), value)),
        )?;
        Ok(instance)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let info = self.schema.require(name)?;
        info.accessor().set(
            name,
            self.schema.provider().as_ref(),
            self.buffer.as_mut(),
            &value.into(),
        )
    }

    /// Writable view of a nested struct or union field.
    pub fn nested_mut(&mut self, name: &str) -> Result<Instance<'s, &mut [u8]>> {
        let (schema, offset) = self.composite_field(name)?;
        let buffer = &mut self.buffer.as_mut()[offset..offset + schema.size()];
        Ok(Instance { schema, buffer })
    }

    /// Store `other` into the composite field `name`.
    ///
    /// Structs are copied byte for byte; unions member by member through
    /// their accessors, in declaration order.
    pub fn assign<C: AsRef<[u8]>>(&mut self, name: &str, other: &Instance<'_, C>) -> Result<()> {
        let (schema, _) = self.composite_field(name)?;
        if !std::ptr::eq(schema, other.schema) {
            return Err(LayoutError::SchemaMismatch {
                field: name.to_string(),
                expected: schema.display_name(),
                actual: other.schema.display_name(),
            });
        }

        let mut target = self.nested_mut(name)?;
        match schema.kind() {
            CompositeKind::Struct => {
                let size = schema.size();
                target.buffer[..size].copy_from_slice(&other.buffer()[..size]);
            }
            CompositeKind::Union => {
                for member in schema.field_names() {
                    target.set(member, other.get(member)?)?;
                }
            }
        }
        Ok(())
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }
}

impl<B: AsRef<[u8]>> Serialize for Instance<'_, B> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_object()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<B: AsRef<[u8]>> std::fmt::Debug for Instance<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("schema", &self.schema.display_name())
            .field("buffer", &self.buffer.as_ref())
            .finish()
    }
}
