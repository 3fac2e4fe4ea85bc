//! Struct and union schemas.
//!
//! A `CompositeType` starts `Open`: fields may be appended or redefined, and
//! every change reruns the layout engine over the whole field list. The first
//! `Instance` (or an explicit `seal`) moves it to `Frozen`, after which the
//! layout never changes again.
//!
//! Mutations are atomic: the new field table is laid out into a scratch copy
//! and committed only if every step succeeded.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cabi_core::{NativeTypes, TypeProvider, Value};
use indexmap::IndexMap;

use crate::accessor::FieldAccessor;
use crate::decl::{Decl, FieldType};
use crate::error::{LayoutError, Result};
use crate::layout::{FieldLayout, Layout, Target, compute_layout};
use crate::options::LayoutOptions;
use crate::trace::{LayoutTracer, NoopTracer};
use crate::union_layout::compute_union_layout;

/// Names that would shadow the accessor for the backing buffer.
pub const RESERVED_FIELD_NAMES: &[&str] = &["buffer"];

/// Shared, thread-safe type provider handle.
pub type SharedProvider = Arc<dyn TypeProvider + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Struct,
    Union,
}

impl CompositeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CompositeKind::Struct => "struct",
            CompositeKind::Union => "union",
        }
    }
}

/// One entry of the field table.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    ty: FieldType,
    layout: FieldLayout,
    accessor: FieldAccessor,
}

impl FieldInfo {
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    pub fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }

    pub fn offset(&self) -> usize {
        self.layout.offset()
    }
}

/// Schema of a struct or union.
pub struct CompositeType {
    kind: CompositeKind,
    name: Option<String>,
    options: LayoutOptions,
    provider: SharedProvider,
    fields: IndexMap<String, FieldInfo>,
    size: usize,
    alignment: usize,
    frozen: AtomicBool,
}

impl CompositeType {
    /// Empty schema over the native type provider.
    pub fn new(kind: CompositeKind) -> Self {
        Self::with_options(kind, LayoutOptions::default())
    }

    pub fn new_struct() -> Self {
        Self::new(CompositeKind::Struct)
    }

    pub fn new_union() -> Self {
        Self::new(CompositeKind::Union)
    }

    pub fn with_options(kind: CompositeKind, options: LayoutOptions) -> Self {
        Self::with_provider(kind, options, Arc::new(NativeTypes::default()))
    }

    pub fn with_provider(kind: CompositeKind, options: LayoutOptions, provider: SharedProvider) -> Self {
        Self {
            kind,
            name: None,
            options,
            provider,
            fields: IndexMap::new(),
            size: 0,
            alignment: 0,
            frozen: AtomicBool::new(false),
        }
    }

    /// Schema with `fields` declared in order.
    pub fn define<N, D>(
        kind: CompositeKind,
        fields: impl IntoIterator<Item = (N, D)>,
        options: LayoutOptions,
    ) -> Result<Self>
    where
        N: Into<String>,
        D: Into<Decl>,
    {
        let mut schema = Self::with_options(kind, options);
        schema.add_fields(fields)?;
        Ok(schema)
    }

    /// Name shown in dumps and error messages.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a field, or replace the type of an existing one in place.
    pub fn add_field(&mut self, name: impl Into<String>, decl: impl Into<Decl>) -> Result<&mut Self> {
        self.add_fields([(name, decl)])
    }

    /// Append (or redefine) several fields as one atomic change.
    pub fn add_fields<N, D>(&mut self, fields: impl IntoIterator<Item = (N, D)>) -> Result<&mut Self>
    where
        N: Into<String>,
        D: Into<Decl>,
    {
        let mut table = self.type_table();
        let mut layout = None;
        for (name, decl) in fields {
            let name = name.into();
            self.check_open(&name)?;
            validate_name(&name)?;
            let decl: Decl = decl.into();
            let ty = decl.resolve(&name, self.provider.as_ref())?;
            table.insert(name, ty);
            layout = Some(self.compute(&table, &mut NoopTracer)?);
        }
        if let Some(layout) = layout {
            self.commit(table, layout);
        }
        Ok(self)
    }

    /// Replace the type of an already declared field.
    pub fn redefine_field(&mut self, name: &str, decl: impl Into<Decl>) -> Result<&mut Self> {
        self.check_open(name)?;
        if !self.fields.contains_key(name) {
            return Err(LayoutError::UnknownField(name.to_string()));
        }
        self.add_field(name, decl)
    }

    /// Freeze the layout. Irreversible.
    pub fn seal(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.kind.as_str(), name),
            None => self.kind.as_str().to_string(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn options(&self) -> LayoutOptions {
        self.options
    }

    pub fn is_packed(&self) -> bool {
        self.options.packed
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.get(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldInfo)> {
        self.fields.iter().map(|(name, info)| (name.as_str(), info))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The committed layout.
    pub fn layout(&self) -> Layout {
        Layout {
            size: self.size,
            alignment: self.alignment,
            fields: self.fields.values().map(|info| info.layout).collect(),
        }
    }

    /// Recompute the layout, reporting every decision to `tracer`.
    pub fn trace_layout<T: LayoutTracer>(&self, tracer: &mut T) -> Result<Layout> {
        self.compute(&self.type_table(), tracer)
    }

    pub(crate) fn require(&self, name: &str) -> Result<&FieldInfo> {
        self.fields
            .get(name)
            .ok_or_else(|| LayoutError::UnknownField(name.to_string()))
    }

    /// Every field of `buf` as an ordered object.
    pub(crate) fn read_object(&self, buf: &[u8]) -> Result<Value> {
        self.fields
            .iter()
            .map(|(name, info)| {
                let value = info.accessor.get(name, self.provider.as_ref(), buf)?;
                Ok((name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Object)
    }

    /// Apply each entry of an object through the field accessors.
    ///
    /// All or nothing: entries are staged in a copy of `buf`, which is written
    /// back only once every entry has been stored.
    pub(crate) fn write_object(&self, buf: &mut [u8], value: &Value) -> Result<()> {
        let Value::Object(entries) = value else {
            return Err(LayoutError::SchemaMismatch {
                field: String::new(),
                expected: self.display_name(),
                actual: value.describe(),
            });
        };
        self.write_entries(buf, entries.iter().map(|(name, value)| (name.as_str(), value)))
    }

    /// Store `(name, value)` pairs into `buf`, leaving it untouched on error.
    pub(crate) fn write_entries<'v>(
        &self,
        buf: &mut [u8],
        entries: impl IntoIterator<Item = (&'v str, &'v Value)>,
    ) -> Result<()> {
        let mut scratch = buf.to_vec();
        for (name, value) in entries {
            let info = self.require(name)?;
            info.accessor.set(name, self.provider.as_ref(), &mut scratch, value)?;
        }
        buf.copy_from_slice(&scratch);
        Ok(())
    }

    fn check_open(&self, field: &str) -> Result<()> {
        if self.is_frozen() {
            return Err(LayoutError::SchemaFrozen {
                field: field.to_string(),
            });
        }
        Ok(())
    }

    fn type_table(&self) -> IndexMap<String, FieldType> {
        self.fields
            .iter()
            .map(|(name, info)| (name.clone(), info.ty.clone()))
            .collect()
    }

    fn compute<T: LayoutTracer>(&self, table: &IndexMap<String, FieldType>, tracer: &mut T) -> Result<Layout> {
        let fields: Vec<(&str, &FieldType)> = table.iter().map(|(name, ty)| (name.as_str(), ty)).collect();
        let target = Target::of(self.provider.as_ref());
        match self.kind {
            CompositeKind::Struct => compute_layout(&fields, self.options.packed, target, tracer),
            CompositeKind::Union => compute_union_layout(&fields, target, tracer),
        }
    }

    fn commit(&mut self, table: IndexMap<String, FieldType>, layout: Layout) {
        let provider = self.provider.as_ref();
        self.fields = table
            .into_iter()
            .zip(layout.fields)
            .map(|((name, ty), layout)| {
                if let FieldType::Composite(nested) = &ty {
                    nested.seal();
                }
                let accessor = FieldAccessor::new(&ty, &layout, provider);
                (name, FieldInfo { ty, layout, accessor })
            })
            .collect();
        self.size = layout.size;
        self.alignment = layout.alignment;
    }
}

impl fmt::Debug for CompositeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeType")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("options", &self.options)
            .field("fields", &self.fields)
            .field("size", &self.size)
            .field("alignment", &self.alignment)
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason| {
        Err(LayoutError::InvalidFieldName {
            name: name.to_string(),
            reason,
        })
    };
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return invalid("name is empty");
    };
    if !(first.is_alphabetic() || first == '_') {
        return invalid("must start with a letter or `_`");
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return invalid("must contain only letters, digits and `_`");
    }
    if RESERVED_FIELD_NAMES.contains(&name) {
        return invalid("reserved for the backing buffer");
    }
    Ok(())
}
