//! The type provider contract.
//!
//! The layout engine never touches bytes itself for plain fields: every scalar
//! read or write goes through a `TypeProvider`. Bitfields use the same calls to
//! load and store their whole storage unit.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{TypeDescriptor, TypeError, Value};

/// Resolves type names and marshals scalars over raw byte buffers.
pub trait TypeProvider {
    /// Resolve a symbolic type name (e.g. `"uint32"`, `"int *"`).
    fn coerce_type(&self, name: &str) -> Result<TypeDescriptor, TypeError>;

    /// Read the scalar of type `ty` stored at `offset`.
    fn read(&self, buf: &[u8], offset: usize, ty: &TypeDescriptor) -> Result<Value, TypeError>;

    /// Store `value` as type `ty` at `offset`.
    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        value: &Value,
        ty: &TypeDescriptor,
    ) -> Result<(), TypeError>;

    fn pointer_size(&self) -> usize;

    fn pointer_alignment(&self) -> usize;

    /// Zero-filled backing storage of `len` bytes.
    fn allocate(&self, len: usize) -> Vec<u8> {
        vec![0; len]
    }

    /// The empty buffer.
    fn null_buffer(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Whether `ty` holds signed values.
    ///
    /// The default probes on every call; providers should memoize with a
    /// [`SignCache`].
    fn is_signed(&self, ty: &TypeDescriptor) -> bool {
        probe_signed(self, ty)
    }
}

impl<P: TypeProvider + ?Sized> TypeProvider for &P {
    fn coerce_type(&self, name: &str) -> Result<TypeDescriptor, TypeError> {
        (*self).coerce_type(name)
    }
    fn read(&self, buf: &[u8], offset: usize, ty: &TypeDescriptor) -> Result<Value, TypeError> {
        (*self).read(buf, offset, ty)
    }
    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        value: &Value,
        ty: &TypeDescriptor,
    ) -> Result<(), TypeError> {
        (*self).write(buf, offset, value, ty)
    }
    fn pointer_size(&self) -> usize {
        (*self).pointer_size()
    }
    fn pointer_alignment(&self) -> usize {
        (*self).pointer_alignment()
    }
    fn allocate(&self, len: usize) -> Vec<u8> {
        (*self).allocate(len)
    }
    fn null_buffer(&self) -> Vec<u8> {
        (*self).null_buffer()
    }
    fn is_signed(&self, ty: &TypeDescriptor) -> bool {
        (*self).is_signed(ty)
    }
}

/// Decide signedness the provider's own way: store `-1`, load it back, and
/// check whether the result is negative.
///
/// Types the provider refuses to store `-1` into are treated as unsigned.
pub fn probe_signed<P: TypeProvider + ?Sized>(provider: &P, ty: &TypeDescriptor) -> bool {
    let size = if ty.is_pointer() {
        provider.pointer_size()
    } else {
        ty.size()
    };
    let mut scratch = provider.allocate(size);
    if provider.write(&mut scratch, 0, &Value::Int(-1), ty).is_err() {
        return false;
    }
    provider
        .read(&scratch, 0, ty)
        .is_ok_and(|value| value.is_negative())
}

/// Memo of signedness per descriptor.
///
/// Signedness is a static property of a type, so the first probe is final.
#[derive(Debug, Default)]
pub struct SignCache {
    entries: Mutex<HashMap<TypeDescriptor, bool>>,
}

impl SignCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached signedness of `ty`, computing it with `probe` on first use.
    pub fn get_or_probe(&self, ty: &TypeDescriptor, probe: impl FnOnce() -> bool) -> bool {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(&signed) = entries.get(ty) {
            return signed;
        }
        let signed = probe();
        entries.insert(ty.clone(), signed);
        signed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
