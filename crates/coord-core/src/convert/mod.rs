//! String-to-type conversion
//!
//! A [`Converter<T>`] turns the selected raw string into a `T`. The
//! [`ConverterRegistry`] maps a requested type to its converter by exact
//! [`TypeId`] match; there is no coercion between types.

mod builtin;

pub use builtin::{from_str_converter, int_list_converter, string_list_converter};

use crate::error::Result;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::coordinates::Coordinates;

/// Parses a raw configuration string into a `T`.
///
/// `convert(None)` must be well defined: it is called when no value was
/// selected and no default was supplied. The built-in converters return
/// `Ok(None)` in that case.
pub trait Converter<T>: Send + Sync {
    fn convert(&self, raw: Option<&str>) -> Result<Option<T>>;
}

impl<T, F> Converter<T> for F
where
    F: Fn(Option<&str>) -> Result<Option<T>> + Send + Sync,
{
    fn convert(&self, raw: Option<&str>) -> Result<Option<T>> {
        self(raw)
    }
}

struct Entry {
    type_name: &'static str,
    // Always an `Arc<dyn Converter<T>>` for the `T` of the map key.
    converter: Box<dyn Any + Send + Sync>,
}

/// Registry of converters keyed by target type.
///
/// # Example
///
/// ```
/// use coord_core::ConverterRegistry;
///
/// let registry = ConverterRegistry::with_builtins();
/// let port = registry.get::<u16>().unwrap().convert(Some("8080")).unwrap();
/// assert_eq!(port, Some(8080));
/// ```
#[derive(Default)]
pub struct ConverterRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry with the built-in converters registered.
    ///
    /// Registers `String`, `bool`, `i32`, `i64`, `u16`, `u32`, `u64`,
    /// `usize`, `f64`, `PathBuf`, `Vec<String>`, `Vec<i64>` and
    /// [`Coordinates`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<String, _>(|raw: Option<&str>| -> Result<Option<String>> {
            Ok(raw.map(str::to_string))
        });
        registry.register::<bool, _>(from_str_converter::<bool>());
        registry.register::<i32, _>(from_str_converter::<i32>());
        registry.register::<i64, _>(from_str_converter::<i64>());
        registry.register::<u16, _>(from_str_converter::<u16>());
        registry.register::<u32, _>(from_str_converter::<u32>());
        registry.register::<u64, _>(from_str_converter::<u64>());
        registry.register::<usize, _>(from_str_converter::<usize>());
        registry.register::<f64, _>(from_str_converter::<f64>());
        registry.register::<PathBuf, _>(|raw: Option<&str>| -> Result<Option<PathBuf>> {
            Ok(raw.map(PathBuf::from))
        });
        registry.register::<Vec<String>, _>(string_list_converter());
        registry.register::<Vec<i64>, _>(int_list_converter());
        registry.register::<Coordinates, _>(from_str_converter::<Coordinates>());
        registry
    }

    /// Register the converter for `T`, replacing any previous one.
    pub fn register<T, C>(&mut self, converter: C)
    where
        T: 'static,
        C: Converter<T> + 'static,
    {
        let converter: Arc<dyn Converter<T>> = Arc::new(converter);
        self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                type_name: std::any::type_name::<T>(),
                converter: Box::new(converter),
            },
        );
    }

    /// Look up the converter for `T`.
    pub fn get<T: 'static>(&self) -> Option<Arc<dyn Converter<T>>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.converter.downcast_ref::<Arc<dyn Converter<T>>>())
            .cloned()
    }

    /// Check if a converter is registered for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Names of all convertible types, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered converters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
