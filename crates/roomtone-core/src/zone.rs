//! Zone types for the propagation graph.
//!
//! A zone is a discrete region ("room") of the world. Zones arrive from the
//! scene collaborator as [`ZoneDesc`] descriptors and are frozen into [`Zone`]s
//! when a [`ZoneGraph`](crate::ZoneGraph) is built. Each built zone gets a
//! dense [`ZoneIndex`] that is only meaningful for the graph epoch that
//! produced it.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::math::Aabb;

/// Stable zone identity, assigned by whoever authors the scene.
///
/// Survives graph rebuilds, unlike [`ZoneIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(pub u32);

impl core::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ZoneId({})", self.0)
    }
}

/// Dense zone index, valid for one graph epoch.
///
/// Indices are assigned in arrival order starting at zero, so they can index
/// flat scratch arrays directly during search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneIndex(pub(crate) u32);

impl ZoneIndex {
    /// Returns the raw index as `usize`.
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// Builds an index from a raw value.
    ///
    /// Nothing checks that the index belongs to a live graph; lookups with a
    /// foreign index return `None` or a "no path" result.
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl core::fmt::Display for ZoneIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Authoring-side description of a zone, consumed by the graph builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDesc {
    /// Stable identity.
    pub id: ZoneId,
    /// Human-readable name, used in logs and tooling.
    pub name: String,
    /// Layer / priority. Higher layers win when bounding volumes overlap.
    pub layer: i32,
    /// Bounding volume. The global zone usually has none.
    pub bounds: Option<Aabb>,
    /// Marks the universal fallback zone.
    pub is_global: bool,
    /// Reverb / ambience preset name selected while inside this zone.
    pub reverb: Option<String>,
}

impl ZoneDesc {
    /// Creates a bounded zone on layer 0.
    pub fn new(id: u32, name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            id: ZoneId(id),
            name: name.into(),
            layer: 0,
            bounds: Some(bounds),
            is_global: false,
            reverb: None,
        }
    }

    /// Creates an unbounded global zone.
    pub fn global(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: ZoneId(id),
            name: name.into(),
            layer: i32::MIN,
            bounds: None,
            is_global: true,
            reverb: None,
        }
    }

    /// Sets the layer / priority.
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Sets the reverb preset name.
    pub fn with_reverb(mut self, reverb: impl Into<String>) -> Self {
        self.reverb = Some(reverb.into());
        self
    }
}

/// A zone frozen into a built graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub(crate) id: ZoneId,
    pub(crate) index: ZoneIndex,
    pub(crate) name: String,
    pub(crate) layer: i32,
    pub(crate) bounds: Option<Aabb>,
    pub(crate) is_global: bool,
    pub(crate) reverb: Option<String>,
}

impl Zone {
    pub(crate) fn from_desc(desc: &ZoneDesc, index: ZoneIndex) -> Self {
        Self {
            id: desc.id,
            index,
            name: desc.name.clone(),
            layer: desc.layer,
            bounds: desc.bounds,
            is_global: desc.is_global,
            reverb: desc.reverb.clone(),
        }
    }

    /// Stable identity.
    #[inline]
    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// Dense index for the current epoch.
    #[inline]
    pub fn index(&self) -> ZoneIndex {
        self.index
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layer / priority.
    #[inline]
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Bounding volume, if any.
    #[inline]
    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    /// Whether this is the graph's global fallback zone.
    #[inline]
    pub fn is_global(&self) -> bool {
        self.is_global
    }

    /// Reverb preset name, if configured.
    pub fn reverb(&self) -> Option<&str> {
        self.reverb.as_deref()
    }
}
