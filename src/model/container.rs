//! # Container Descriptor
//!
//! Desired shape of a SQL container: partitioning, indexing, uniqueness, TTL, conflict
//! resolution and the optional vector and computed-property settings.
//!
//! Throughput is not part of the container resource. `autoscale_max_throughput` is only
//! sent as a create-time option and is ignored by the service on later upserts.

/// Partition key kind. Hierarchical keys (more than one path) require `MultiHash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Hash,
    MultiHash,
}

impl PartitionKind {
    #[must_use]
    pub fn for_paths(paths: &[String]) -> Self {
        if paths.len() > 1 {
            PartitionKind::MultiHash
        } else {
            PartitionKind::Hash
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PartitionKind::Hash => "Hash",
            PartitionKind::MultiHash => "MultiHash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexingMode {
    Consistent,
    None,
}

impl IndexingMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IndexingMode::Consistent => "consistent",
            IndexingMode::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorIndexType {
    Flat,
    QuantizedFlat,
    DiskAnn,
}

impl VectorIndexType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VectorIndexType::Flat => "flat",
            VectorIndexType::QuantizedFlat => "quantizedFlat",
            VectorIndexType::DiskAnn => "diskANN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorIndex {
    pub path: String,
    pub kind: VectorIndexType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingPolicy {
    pub automatic: bool,
    pub mode: IndexingMode,
    pub included_paths: Vec<String>,
    pub excluded_paths: Vec<String>,
    pub vector_indexes: Vec<VectorIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorDataType {
    Float32,
    Uint8,
    Int8,
}

impl VectorDataType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VectorDataType::Float32 => "float32",
            VectorDataType::Uint8 => "uint8",
            VectorDataType::Int8 => "int8",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceFunction {
    Cosine,
    DotProduct,
    Euclidean,
}

impl DistanceFunction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceFunction::Cosine => "cosine",
            DistanceFunction::DotProduct => "dotproduct",
            DistanceFunction::Euclidean => "euclidean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorEmbedding {
    pub path: String,
    pub data_type: VectorDataType,
    pub distance_function: DistanceFunction,
    pub dimensions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorEmbeddingPolicy {
    pub embeddings: Vec<VectorEmbedding>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedProperty {
    pub name: String,
    pub query: String,
}

/// Default time-to-live for items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlPolicy {
    /// TTL disabled, `defaultTtl` omitted
    Off,
    /// TTL enabled without a default, items expire only with a per-item `ttl` (-1)
    NoDefaultExpiry,
    Seconds(u32),
}

impl TtlPolicy {
    /// Value for the `defaultTtl` field, if any
    #[must_use]
    pub fn default_ttl(self) -> Option<i64> {
        match self {
            TtlPolicy::Off => None,
            TtlPolicy::NoDefaultExpiry => Some(-1),
            TtlPolicy::Seconds(secs) => Some(i64::from(secs)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolutionMode {
    LastWriterWins,
    Custom,
}

impl ConflictResolutionMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictResolutionMode::LastWriterWins => "LastWriterWins",
            ConflictResolutionMode::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictResolution {
    pub mode: ConflictResolutionMode,
    pub path: String,
}

/// Desired state of a SQL container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    pub name: String,
    pub location: String,
    pub partition_key_paths: Vec<String>,
    pub partition_kind: PartitionKind,
    pub indexing_policy: IndexingPolicy,
    /// Each inner vector is one unique key made of one or more paths
    pub unique_key_paths: Vec<Vec<String>>,
    pub default_ttl: TtlPolicy,
    pub conflict_resolution: ConflictResolution,
    pub vector_embeddings: Option<VectorEmbeddingPolicy>,
    pub computed_properties: Vec<ComputedProperty>,
    /// Create-time autoscale max throughput
    pub autoscale_max_throughput: Option<i32>,
}

impl ContainerDescriptor {
    #[must_use]
    pub fn uses_vector_search(&self) -> bool {
        self.vector_embeddings.is_some() || !self.indexing_policy.vector_indexes.is_empty()
    }

    /// Remove the vector embedding policy and vector indexes; true if anything was removed
    pub fn strip_vector_settings(&mut self) -> bool {
        let had_any = self.uses_vector_search();
        self.vector_embeddings = None;
        self.indexing_policy.vector_indexes.clear();
        had_any
    }

    /// Remove computed properties; true if anything was removed
    pub fn strip_computed_properties(&mut self) -> bool {
        let had_any = !self.computed_properties.is_empty();
        self.computed_properties.clear();
        had_any
    }
}
