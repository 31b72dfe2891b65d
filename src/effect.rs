use crate::catalog::{CatalogEntry, PartitionSpec};

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadCatalog { partitions: Vec<PartitionSpec> },
    EnrichBatch { generation: u64, entries: Vec<CatalogEntry> },
    LoadDetail { name: String },
    LoadEvolutionChain { id: u32 },
    LoadTypes,
    LoadHabitats,
}
