use crate::error::{Error, Result};
use crate::location::{LocationRecord, LocationTable};
use crate::mapper::{IdTypeRegistry, IdentityMapper};
use crate::types::{Bp, Id, IdCategory, IdType};

pub const DEFAULT_CATEGORY: &str = "GENE";
pub const DEFAULT_GENE_TYPE: &str = "GENE_SYMBOL";
pub const LOCATION_TYPE: &str = "ChromosomeLocation";
pub const CHROMOSOME_TYPE: &str = "Chromosome";

/// The identifier types every genome context carries, in addition to
/// whatever source types (gene symbols etc.) are mapped onto them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeIdTypes {
    pub category: IdCategory,
    pub location: IdType,
    pub chromosome: IdType,
}

impl GenomeIdTypes {
    pub fn register(types: &mut IdTypeRegistry, category: &str) -> Self {
        let category = types.register_category(category);
        let location = types.register_type(LOCATION_TYPE, category);
        let chromosome = types.register_type(CHROMOSOME_TYPE, category);
        Self {
            category,
            location,
            chromosome,
        }
    }
}

/// Read-only mapping tables shared by every resolver, normalizer and
/// index created for a view.
#[derive(Debug, Clone)]
pub struct MappingContext {
    mapper: IdentityMapper,
    locations: LocationTable,
    genome: GenomeIdTypes,
}

impl MappingContext {
    pub fn new(
        mapper: IdentityMapper,
        locations: LocationTable,
        genome: GenomeIdTypes,
    ) -> Self {
        Self {
            mapper,
            locations,
            genome,
        }
    }

    pub fn builder(category: &str) -> ContextBuilder {
        ContextBuilder::new(category)
    }

    pub fn mapper(&self) -> &IdentityMapper {
        &self.mapper
    }

    pub fn types(&self) -> &IdTypeRegistry {
        self.mapper.types()
    }

    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }

    pub fn genome(&self) -> GenomeIdTypes {
        self.genome
    }

    pub fn id_type(&self, name: &str) -> Result<IdType> {
        self.types().lookup_type(name)
    }

    /// Whether ids of `id_type` can be placed on chromosomes at all.
    pub fn is_compatible(&self, id_type: IdType) -> bool {
        self.types().is_compatible(id_type, self.genome.category)
    }

    pub(crate) fn check_compatible(&self, id_type: IdType) -> Result<()> {
        if self.is_compatible(id_type) {
            Ok(())
        } else {
            Err(Error::IncompatibleIdType {
                id_type: self.types().type_name(id_type).to_string(),
            })
        }
    }

    pub fn id_of(&self, id_type: IdType, label: &str) -> Option<Id> {
        self.types().id_of(id_type, label)
    }

    pub fn label(&self, id_type: IdType, id: Id) -> Option<&str> {
        self.types().label(id_type, id)
    }

    pub fn chromosome_id(&self, name: &str) -> Option<Id> {
        self.id_of(self.genome.chromosome, name)
    }

    pub fn chromosome_name(&self, chromosome: Id) -> Option<&str> {
        self.label(self.genome.chromosome, chromosome)
    }

    /// `None` if the chromosome is unknown or has no positive length.
    pub fn total_length(&self, chromosome: &str) -> Option<Bp> {
        let id = self.chromosome_id(chromosome)?;
        self.locations.total_length(id)
    }
}

pub struct ContextBuilder {
    mapper: IdentityMapper,
    locations: LocationTable,
    genome: GenomeIdTypes,
}

impl ContextBuilder {
    pub fn new(category: &str) -> Self {
        let mut mapper = IdentityMapper::default();
        let genome = GenomeIdTypes::register(mapper.types_mut(), category);

        Self {
            mapper,
            locations: LocationTable::default(),
            genome,
        }
    }

    pub fn genome(&self) -> GenomeIdTypes {
        self.genome
    }

    /// Registers a source identifier type in the genome category.
    pub fn id_type(&mut self, name: &str) -> IdType {
        let category = self.genome.category;
        self.mapper.types_mut().register_type(name, category)
    }

    pub fn mapper_mut(&mut self) -> &mut IdentityMapper {
        &mut self.mapper
    }

    pub fn locations_mut(&mut self) -> &mut LocationTable {
        &mut self.locations
    }

    pub fn add_chromosome(&mut self, name: &str, total_length: i64) -> Id {
        let chromosome = self.genome.chromosome;
        let id = self.mapper.types_mut().intern(chromosome, name);
        self.locations.insert_chromosome(id, total_length);
        id
    }

    /// Adds the location record `location` on `chromosome`, reachable
    /// from `label` of type `id_type`. A `None` record leaves the
    /// location without coordinates.
    pub fn add_location(
        &mut self,
        id_type: IdType,
        label: &str,
        location: &str,
        chromosome: &str,
        record: Option<LocationRecord>,
    ) -> Result<Id> {
        let GenomeIdTypes {
            location: loc_type,
            chromosome: chr_type,
            ..
        } = self.genome;

        let (_, loc_id) =
            self.mapper.insert_labels(id_type, loc_type, label, location)?;
        self.mapper
            .insert_labels(loc_type, chr_type, location, chromosome)?;

        if let Some(record) = record {
            self.locations.insert_location(loc_id, record);
        }

        Ok(loc_id)
    }

    pub fn build(self) -> MappingContext {
        MappingContext::new(self.mapper, self.locations, self.genome)
    }
}
