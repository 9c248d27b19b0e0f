use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use bimap::BiMap;
use roaring::RoaringBitmap;

use crate::error::{Error, Result};
use crate::types::{Id, IdCategory, IdType};

#[derive(Debug, Clone)]
struct TypeEntry {
    category: IdCategory,
    labels: BiMap<String, Id>,
}

/// Identifier types, the categories they belong to, and the labels
/// interned for each type.
#[derive(Debug, Clone, Default)]
pub struct IdTypeRegistry {
    categories: BiMap<String, IdCategory>,
    type_names: BiMap<String, IdType>,
    types: Vec<TypeEntry>,
}

impl IdTypeRegistry {
    pub fn register_category(&mut self, name: &str) -> IdCategory {
        if let Some(category) = self.categories.get_by_left(name) {
            return *category;
        }

        let category = IdCategory(self.categories.len() as u32);
        self.categories.insert(name.to_string(), category);
        category
    }

    /// Registering an existing name returns the existing type, even if
    /// it was registered under another category.
    pub fn register_type(
        &mut self,
        name: &str,
        category: IdCategory,
    ) -> IdType {
        if let Some(id_type) = self.type_names.get_by_left(name) {
            if self.category_of(*id_type) != Some(category) {
                log::warn!(
                    "Identifier type {name} is registered in another category"
                );
            }
            return *id_type;
        }

        let id_type = IdType(self.types.len() as u32);
        self.type_names.insert(name.to_string(), id_type);
        self.types.push(TypeEntry {
            category,
            labels: BiMap::new(),
        });
        id_type
    }

    pub fn lookup_type(&self, name: &str) -> Result<IdType> {
        self.type_names
            .get_by_left(name)
            .copied()
            .ok_or_else(|| Error::UnknownIdType(name.to_string()))
    }

    pub fn type_name(&self, id_type: IdType) -> &str {
        self.type_names
            .get_by_right(&id_type)
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    /// `None` if `id_type` was not registered here.
    pub fn category_of(&self, id_type: IdType) -> Option<IdCategory> {
        self.types.get(id_type.ix()).map(|entry| entry.category)
    }

    pub fn is_compatible(
        &self,
        id_type: IdType,
        category: IdCategory,
    ) -> bool {
        self.category_of(id_type) == Some(category)
    }

    /// Panics if `id_type` was not registered here.
    pub fn intern(&mut self, id_type: IdType, label: &str) -> Id {
        let labels = &mut self.types[id_type.ix()].labels;

        if let Some(id) = labels.get_by_left(label) {
            return *id;
        }

        let id = Id(labels.len() as u32);
        labels.insert(label.to_string(), id);
        id
    }

    pub fn id_of(&self, id_type: IdType, label: &str) -> Option<Id> {
        let entry = self.types.get(id_type.ix())?;
        entry.labels.get_by_left(label).copied()
    }

    pub fn label(&self, id_type: IdType, id: Id) -> Option<&str> {
        let entry = self.types.get(id_type.ix())?;
        entry.labels.get_by_right(&id).map(|s| s.as_str())
    }

    pub fn labels<'a>(
        &'a self,
        id_type: IdType,
    ) -> impl Iterator<Item = (&'a str, Id)> + 'a {
        self.types
            .get(id_type.ix())
            .into_iter()
            .flat_map(|entry| entry.labels.iter())
            .map(|(label, id)| (label.as_str(), *id))
    }
}

type Adjacency = HashMap<Id, RoaringBitmap>;

/// Multi-valued, bidirectional mapping tables between identifier
/// types of the same category.
///
/// Types without a direct table are mapped along the shortest chain
/// of tables connecting them, so e.g. gene -> chromosome composes
/// gene -> location and location -> chromosome.
#[derive(Debug, Clone, Default)]
pub struct IdentityMapper {
    types: IdTypeRegistry,
    tables: HashMap<(IdType, IdType), Adjacency>,
    neighbors: BTreeMap<IdType, BTreeSet<IdType>>,
}

impl IdentityMapper {
    pub fn types(&self) -> &IdTypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut IdTypeRegistry {
        &mut self.types
    }

    fn check_compatible(&self, from: IdType, to: IdType) -> Result<()> {
        for id_type in [from, to] {
            if self.types.category_of(id_type).is_none() {
                return Err(Error::UnknownIdType(format!("{id_type:?}")));
            }
        }

        let category = self.types.category_of(from);
        if self.types.category_of(to) == category {
            Ok(())
        } else {
            Err(Error::CrossCategoryMapping {
                from: self.types.type_name(from).to_string(),
                to: self.types.type_name(to).to_string(),
            })
        }
    }

    pub fn insert(
        &mut self,
        from: IdType,
        to: IdType,
        a: Id,
        b: Id,
    ) -> Result<()> {
        self.check_compatible(from, to)?;

        self.tables
            .entry((from, to))
            .or_default()
            .entry(a)
            .or_default()
            .insert(b.0);
        self.tables
            .entry((to, from))
            .or_default()
            .entry(b)
            .or_default()
            .insert(a.0);

        self.neighbors.entry(from).or_default().insert(to);
        self.neighbors.entry(to).or_default().insert(from);

        Ok(())
    }

    pub fn insert_labels(
        &mut self,
        from: IdType,
        to: IdType,
        a: &str,
        b: &str,
    ) -> Result<(Id, Id)> {
        self.check_compatible(from, to)?;
        let a = self.types.intern(from, a);
        let b = self.types.intern(to, b);
        self.insert(from, to, a, b)?;
        Ok((a, b))
    }

    /// Shortest chain of types from `from` to `to`, both included.
    pub fn route(&self, from: IdType, to: IdType) -> Option<Vec<IdType>> {
        if from == to {
            return Some(vec![from]);
        }

        let mut prev: HashMap<IdType, IdType> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let Some(next) = self.neighbors.get(&current) else {
                continue;
            };

            for &n in next {
                if n == from || prev.contains_key(&n) {
                    continue;
                }
                prev.insert(n, current);

                if n == to {
                    let mut route = vec![to];
                    let mut cur = to;
                    while let Some(&p) = prev.get(&cur) {
                        route.push(p);
                        cur = p;
                    }
                    route.reverse();
                    return Some(route);
                }

                queue.push_back(n);
            }
        }

        None
    }

    fn step(
        &self,
        ids: &RoaringBitmap,
        from: IdType,
        to: IdType,
    ) -> RoaringBitmap {
        let mut out = RoaringBitmap::new();

        let Some(table) = self.tables.get(&(from, to)) else {
            return out;
        };

        for id in ids {
            if let Some(targets) = table.get(&Id(id)) {
                out |= targets;
            }
        }

        out
    }

    fn map_along(&self, id: Id, route: &[IdType]) -> RoaringBitmap {
        let mut current = RoaringBitmap::new();
        current.insert(id.0);

        for hop in route.windows(2) {
            if current.is_empty() {
                break;
            }
            current = self.step(&current, hop[0], hop[1]);
        }

        current
    }

    pub fn map_id(&self, id: Id, from: IdType, to: IdType) -> RoaringBitmap {
        match self.route(from, to) {
            Some(route) => self.map_along(id, &route),
            None => RoaringBitmap::new(),
        }
    }

    /// Maps every id to its target set; unmapped ids are left out.
    pub fn map_set(
        &self,
        ids: impl IntoIterator<Item = Id>,
        from: IdType,
        to: IdType,
    ) -> BTreeMap<Id, RoaringBitmap> {
        let Some(route) = self.route(from, to) else {
            return BTreeMap::new();
        };

        ids.into_iter()
            .filter_map(|id| {
                let mapped = self.map_along(id, &route);
                (!mapped.is_empty()).then_some((id, mapped))
            })
            .collect()
    }

    /// One target set per input id, in input order, duplicates included.
    pub fn map_seq(
        &self,
        ids: &[Id],
        from: IdType,
        to: IdType,
    ) -> Vec<RoaringBitmap> {
        match self.route(from, to) {
            Some(route) => {
                ids.iter().map(|&id| self.map_along(id, &route)).collect()
            }
            None => vec![RoaringBitmap::new(); ids.len()],
        }
    }

    pub fn map_union(
        &self,
        ids: impl IntoIterator<Item = Id>,
        from: IdType,
        to: IdType,
    ) -> RoaringBitmap {
        let Some(route) = self.route(from, to) else {
            return RoaringBitmap::new();
        };

        let mut start = RoaringBitmap::new();
        start.extend(ids.into_iter().map(|id| id.0));

        route
            .windows(2)
            .fold(start, |current, hop| self.step(&current, hop[0], hop[1]))
    }
}
