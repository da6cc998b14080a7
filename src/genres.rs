use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Bidirectional genre lookup derived from one upstream genre list.
///
/// Both directions are built in the same pass, so `name_for(id_for(n)) == n`
/// holds for every known name. Duplicate names or ids keep their first entry.
#[derive(Debug, Clone, Default)]
pub struct GenreMap {
    ordered: Vec<Genre>,
    name_to_id: HashMap<String, u32>,
    id_to_name: HashMap<u32, String>,
}

impl GenreMap {
    pub fn from_genres(genres: impl IntoIterator<Item = Genre>) -> Self {
        let mut map = GenreMap::default();
        for genre in genres {
            if map.name_to_id.contains_key(&genre.name) || map.id_to_name.contains_key(&genre.id) {
                continue;
            }
            map.name_to_id.insert(genre.name.clone(), genre.id);
            map.id_to_name.insert(genre.id, genre.name.clone());
            map.ordered.push(genre);
        }
        map
    }

    pub fn id_for(&self, name: &str) -> Option<u32> {
        self.name_to_id.get(name).copied()
    }

    pub fn name_for(&self, id: u32) -> Option<&str> {
        self.id_to_name.get(&id).map(String::as_str)
    }

    /// Genre names in upstream order, for pickers.
    pub fn names(&self) -> Vec<String> {
        self.ordered.iter().map(|g| g.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
