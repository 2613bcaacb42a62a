use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::unset;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Profile {
    /// Uppercased id, fixed at creation
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name", default, with = "unset")]
    pub name: Option<String>,
    #[serde(rename = "Role", default, with = "unset")]
    pub role: Option<String>,
    /// National identity card number
    #[serde(rename = "IC", default, with = "unset")]
    pub national_id: Option<String>,
    #[serde(rename = "PN", default, with = "unset")]
    pub phone: Option<String>,
    /// Certification body number
    #[serde(rename = "CB", default, with = "unset")]
    pub certification: Option<i64>,
}

impl Profile {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            role: None,
            national_id: None,
            phone: None,
            certification: None,
        }
    }

    pub fn display_name(&self) -> String {
        unset::show(&self.name)
    }

    /// Case-insensitive substring match over every searchable field.
    /// `keyword` must already be lowercase.
    pub fn matches(&self, keyword: &str) -> bool {
        let certification = self.certification.map(|cb| cb.to_string());
        [
            self.name.as_deref(),
            self.role.as_deref(),
            self.national_id.as_deref(),
            self.phone.as_deref(),
            certification.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(keyword))
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(transparent)]
pub struct Profiles {
    profiles: BTreeMap<String, Profile>,
}

impl Profiles {
    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Profile> {
        self.profiles.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    /// Keyed by the profile's own id.
    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    /// For records whose map key and `ID` field disagree, as can happen in
    /// hand-edited or imported files. The map key wins.
    pub fn insert_keyed(&mut self, id: String, profile: Profile) {
        self.profiles.insert(id, profile);
    }

    pub fn remove(&mut self, id: &str) -> Option<Profile> {
        self.profiles.remove(id)
    }

    /// Profiles in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Profile)> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl IntoIterator for Profiles {
    type Item = (String, Profile);
    type IntoIter = std::collections::btree_map::IntoIter<String, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_historical_profile_shape() {
        let json = r#"{
            "Z-1": {"Name": "Zaheerul Islam", "ID": "Z-1", "Role": "Creator",
                    "IC": "N/A", "PN": "N/A", "CB": 12345}
        }"#;
        let profiles: Profiles = serde_json::from_str(json).unwrap();
        let profile = profiles.get("Z-1").unwrap();

        assert_eq!(profile.name.as_deref(), Some("Zaheerul Islam"));
        assert_eq!(profile.national_id, None);
        assert_eq!(profile.certification, Some(12345));
    }

    #[test]
    fn test_matches_certification_as_text() {
        let profile = Profile {
            name: Some(String::from("Ada Lovelace")),
            certification: Some(987),
            ..Profile::new("P-1")
        };

        assert!(profile.matches("lovelace"));
        assert!(profile.matches("98"));
        assert!(!profile.matches("babbage"));
    }
}
