use thiserror::Error;

use crate::{
    models::profile::{Profile, Profiles},
    services::{Deletion, PendingDeletion, Recoverable, normalize_id, provided},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile '{0}' not found.")]
    NotFound(String),

    #[error("Profile ID '{0}' already exists. Use 'profilesedit <ID>' to modify.")]
    AlreadyExists(String),

    #[error("Profile ID cannot be empty.")]
    EmptyId,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Recoverable for ProfileError {
    fn into_fatal(self) -> Result<StorageError, Self> {
        match self {
            ProfileError::Storage(e) => Ok(e),
            other => Err(other),
        }
    }
}

/// Raw field input. Blank fields are left unset on create and unchanged on
/// update.
#[derive(Default)]
pub struct ProfileParameters {
    pub name: String,
    pub role: String,
    pub national_id: String,
    pub phone: String,
    pub certification: String,
}

/// Outcome of a create or update.
#[derive(Debug)]
pub struct ProfileWrite {
    pub id: String,
    /// Certification input that was not a number and therefore ignored
    pub rejected_certification: Option<String>,
}

pub fn get_profile<'a>(profiles: &'a Profiles, id: &str) -> Result<&'a Profile, ProfileError> {
    let id = normalize_id(id);
    profiles.get(&id).ok_or(ProfileError::NotFound(id))
}

/// Fails before any prompt for fields when the id is unusable.
pub fn check_new_profile_id(profiles: &Profiles, id: &str) -> Result<String, ProfileError> {
    let id = normalize_id(id);
    if id.is_empty() {
        return Err(ProfileError::EmptyId);
    }
    if profiles.contains(&id) {
        return Err(ProfileError::AlreadyExists(id));
    }
    Ok(id)
}

pub fn create_profile(
    profiles: &mut Profiles,
    storage: &impl Storage<Profiles>,
    id: &str,
    parameters: ProfileParameters,
) -> Result<ProfileWrite, ProfileError> {
    let id = check_new_profile_id(profiles, id)?;

    let mut profile = Profile::new(&id);
    let rejected_certification = apply(&mut profile, &parameters);
    profiles.insert(profile);

    storage.save(profiles)?;

    tracing::info!(%id, "profile created");
    Ok(ProfileWrite {
        id,
        rejected_certification,
    })
}

pub fn update_profile(
    profiles: &mut Profiles,
    storage: &impl Storage<Profiles>,
    id: &str,
    parameters: ProfileParameters,
) -> Result<ProfileWrite, ProfileError> {
    let id = normalize_id(id);
    let profile = profiles
        .get_mut(&id)
        .ok_or_else(|| ProfileError::NotFound(id.clone()))?;

    let rejected_certification = apply(profile, &parameters);

    storage.save(profiles)?;

    tracing::info!(%id, "profile updated");
    Ok(ProfileWrite {
        id,
        rejected_certification,
    })
}

/// Copies every provided field onto the profile. Returns the certification
/// input when it was provided but is not an integer.
fn apply(profile: &mut Profile, parameters: &ProfileParameters) -> Option<String> {
    let text_fields = [
        (&mut profile.name, &parameters.name),
        (&mut profile.role, &parameters.role),
        (&mut profile.national_id, &parameters.national_id),
        (&mut profile.phone, &parameters.phone),
    ];
    for (field, input) in text_fields {
        if let Some(value) = provided(input) {
            *field = Some(value.to_string());
        }
    }

    let raw = provided(&parameters.certification)?;
    match raw.parse::<i64>() {
        Ok(number) => {
            profile.certification = Some(number);
            None
        }
        Err(_) => Some(raw.to_string()),
    }
}

/// Deleting a profile is confirmed with `y`. Tasks assigned to it keep the
/// id.
pub fn propose_profile_deletion(
    profiles: &Profiles,
    id: &str,
) -> Result<PendingDeletion<String>, ProfileError> {
    let id = normalize_id(id);
    if !profiles.contains(&id) {
        return Err(ProfileError::NotFound(id));
    }
    Ok(PendingDeletion::new(id, "y"))
}

pub fn commit_profile_deletion(
    profiles: &mut Profiles,
    storage: &impl Storage<Profiles>,
    pending: PendingDeletion<String>,
    answer: &str,
) -> Result<Deletion, ProfileError> {
    if !pending.is_confirmed_by(answer) {
        return Ok(Deletion::Cancelled);
    }

    profiles
        .remove(&pending.key)
        .ok_or_else(|| ProfileError::NotFound(pending.key.clone()))?;

    storage.save(profiles)?;

    tracing::info!(id = %pending.key, "profile deleted");
    Ok(Deletion::Deleted)
}

/// (id, name) of every profile matching `keyword`, in id order.
pub fn search_profiles(profiles: &Profiles, keyword: &str) -> Vec<(String, String)> {
    let keyword = keyword.trim().to_lowercase();
    profiles
        .iter()
        .filter(|(_, profile)| profile.matches(&keyword))
        .map(|(id, profile)| (id.clone(), profile.display_name()))
        .collect()
}
