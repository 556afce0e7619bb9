//! Cross-component identifier uniqueness

use std::collections::HashMap;

use super::ComponentError;
use crate::manifest::RawComponent;

/// Fail if two components share an identifier (exact, case-sensitive match)
///
/// Runs before any build output is touched so a duplicate can never
/// overwrite a package produced earlier in the same run.
pub fn check_unique_ids(components: &[RawComponent]) -> Result<(), ComponentError> {
    let mut seen: HashMap<&str, &RawComponent> = HashMap::with_capacity(components.len());

    for component in components {
        if let Some(first) = seen.insert(component.id.as_str(), component) {
            return Err(ComponentError::DuplicateId {
                id: component.id.clone(),
                first_title: first.title.clone(),
                second_title: component.title.clone(),
            });
        }
    }

    Ok(())
}
