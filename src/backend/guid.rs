//! Deterministic project GUIDs.
//!
//! Visual Studio identifies projects by GUID in both the project file
//! and the solution. Deriving the GUID from the target name keeps
//! regeneration stable: re-running griddle never churns solution files
//! or invalidates IDE state.

use sha2::{Digest, Sha256};

/// Solution entry type GUID for C/C++ projects.
pub const VCPROJ_TYPE_GUID: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}";

/// Derive the stable GUID for a named project.
///
/// The name is hashed and the result formatted as a version-4-shaped
/// GUID in registry format, uppercase, as Visual Studio writes them.
pub fn project_guid(name: &str) -> String {
    let digest = Sha256::digest(format!("griddle:project:{}", name).as_bytes());

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    bytes[6] = (bytes[6] & 0x0F) | 0x40;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;

    let h = hex::encode_upper(bytes);
    format!(
        "{{{}-{}-{}-{}-{}}}",
        &h[0..8],
        &h[8..12],
        &h[12..16],
        &h[16..20],
        &h[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_is_stable() {
        assert_eq!(project_guid("hello"), project_guid("hello"));
        assert_ne!(project_guid("hello"), project_guid("world"));
    }

    #[test]
    fn test_guid_shape() {
        let guid = project_guid("hello");
        assert_eq!(guid.len(), 38);
        assert!(guid.starts_with('{') && guid.ends_with('}'));

        let parts: Vec<&str> = guid[1..37].split('-').collect();
        assert_eq!(
            parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        // Version and variant nibbles follow the v4 layout.
        assert!(parts[2].starts_with('4'));
        assert!(matches!(parts[3].chars().next(), Some('8' | '9' | 'A' | 'B')));
        assert_eq!(guid, guid.to_uppercase());
    }
}
