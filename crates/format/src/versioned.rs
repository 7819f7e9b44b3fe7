//! Version tuple and versioned-list encoding
//!
//! ```text
//! version   := u8 component_count (1..=4), u32 components[component_count]
//! versioned := u16 count (>= 1), { version, payload }[count]
//! ```
//!
//! The empty version is stored as a single zero component. Lists are
//! written in ascending version order and rejected on read otherwise.

use apinotes_core::{
    EncodeError, EncodeResult, FormatError, FormatResult, VersionTuple, VersionedEntries,
};
use smallvec::SmallVec;

use crate::payload::{PayloadReader, PayloadWriter};

/// Encode one version tuple
pub fn write_version(w: &mut PayloadWriter, version: &VersionTuple) {
    let components = version.components();
    w.put_u8(components.len() as u8);
    for component in components {
        w.put_u32(component);
    }
}

/// Decode one version tuple
pub fn read_version(r: &mut PayloadReader<'_>) -> FormatResult<VersionTuple> {
    let count = r.read_u8()?;
    if !(1..=4).contains(&count) {
        return Err(FormatError::InvalidVersionComponents(count));
    }
    let mut components = [0u32; 4];
    for slot in components.iter_mut().take(count as usize) {
        *slot = r.read_u32()?;
    }
    VersionTuple::from_components(&components[..count as usize])
        .ok_or(FormatError::InvalidVersionComponents(count))
}

/// Encode a versioned list, sorting it by version first
pub fn write_versioned<T, F>(
    w: &mut PayloadWriter,
    entries: &[(VersionTuple, T)],
    mut write_payload: F,
) -> EncodeResult<()>
where
    F: FnMut(&mut PayloadWriter, &T) -> EncodeResult<()>,
{
    let count = u16::try_from(entries.len()).map_err(|_| EncodeError::TooMany {
        what: "versions",
        count: entries.len(),
        max: u16::MAX as usize,
    })?;
    let mut sorted: Vec<&(VersionTuple, T)> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    w.put_u16(count);
    for (version, payload) in sorted {
        write_version(w, version);
        write_payload(w, payload)?;
    }
    Ok(())
}

/// Decode a versioned list
pub fn read_versioned<T, F>(
    r: &mut PayloadReader<'_>,
    mut read_payload: F,
) -> FormatResult<VersionedEntries<T>>
where
    F: FnMut(&mut PayloadReader<'_>) -> FormatResult<T>,
{
    let count = r.read_u16()? as usize;
    if count == 0 {
        return Err(FormatError::EmptyVersionedList);
    }
    let mut entries: VersionedEntries<T> = SmallVec::with_capacity(count);
    for _ in 0..count {
        let version = read_version(r)?;
        if let Some((previous, _)) = entries.last() {
            if *previous >= version {
                return Err(FormatError::CorruptTable {
                    table: "versioned list",
                    detail: format!("version {version} does not follow {previous}"),
                });
            }
        }
        let payload = read_payload(r)?;
        entries.push((version, payload));
    }
    Ok(entries)
}
