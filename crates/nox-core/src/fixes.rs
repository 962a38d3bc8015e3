//! Applying fix-its to source text.

use crate::diagnostic::{Diagnostic, FixIt};
use crate::error::{NoxError, Result};

/// Apply every fix-it carried by `diagnostics` to `text`.
///
/// Edits are applied bottom-up so earlier offsets stay valid; a second
/// insertion at the same offset is dropped.
pub fn apply_fixes(text: &str, diagnostics: &[Diagnostic]) -> Result<String> {
    let mut fixes: Vec<&FixIt> = diagnostics.iter().filter_map(|d| d.fix.as_ref()).collect();
    fixes.sort_by(|a, b| b.offset.cmp(&a.offset));
    fixes.dedup_by_key(|fix| fix.offset);

    let mut out = text.to_string();
    for fix in fixes {
        let offset = fix.offset as usize;
        if !text.is_char_boundary(offset) {
            return Err(NoxError::InvalidFixOffset {
                offset: fix.offset,
                len: text.len(),
            });
        }
        out.insert_str(offset, &fix.text);
    }
    Ok(out)
}
