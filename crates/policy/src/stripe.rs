//! Atomic stripe-group expansion
//!
//! Striped databases split one logical backup across several
//! co-timestamped files. Whatever retention decides for a chosen
//! representative must apply to every file in its group, so a selected
//! representative expands to all pool files sharing its stripe key and
//! exact timestamp. Grouping is purely structural; it never inspects
//! contents or counts members.

use crate::backup::BackupFile;

/// Expand a chosen representative to its full stripe group.
///
/// For non-striped databases the group is the representative alone.
pub fn expand_stripe_group<'a>(
    representative: &'a BackupFile,
    pool: &'a [BackupFile],
    striped: bool,
) -> Vec<&'a BackupFile> {
    if !striped {
        return vec![representative];
    }

    pool.iter()
        .filter(|f| {
            f.stripe_key().eq_ignore_ascii_case(representative.stripe_key())
                && f.timestamp() == representative.timestamp()
        })
        .collect()
}
