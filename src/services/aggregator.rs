use crate::models::equipment::EquipmentPiece;
use crate::models::stat::StatMap;

/// Sum every stat across the given pieces; absent readings count as 0.
///
/// Only keys read on at least one piece appear in the result. Order of the
/// pieces does not matter.
pub fn aggregate<'a>(pieces: impl IntoIterator<Item = &'a EquipmentPiece>) -> StatMap {
    let mut total = StatMap::new();

    for piece in pieces {
        for (key, value) in piece.stats.iter() {
            total.set(key, total.get(key).unwrap_or(0.0) + value);
        }
    }

    total
}
